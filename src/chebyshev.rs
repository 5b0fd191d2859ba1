//! Chebyshev interpolation nodes and the associated Lagrange basis.
//!
//! For an order N the one dimensional interpolating polynomial associated with the node
//! `x_m = cos((2m+1)π/2N)` is
//!
//! `S_N(x_m, x) = 1/N + 2/N Σ_{k=1}^{N-1} T_k(x_m) T_k(x)`
//!
//! and the D dimensional basis is the tensor product over dimensions. Weighted sums of these
//! functions reproduce any polynomial of degree at most N-1 in each dimension.
use std::f64::consts::PI;

use crate::geometry::Bbox;

/// The `i`-th of `n` Chebyshev nodes in [-1, 1].
#[inline]
pub fn chebyshev_node(i: usize, n: usize) -> f64 {
    (PI * (2.0 * i as f64 + 1.0) / (2.0 * n as f64)).cos()
}

/// Position of a lattice node in the reference box [-1, 1]^D.
#[inline]
pub fn chebyshev_node_nd<const D: usize>(index: &[usize; D], n: usize) -> [f64; D] {
    std::array::from_fn(|d| chebyshev_node(index[d], n))
}

/// Evaluate `S_N(x_m, x)` for all `N` nodes `x_m` at once.
fn lagrange_1d<const N: usize>(x: f64) -> [f64; N] {
    // T_k(x) by the three term recurrence, valid outside [-1, 1] too
    let mut tx = [0.0; N];
    for k in 0..N {
        tx[k] = match k {
            0 => 1.0,
            1 => x,
            _ => 2.0 * x * tx[k - 1] - tx[k - 2],
        };
    }

    let scale = 1.0 / N as f64;
    std::array::from_fn(|m| {
        // T_k at the node is cos(k θ_m)
        let theta = PI * (2.0 * m as f64 + 1.0) / (2.0 * N as f64);
        let sum: f64 = (1..N).map(|k| (k as f64 * theta).cos() * tx[k]).sum();
        scale + 2.0 * scale * sum
    })
}

/// The Chebyshev basis of a box evaluated at a single point.
///
/// Stores the one dimensional basis values for every dimension so that evaluating the basis
/// function of any lattice node costs D multiplications.
#[derive(Debug, Clone)]
pub struct ChebyshevRn<const D: usize, const N: usize> {
    values: [[f64; N]; D],
}

impl<const D: usize, const N: usize> ChebyshevRn<D, N> {
    /// Evaluate the basis of `bbox` at `position`.
    pub fn new(position: &[f64; D], bbox: &Bbox<D>) -> Self {
        let unit = bbox.to_unit(position);
        Self {
            values: std::array::from_fn(|d| lagrange_1d::<N>(unit[d])),
        }
    }

    /// Value of the basis function of the lattice node `index`.
    #[inline]
    pub fn rn(&self, index: &[usize; D]) -> f64 {
        index
            .iter()
            .zip(&self.values)
            .map(|(&i, values)| values[i])
            .product()
    }

    /// Real position of the lattice node `index` inside `bbox`.
    #[inline]
    pub fn node_position(index: &[usize; D], bbox: &Bbox<D>) -> [f64; D] {
        bbox.from_unit(&chebyshev_node_nd(index, N))
    }
}
