//! Kernel independent expansions by Chebyshev interpolation.
use crate::chebyshev::{chebyshev_node_nd, ChebyshevRn};
use crate::geometry::{ncoeffs, sub, Bbox, LatticeIterator};
use crate::traits::{Expansions, Kernel};

/// Black box FMM expansions of order `N` in `D` dimensions.
///
/// Multipole and local expansions are the values of the interpolated field at the `N^D`
/// Chebyshev nodes of a box, so every operator only needs to evaluate the kernel and the
/// Chebyshev basis.
#[derive(Debug, Clone)]
pub struct BlackBoxExpansions<const D: usize, const N: usize, K: Kernel<D>> {
    kernel: K,
    unit_nodes: Vec<[f64; D]>,
}

impl<const D: usize, const N: usize, K: Kernel<D>> BlackBoxExpansions<D, N, K> {
    /// Number of Chebyshev nodes per box.
    pub const NCHEB: usize = ncoeffs(N, D);

    /// Create expansions for a kernel.
    pub fn new(kernel: K) -> Self {
        assert!(N > 0, "Interpolation order must be positive");
        let unit_nodes = LatticeIterator::<D>::new(N)
            .map(|index| chebyshev_node_nd(&index, N))
            .collect();
        Self { kernel, unit_nodes }
    }

    /// Number of Chebyshev nodes in each direction.
    pub fn order(&self) -> usize {
        N
    }

    /// Positions of all Chebyshev nodes of a box, in lattice order.
    pub fn node_positions(&self, bbox: &Bbox<D>) -> Vec<[f64; D]> {
        self.unit_nodes
            .iter()
            .map(|unit| bbox.from_unit(unit))
            .collect()
    }

    /// Accumulate `Σ_j S_i(p_j) source[j]` into `accum[i]`, where `p_j` are the nodes of
    /// `from_box` and `S_i` is the basis of `to_box`.
    fn transfer(&self, accum: &mut [f64], to_box: &Bbox<D>, from_box: &Bbox<D>, source: &[f64]) {
        for (unit, &s) in self.unit_nodes.iter().zip(source) {
            if s == 0.0 {
                continue;
            }
            let rn = ChebyshevRn::<D, N>::new(&from_box.from_unit(unit), to_box);
            for (a, index) in accum.iter_mut().zip(LatticeIterator::<D>::new(N)) {
                *a += rn.rn(&index) * s;
            }
        }
    }
}

impl<const D: usize, const N: usize, K: Kernel<D>> Expansions<D> for BlackBoxExpansions<D, N, K> {
    type Kernel = K;

    fn ncoeffs(&self) -> usize {
        Self::NCHEB
    }

    fn kernel(&self) -> &K {
        &self.kernel
    }

    fn p2m(&self, accum: &mut [f64], bbox: &Bbox<D>, position: &[f64; D], source: f64) {
        debug_assert_eq!(accum.len(), Self::NCHEB);
        let rn = ChebyshevRn::<D, N>::new(position, bbox);
        for (a, index) in accum.iter_mut().zip(LatticeIterator::<D>::new(N)) {
            *a += rn.rn(&index) * source;
        }
    }

    fn m2m(&self, accum: &mut [f64], target_box: &Bbox<D>, source_box: &Bbox<D>, source: &[f64]) {
        debug_assert_eq!(accum.len(), Self::NCHEB);
        debug_assert_eq!(source.len(), Self::NCHEB);
        // Source nodes interpolated by the parent basis
        self.transfer(accum, target_box, source_box, source);
    }

    fn m2l(&self, accum: &mut [f64], target_box: &Bbox<D>, source_box: &Bbox<D>, source: &[f64]) {
        debug_assert_eq!(accum.len(), Self::NCHEB);
        debug_assert_eq!(source.len(), Self::NCHEB);
        let source_nodes = self.node_positions(source_box);
        for (a, unit) in accum.iter_mut().zip(&self.unit_nodes) {
            let pi = target_box.from_unit(unit);
            *a += source_nodes
                .iter()
                .zip(source)
                .map(|(pj, s)| self.kernel.evaluate(&sub(pj, &pi), &pi, pj) * s)
                .sum::<f64>();
        }
    }

    fn l2l(&self, accum: &mut [f64], target_box: &Bbox<D>, source_box: &Bbox<D>, source: &[f64]) {
        debug_assert_eq!(accum.len(), Self::NCHEB);
        debug_assert_eq!(source.len(), Self::NCHEB);
        // Child nodes evaluated in the parent basis
        for (a, unit) in accum.iter_mut().zip(&self.unit_nodes) {
            let rn = ChebyshevRn::<D, N>::new(&target_box.from_unit(unit), source_box);
            *a += LatticeIterator::<D>::new(N)
                .zip(source)
                .map(|(index, s)| rn.rn(&index) * s)
                .sum::<f64>();
        }
    }

    fn l2p(&self, position: &[f64; D], bbox: &Bbox<D>, source: &[f64]) -> f64 {
        debug_assert_eq!(source.len(), Self::NCHEB);
        let rn = ChebyshevRn::<D, N>::new(position, bbox);
        LatticeIterator::<D>::new(N)
            .zip(source)
            .map(|(index, s)| rn.rn(&index) * s)
            .sum()
    }
}
