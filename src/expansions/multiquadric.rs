//! Analytic expansions for the multiquadric kernel.
use log::warn;

use crate::geometry::{ncoeffs, Bbox};
use crate::kernels::Multiquadric;
use crate::traits::Expansions;

/// Expansions specialised to the multiquadric kernel `sqrt(r² + c²)`.
///
/// No closed form translation operators are available for this strategy yet: every operator
/// leaves its output untouched and [Expansions::l2p] returns zero, so an FMM using it only
/// computes the near field. Use [crate::expansions::BlackBoxExpansions] with a
/// [Multiquadric] kernel for a complete evaluation.
#[derive(Debug, Clone)]
pub struct MultiquadricExpansions<const D: usize, const N: usize> {
    kernel: Multiquadric,
}

impl<const D: usize, const N: usize> MultiquadricExpansions<D, N> {
    /// Create expansions with shape parameter `c`.
    pub fn new(c: f64) -> Self {
        assert!(N > 0, "Interpolation order must be positive");
        warn!("Multiquadric expansions are not implemented. The far field will evaluate to zero.");
        Self {
            kernel: Multiquadric::new(c),
        }
    }
}

impl<const D: usize, const N: usize> Expansions<D> for MultiquadricExpansions<D, N> {
    type Kernel = Multiquadric;

    fn ncoeffs(&self) -> usize {
        ncoeffs(N, D)
    }

    fn kernel(&self) -> &Multiquadric {
        &self.kernel
    }

    fn p2m(&self, _accum: &mut [f64], _bbox: &Bbox<D>, _position: &[f64; D], _source: f64) {}

    fn m2m(
        &self,
        _accum: &mut [f64],
        _target_box: &Bbox<D>,
        _source_box: &Bbox<D>,
        _source: &[f64],
    ) {
    }

    fn m2l(
        &self,
        _accum: &mut [f64],
        _target_box: &Bbox<D>,
        _source_box: &Bbox<D>,
        _source: &[f64],
    ) {
    }

    fn l2l(
        &self,
        _accum: &mut [f64],
        _target_box: &Bbox<D>,
        _source_box: &Bbox<D>,
        _source: &[f64],
    ) {
    }

    fn l2p(&self, _position: &[f64; D], _bbox: &Bbox<D>, _source: &[f64]) -> f64 {
        0.0
    }
}
