//! Expansion transfer operators
use crate::geometry::Bbox;
use crate::traits::Kernel;

/// The five transfer operators of a fast multipole method.
///
/// Every expansion is a slice of [Expansions::ncoeffs] coefficients. Operators accumulate into
/// `accum` and never overwrite it, so expansions must be zeroed before each pass.
pub trait Expansions<const D: usize>: Sync {
    /// Kernel type
    type Kernel: Kernel<D>;

    /// Number of coefficients of each expansion.
    fn ncoeffs(&self) -> usize;

    /// The kernel, used for direct evaluation of the near field.
    fn kernel(&self) -> &Self::Kernel;

    /// Particle to multipole: add the contribution of a source of strength `source` at
    /// `position` to the multipole expansion of `bbox`.
    fn p2m(&self, accum: &mut [f64], bbox: &Bbox<D>, position: &[f64; D], source: f64);

    /// Multipole to multipole: re-express the multipole expansion of a child box in the basis
    /// of its parent.
    fn m2m(&self, accum: &mut [f64], target_box: &Bbox<D>, source_box: &Bbox<D>, source: &[f64]);

    /// Multipole to local: add the far field of `source_box` to the local expansion of a well
    /// separated `target_box`.
    fn m2l(&self, accum: &mut [f64], target_box: &Bbox<D>, source_box: &Bbox<D>, source: &[f64]);

    /// Local to local: re-express the local expansion of a parent box in the basis of a child.
    fn l2l(&self, accum: &mut [f64], target_box: &Bbox<D>, source_box: &Bbox<D>, source: &[f64]);

    /// Local to particle: evaluate the local expansion of `bbox` at `position`.
    fn l2p(&self, position: &[f64; D], bbox: &Bbox<D>, source: &[f64]) -> f64;
}
