//! Pairwise interaction kernels

/// A pairwise kernel `K(dx, target, source)` with `dx = source - target`.
///
/// The target point is passed before the source point. Kernels that are not symmetric in
/// their two points must follow this order.
///
/// The kernel must be well approximated by a separable low rank expansion on well separated
/// boxes. This is not checked.
pub trait Kernel<const D: usize>: Sync {
    /// Evaluate the kernel.
    fn evaluate(&self, dx: &[f64; D], target: &[f64; D], source: &[f64; D]) -> f64;
}

impl<const D: usize, F> Kernel<D> for F
where
    F: Fn(&[f64; D], &[f64; D], &[f64; D]) -> f64 + Sync,
{
    #[inline]
    fn evaluate(&self, dx: &[f64; D], target: &[f64; D], source: &[f64; D]) -> f64 {
        self(dx, target, source)
    }
}
