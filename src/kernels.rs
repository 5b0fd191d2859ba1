//! Radial kernels.
use crate::geometry::norm_squared;
use crate::traits::Kernel;

/// Gaussian kernel `exp(-|dx|² / σ²)`.
#[derive(Debug, Clone, Copy)]
pub struct Gaussian {
    inv_sigma2: f64,
}

impl Gaussian {
    /// Create a Gaussian kernel with width `sigma`.
    pub fn new(sigma: f64) -> Self {
        Self {
            inv_sigma2: 1.0 / (sigma * sigma),
        }
    }
}

impl<const D: usize> Kernel<D> for Gaussian {
    #[inline]
    fn evaluate(&self, dx: &[f64; D], _target: &[f64; D], _source: &[f64; D]) -> f64 {
        (-norm_squared(dx) * self.inv_sigma2).exp()
    }
}

/// Multiquadric kernel `sqrt(|dx|² + c²)`.
#[derive(Debug, Clone, Copy)]
pub struct Multiquadric {
    c2: f64,
}

impl Multiquadric {
    /// Create a multiquadric kernel with shape parameter `c`.
    pub fn new(c: f64) -> Self {
        Self { c2: c * c }
    }
}

impl<const D: usize> Kernel<D> for Multiquadric {
    #[inline]
    fn evaluate(&self, dx: &[f64; D], _target: &[f64; D], _source: &[f64; D]) -> f64 {
        (norm_squared(dx) + self.c2).sqrt()
    }
}

/// Inverse multiquadric kernel `1 / sqrt(|dx|² + c²)`.
#[derive(Debug, Clone, Copy)]
pub struct InverseMultiquadric {
    c2: f64,
}

impl InverseMultiquadric {
    /// Create an inverse multiquadric kernel with shape parameter `c`.
    pub fn new(c: f64) -> Self {
        Self { c2: c * c }
    }
}

impl<const D: usize> Kernel<D> for InverseMultiquadric {
    #[inline]
    fn evaluate(&self, dx: &[f64; D], _target: &[f64; D], _source: &[f64; D]) -> f64 {
        1.0 / (norm_squared(dx) + self.c2).sqrt()
    }
}
