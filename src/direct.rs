//! Direct summation of kernel interactions.
use rayon::prelude::*;

use crate::geometry::sub;
use crate::traits::Kernel;
use crate::types::{Error, Result};

/// Sum `K(source - target, target, source) * charge` over a range of sources.
pub fn evaluate_direct<const D: usize, K: Kernel<D>>(
    kernel: &K,
    target: &[f64; D],
    sources: &[[f64; D]],
    charges: &[f64],
) -> f64 {
    debug_assert_eq!(sources.len(), charges.len());
    sources
        .iter()
        .zip(charges)
        .map(|(source, charge)| kernel.evaluate(&sub(source, target), target, source) * charge)
        .sum()
}

/// Evaluate the potential of all sources at all targets by direct summation.
///
/// This is the O(N·M) reference the fast multipole method approximates. If `multithreaded`
/// is set the targets are split over the rayon thread pool.
pub fn evaluate_all<const D: usize, K: Kernel<D>>(
    kernel: &K,
    targets: &[[f64; D]],
    sources: &[[f64; D]],
    charges: &[f64],
    multithreaded: bool,
) -> Result<Vec<f64>> {
    if sources.len() != charges.len() {
        return Err(Error::ChargeCount {
            expected: sources.len(),
            found: charges.len(),
        });
    }
    Ok(if multithreaded {
        targets
            .par_iter()
            .map(|target| evaluate_direct(kernel, target, sources, charges))
            .collect()
    } else {
        targets
            .iter()
            .map(|target| evaluate_direct(kernel, target, sources, charges))
            .collect()
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kernels::Gaussian;
    use approx::assert_relative_eq;

    #[test]
    fn test_direct_sum() {
        let kernel = |dx: &[f64; 2], _: &[f64; 2], _: &[f64; 2]| dx[0] + 2.0 * dx[1];
        let sources = [[1.0, 0.0], [0.0, 1.0], [2.0, 2.0]];
        let charges = [1.0, 2.0, -1.0];
        let value = evaluate_direct(&kernel, &[0.0, 0.0], &sources, &charges);
        assert_relative_eq!(value, 1.0 + 4.0 - 6.0);
    }

    #[test]
    fn test_target_before_source() {
        let kernel =
            |_: &[f64; 1], target: &[f64; 1], source: &[f64; 1]| 10.0 * target[0] + source[0];
        let value = evaluate_direct(&kernel, &[2.0], &[[3.0]], &[1.0]);
        assert_relative_eq!(value, 23.0);
    }

    #[test]
    fn test_empty_range() {
        let value = evaluate_direct(&Gaussian::new(1.0), &[0.0; 3], &[], &[]);
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_multithreaded_matches_serial() {
        let kernel = Gaussian::new(0.3);
        let points = (0..50)
            .map(|i| [(i as f64 * 0.37).sin(), (i as f64 * 0.11).cos()])
            .collect::<Vec<_>>();
        let charges = (0..50).map(|i| 1.0 / (1.0 + i as f64)).collect::<Vec<_>>();
        let serial = evaluate_all(&kernel, &points, &points, &charges, false).unwrap();
        let parallel = evaluate_all(&kernel, &points, &points, &charges, true).unwrap();
        for (s, p) in serial.iter().zip(&parallel) {
            assert_relative_eq!(*s, *p, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_charge_count() {
        let points = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let result = evaluate_all(&Gaussian::new(1.0), &points, &points, &[1.0, 2.0], true);
        assert!(matches!(
            result,
            Err(Error::ChargeCount {
                expected: 3,
                found: 2
            })
        ));
    }
}
