//! The θ criterion deciding if two boxes are well separated.
use crate::geometry::{norm_squared, Bbox};

/// Separation parameter of the admissibility criterion.
pub const THETA: f64 = 0.5;

const THETA2: f64 = THETA * THETA;

/// Admissibility test from the perspective of a fixed reference box.
///
/// Let `d` be the distance between the two box centres, and let `r_big` and `r_small` be the
/// larger and smaller of the two half diagonals. The pair is near field if
/// `r_big² > θ²(d - r_small)²` or if `d <= r_small`, and far field otherwise. When both
/// radii are equal the reference box counts as the smaller one.
#[derive(Debug, Clone, Copy)]
pub struct ThetaCondition<const D: usize> {
    low: [f64; D],
    high: [f64; D],
    r2: f64,
    r: f64,
}

impl<const D: usize> ThetaCondition<D> {
    /// Create the test for the reference box `[low, high]`.
    pub fn new(low: &[f64; D], high: &[f64; D]) -> Self {
        let bbox = Bbox::new(*low, *high);
        let r2 = bbox.half_diagonal_squared();
        Self {
            low: *low,
            high: *high,
            r2,
            r: r2.sqrt(),
        }
    }

    /// Create the test for a reference box.
    pub fn from_bbox(bbox: &Bbox<D>) -> Self {
        Self::new(&bbox.bmin, &bbox.bmax)
    }

    /// Return true if the box `[low, high]` is far enough from the reference box for a
    /// multipole approximation.
    pub fn check(&self, low: &[f64; D], high: &[f64; D]) -> bool {
        let centre_diff: [f64; D] =
            std::array::from_fn(|i| high[i] + low[i] - self.low[i] - self.high[i]);
        let d = 0.5 * norm_squared(&centre_diff).sqrt();
        let other_r2 = Bbox::new(*low, *high).half_diagonal_squared();

        let (r_big2, r_small) = if other_r2 < self.r2 {
            (self.r2, other_r2.sqrt())
        } else {
            (other_r2, self.r)
        };

        d > r_small && r_big2 <= THETA2 * (d - r_small).powi(2)
    }

    /// Return true if `bbox` is far enough from the reference box for a multipole approximation.
    pub fn check_bbox(&self, bbox: &Bbox<D>) -> bool {
        self.check(&bbox.bmin, &bbox.bmax)
    }

    /// Return true if the box `[low, high]` needs direct evaluation.
    pub fn is_near_field(&self, low: &[f64; D], high: &[f64; D]) -> bool {
        !self.check(low, high)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn unit_box_at(centre: [f64; 2], half: f64) -> ([f64; 2], [f64; 2]) {
        (
            [centre[0] - half, centre[1] - half],
            [centre[0] + half, centre[1] + half],
        )
    }

    #[test]
    fn test_well_separated() {
        let (low, high) = unit_box_at([0.0, 0.0], 0.5);
        let (other_low, other_high) = unit_box_at([10.0, 10.0], 0.5);
        let theta = ThetaCondition::new(&low, &high);
        assert!(theta.check(&other_low, &other_high));
        assert!(!theta.is_near_field(&other_low, &other_high));
    }

    #[test]
    fn test_overlapping() {
        let (low, high) = unit_box_at([0.0, 0.0], 1.0 / 2.0_f64.sqrt());
        let (other_low, other_high) = unit_box_at([0.1, 0.0], 1.0 / 2.0_f64.sqrt());
        let theta = ThetaCondition::new(&low, &high);
        assert!(!theta.check(&other_low, &other_high));
    }

    #[test]
    fn test_self_is_near_field() {
        let bbox = Bbox::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        assert!(!ThetaCondition::from_bbox(&bbox).check_bbox(&bbox));
    }

    #[test]
    fn test_adjacent_boxes_are_near_field() {
        let bbox = Bbox::new([0.0, 0.0], [1.0, 1.0]);
        let neighbour = Bbox::new([1.0, 0.0], [2.0, 1.0]);
        assert!(!ThetaCondition::from_bbox(&bbox).check_bbox(&neighbour));
    }

    #[test]
    fn test_monotone_in_distance() {
        let (low, high) = unit_box_at([0.0, 0.0], 0.5);
        let theta = ThetaCondition::new(&low, &high);
        let mut admissible = false;
        for i in 0..200 {
            let (other_low, other_high) = unit_box_at([0.05 * i as f64, 0.02 * i as f64], 0.25);
            let now = theta.check(&other_low, &other_high);
            // Once admissible, moving further away never becomes near field again
            assert!(!admissible || now);
            admissible = now;
        }
        assert!(admissible);
    }

    #[test]
    fn test_larger_candidate_box() {
        let small = Bbox::new([0.0, 0.0], [0.1, 0.1]);
        let large = Bbox::new([1.0, 1.0], [3.0, 3.0]);
        let far_large = Bbox::new([30.0, 30.0], [32.0, 32.0]);
        let theta = ThetaCondition::from_bbox(&small);
        assert!(!theta.check_bbox(&large));
        assert!(theta.check_bbox(&far_large));
    }
}
