//! Axis aligned boxes, small vector helpers and lattice enumeration.

/// Relative padding applied to bounding boxes computed from point sets.
const BBOX_PADDING: f64 = 1e-5;

/// Number of points in the lattice [0, n)^d.
pub const fn ncoeffs(n: usize, d: usize) -> usize {
    let mut result = 1;
    let mut i = 0;
    while i < d {
        result *= n;
        i += 1;
    }
    result
}

/// Componentwise difference `a - b`.
#[inline]
pub fn sub<const D: usize>(a: &[f64; D], b: &[f64; D]) -> [f64; D] {
    std::array::from_fn(|i| a[i] - b[i])
}

/// Componentwise sum `a + b`.
#[inline]
pub fn add<const D: usize>(a: &[f64; D], b: &[f64; D]) -> [f64; D] {
    std::array::from_fn(|i| a[i] + b[i])
}

/// Squared Euclidean norm.
#[inline]
pub fn norm_squared<const D: usize>(a: &[f64; D]) -> f64 {
    a.iter().map(|x| x * x).sum()
}

/// An axis aligned box in D dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bbox<const D: usize> {
    /// The lower corner.
    pub bmin: [f64; D],
    /// The upper corner.
    pub bmax: [f64; D],
}

impl<const D: usize> Bbox<D> {
    /// Create a box from its lower and upper corner.
    pub fn new(bmin: [f64; D], bmax: [f64; D]) -> Self {
        debug_assert!(
            bmin.iter().zip(&bmax).all(|(l, h)| l <= h),
            "Lower corner {bmin:?} is not below upper corner {bmax:?}"
        );
        Self { bmin, bmax }
    }

    /// The box [0, 1]^D.
    pub fn unit() -> Self {
        Self::new([0.0; D], [1.0; D])
    }

    /// Compute a box enclosing a set of points.
    ///
    /// The box is padded so that no point lies on its boundary and no side has zero length.
    /// An empty set of points gives the unit box.
    pub fn from_points(points: &[[f64; D]]) -> Self {
        if points.is_empty() {
            return Self::unit();
        }
        let mut bmin = [f64::INFINITY; D];
        let mut bmax = [f64::NEG_INFINITY; D];
        for p in points {
            for i in 0..D {
                bmin[i] = bmin[i].min(p[i]);
                bmax[i] = bmax[i].max(p[i]);
            }
        }

        // Pad relative to the largest extent, falling back to an absolute size for a single point
        let diameter = (0..D).map(|i| bmax[i] - bmin[i]).fold(0.0, f64::max);
        let err = if diameter > 0.0 {
            BBOX_PADDING * diameter
        } else {
            BBOX_PADDING
        };
        for i in 0..D {
            bmin[i] -= err;
            bmax[i] += err;
        }
        Self { bmin, bmax }
    }

    /// Centre of the box.
    pub fn centre(&self) -> [f64; D] {
        std::array::from_fn(|i| 0.5 * (self.bmin[i] + self.bmax[i]))
    }

    /// Side lengths of the box.
    pub fn side_lengths(&self) -> [f64; D] {
        sub(&self.bmax, &self.bmin)
    }

    /// Squared half length of the box diagonal.
    pub fn half_diagonal_squared(&self) -> f64 {
        0.25 * norm_squared(&self.side_lengths())
    }

    /// Test if a point lies in the closed box.
    pub fn contains(&self, point: &[f64; D]) -> bool {
        (0..D).all(|i| point[i] >= self.bmin[i] && point[i] <= self.bmax[i])
    }

    /// Map a point into the local coordinates [-1, 1]^D of the box.
    pub fn to_unit(&self, point: &[f64; D]) -> [f64; D] {
        std::array::from_fn(|i| {
            (2.0 * point[i] - self.bmin[i] - self.bmax[i]) / (self.bmax[i] - self.bmin[i])
        })
    }

    /// Map a point from the local coordinates [-1, 1]^D into the box.
    pub fn from_unit(&self, unit: &[f64; D]) -> [f64; D] {
        std::array::from_fn(|i| {
            0.5 * (unit[i] + 1.0) * (self.bmax[i] - self.bmin[i]) + self.bmin[i]
        })
    }

    /// The `index`-th of the 2^D boxes obtained by bisecting along every axis.
    ///
    /// Bit `d` of `index` selects the upper half along dimension `d`.
    pub fn child(&self, index: usize) -> Self {
        debug_assert!(index < 1 << D);
        let centre = self.centre();
        let mut bmin = self.bmin;
        let mut bmax = self.bmax;
        for d in 0..D {
            if index & (1 << d) != 0 {
                bmin[d] = centre[d];
            } else {
                bmax[d] = centre[d];
            }
        }
        Self { bmin, bmax }
    }

    /// The index of the child box (see [Bbox::child]) containing a point.
    pub fn child_index(&self, point: &[f64; D]) -> usize {
        let centre = self.centre();
        (0..D)
            .filter(|&d| point[d] >= centre[d])
            .fold(0, |acc, d| acc | (1 << d))
    }
}

/// Iterator over the integer lattice [0, n)^D.
///
/// Indices are generated in row-major order, the last dimension varying fastest. This order
/// is the key into every expansion coefficient array.
#[derive(Debug, Clone)]
pub struct LatticeIterator<const D: usize> {
    n: usize,
    current: [usize; D],
    done: bool,
}

impl<const D: usize> LatticeIterator<D> {
    /// Create an iterator over [0, n)^D.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            current: [0; D],
            done: n == 0,
        }
    }
}

impl<const D: usize> Iterator for LatticeIterator<D> {
    type Item = [usize; D];

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.current;

        // Odometer increment, last dimension first
        let mut d = D;
        loop {
            if d == 0 {
                self.done = true;
                break;
            }
            d -= 1;
            self.current[d] += 1;
            if self.current[d] < self.n {
                break;
            }
            self.current[d] = 0;
        }
        Some(item)
    }
}
