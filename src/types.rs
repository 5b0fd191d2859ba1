//! Type definitions

/// Generic error type
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The number of charges does not match the number of sources.
    #[error("Expected {expected} charges, found {found}")]
    ChargeCount {
        /// Number of source points.
        expected: usize,
        /// Number of charges supplied.
        found: usize,
    },
    /// A box search was requested with a box larger than the smallest bucket.
    #[error("Box half width {half_width:?} exceeds the minimum bucket size {bucket_size:?}")]
    BoxTooLarge {
        /// Requested half width.
        half_width: Vec<f64>,
        /// Minimum bucket size of the spatial index.
        bucket_size: Vec<f64>,
    },
    /// A bucket size was not strictly positive and finite.
    #[error("Invalid bucket size {0:?}")]
    InvalidBucketSize(Vec<f64>),
    /// A particle does not lie inside the domain of a spatial index.
    #[error("Particle at {0:?} lies outside of the domain")]
    ParticleOutsideDomain(Vec<f64>),
    /// A periodic dimension is too coarse for its neighbour buckets to be distinct.
    #[error("Periodic dimension {0} needs at least three buckets")]
    TooFewPeriodicBuckets(usize),
    /// A thread pool for serial evaluation could not be created.
    #[error("Could not build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// A point with a position and the index of the point in the input data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<const D: usize> {
    /// Physical coordinate in Cartesian space.
    pub coordinate: [f64; D],

    /// Global unique index.
    pub global_idx: usize,
}

impl<const D: usize> Point<D> {
    /// Create a new point.
    pub fn new(coordinate: [f64; D], global_idx: usize) -> Self {
        Self {
            coordinate,
            global_idx,
        }
    }
}
