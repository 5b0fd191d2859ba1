//! Spatial index interface used by box searches
use crate::types::Point;

/// An object with a position.
pub trait Particle<const D: usize> {
    /// The position of the particle.
    fn position(&self) -> &[f64; D];
}

impl<const D: usize> Particle<D> for [f64; D] {
    fn position(&self) -> &[f64; D] {
        self
    }
}

impl<const D: usize> Particle<D> for Point<D> {
    fn position(&self) -> &[f64; D] {
        &self.coordinate
    }
}

/// The particles of one bucket, together with the periodic offset that has to be added to
/// their positions when the bucket is seen from a neighbouring bucket.
#[derive(Debug)]
pub struct BucketRange<'a, P, const D: usize> {
    /// The particles in the bucket.
    pub particles: &'a [P],
    /// Offset added to every particle position.
    pub transpose: [f64; D],
}

impl<'a, P, const D: usize> BucketRange<'a, P, D> {
    /// A bucket without periodic offset.
    pub fn new(particles: &'a [P]) -> Self {
        Self {
            particles,
            transpose: [0.0; D],
        }
    }

    /// A bucket seen through a periodic boundary.
    pub fn with_transpose(particles: &'a [P], transpose: [f64; D]) -> Self {
        Self {
            particles,
            transpose,
        }
    }
}

impl<P, const D: usize> Clone for BucketRange<'_, P, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, const D: usize> Copy for BucketRange<'_, P, D> {}

/// A read only spatial index that sorts particles into buckets.
pub trait NeighbourQuery<const D: usize> {
    /// Particle type
    type Particle: Particle<D>;
    /// Handle identifying a bucket
    type Bucket: Copy;
    /// Iterator over neighbouring buckets
    type NearBuckets<'a>: Iterator<Item = Self::Bucket>
    where
        Self: 'a;

    /// The bucket containing a point.
    fn get_bucket(&self, position: &[f64; D]) -> Self::Bucket;

    /// The bucket itself and its neighbours, at most 3^D buckets.
    fn get_near_buckets(&self, bucket: Self::Bucket) -> Self::NearBuckets<'_>;

    /// The particles in a bucket.
    fn get_bucket_particles(&self, bucket: Self::Bucket) -> BucketRange<'_, Self::Particle, D>;

    /// Half width per dimension of the smallest box guaranteed to be covered by the near
    /// buckets of the bucket containing its centre.
    fn get_min_bucket_size(&self) -> [f64; D];
}
