//! Search for all particles inside an axis aligned box around a query point.
//!
//! The search walks the particle ranges of the buckets neighbouring the query point and
//! filters them by box membership. All state lives in a fixed capacity stack, so advancing
//! the iterator never allocates or recurses.
use arrayvec::ArrayVec;
use log::trace;

use crate::geometry::{add, ncoeffs, sub};
use crate::traits::{BucketRange, NeighbourQuery, Particle};
use crate::types::{Error, Result};

/// Maximum number of buckets a single search visits. Enough for the 3^D neighbours in up to
/// three dimensions.
pub const MAX_NEAR_BUCKETS: usize = 27;

/// Lazy iterator over the particles inside a box.
///
/// Yields each matching particle together with its displacement from the box centre, the
/// periodic offset of its bucket included. The iterator is exhausted when the stack of
/// candidate ranges is empty.
pub struct BoxSearchIterator<'a, P, const D: usize> {
    centre: [f64; D],
    half_width: [f64; D],
    dx: [f64; D],
    buckets_to_search: ArrayVec<BucketRange<'a, P, D>, MAX_NEAR_BUCKETS>,
    current: usize,
}

impl<'a, P: Particle<D>, const D: usize> BoxSearchIterator<'a, P, D> {
    const CAPACITY_CHECK: () = assert!(
        ncoeffs(3, D) <= MAX_NEAR_BUCKETS,
        "Box search supports at most three dimensions"
    );

    /// Create a search for the box `[centre - half_width, centre + half_width]` with no
    /// candidate ranges yet.
    pub fn new(centre: [f64; D], half_width: [f64; D]) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_CHECK;
        Self {
            centre,
            half_width,
            dx: [0.0; D],
            buckets_to_search: ArrayVec::new(),
            current: 0,
        }
    }

    /// An exhausted search, equal to every other exhausted search.
    pub fn empty() -> Self {
        Self::new([0.0; D], [0.0; D])
    }

    /// Add the particles of a bucket to the candidates.
    ///
    /// The first non-empty range becomes the active one and the cursor moves to its first
    /// matching particle. Later ranges are queued beneath the active range. Empty ranges are
    /// dropped.
    ///
    /// # Panics
    /// Panics if more than [MAX_NEAR_BUCKETS] non-empty ranges are added.
    pub fn add_range(&mut self, range: BucketRange<'a, P, D>) {
        if range.particles.is_empty() {
            return;
        }
        if self.buckets_to_search.is_empty() {
            self.buckets_to_search.push(range);
            self.current = 0;
            if !self.check_candidate() {
                self.increment();
            }
        } else {
            let active = self.buckets_to_search.len() - 1;
            self.buckets_to_search.insert(active, range);
        }
    }

    /// Return true if no candidates are left.
    pub fn is_empty(&self) -> bool {
        self.buckets_to_search.is_empty()
    }

    /// The current particle and its displacement from the box centre.
    pub fn get(&self) -> Option<(&'a P, [f64; D])> {
        self.current_particle().map(|p| (p, self.dx))
    }

    fn current_particle(&self) -> Option<&'a P> {
        self.buckets_to_search.last().map(|range| {
            let particles: &'a [P] = range.particles;
            &particles[self.current]
        })
    }

    /// Move the cursor one position, popping exhausted ranges. Returns false once the stack
    /// is empty.
    fn go_to_next_candidate(&mut self) -> bool {
        let Some(active) = self.buckets_to_search.last() else {
            return false;
        };
        self.current += 1;
        if self.current == active.particles.len() {
            self.buckets_to_search.pop();
            if self.buckets_to_search.is_empty() {
                return false;
            }
            self.current = 0;
        }
        true
    }

    fn check_candidate(&mut self) -> bool {
        let Some(range) = self.buckets_to_search.last() else {
            return false;
        };
        let p = add(range.particles[self.current].position(), &range.transpose);
        self.dx = sub(&p, &self.centre);
        trace!(
            "check_candidate: centre = {:?} other = {:?} transpose = {:?} half width = {:?}",
            self.centre,
            p,
            range.transpose,
            self.half_width
        );
        self.dx
            .iter()
            .zip(&self.half_width)
            .all(|(dx, w)| dx.abs() <= *w)
    }

    fn increment(&mut self) {
        while self.go_to_next_candidate() {
            if self.check_candidate() {
                break;
            }
        }
    }
}

impl<P, const D: usize> Clone for BoxSearchIterator<'_, P, D> {
    fn clone(&self) -> Self {
        Self {
            centre: self.centre,
            half_width: self.half_width,
            dx: self.dx,
            buckets_to_search: self.buckets_to_search.clone(),
            current: self.current,
        }
    }
}

impl<P: Particle<D>, const D: usize> PartialEq for BoxSearchIterator<'_, P, D> {
    fn eq(&self, other: &Self) -> bool {
        match (self.current_particle(), other.current_particle()) {
            (None, None) => true,
            (Some(a), Some(b)) => std::ptr::eq(a, b),
            _ => false,
        }
    }
}

impl<'a, P: Particle<D>, const D: usize> Iterator for BoxSearchIterator<'a, P, D> {
    type Item = (&'a P, [f64; D]);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.get()?;
        self.increment();
        Some(item)
    }
}

fn search_near_buckets<'a, const D: usize, Q: NeighbourQuery<D>>(
    query: &'a Q,
    centre: &[f64; D],
    half_width: &[f64; D],
) -> BoxSearchIterator<'a, Q::Particle, D> {
    let mut search = BoxSearchIterator::new(*centre, *half_width);
    for bucket in query.get_near_buckets(query.get_bucket(centre)) {
        search.add_range(query.get_bucket_particles(bucket));
    }
    search
}

fn fits_in_bucket<const D: usize>(half_width: &[f64; D], bucket_size: &[f64; D]) -> bool {
    half_width.iter().zip(bucket_size).all(|(w, b)| w <= b)
}

/// Iterate over all particles `p` with `|p - centre| <= half_width` in every dimension.
///
/// # Panics
/// Panics if `half_width` exceeds the minimum bucket size of `query` in any dimension, as the
/// near buckets would not cover the box.
pub fn box_search<'a, const D: usize, Q: NeighbourQuery<D>>(
    query: &'a Q,
    centre: &[f64; D],
    half_width: &[f64; D],
) -> BoxSearchIterator<'a, Q::Particle, D> {
    let bucket_size = query.get_min_bucket_size();
    assert!(
        fits_in_bucket(half_width, &bucket_size),
        "Box search with half width {half_width:?} greater than the minimum bucket size {bucket_size:?} is not supported"
    );
    search_near_buckets(query, centre, half_width)
}

/// As [box_search], but returns an error instead of panicking if the box is too large.
pub fn try_box_search<'a, const D: usize, Q: NeighbourQuery<D>>(
    query: &'a Q,
    centre: &[f64; D],
    half_width: &[f64; D],
) -> Result<BoxSearchIterator<'a, Q::Particle, D>> {
    let bucket_size = query.get_min_bucket_size();
    if !fits_in_bucket(half_width, &bucket_size) {
        return Err(Error::BoxTooLarge {
            half_width: half_width.to_vec(),
            bucket_size: bucket_size.to_vec(),
        });
    }
    Ok(search_near_buckets(query, centre, half_width))
}

/// Box search with the minimum bucket size of `query` as half width.
pub fn bucket_search<'a, const D: usize, Q: NeighbourQuery<D>>(
    query: &'a Q,
    centre: &[f64; D],
) -> BoxSearchIterator<'a, Q::Particle, D> {
    search_near_buckets(query, centre, &query.get_min_bucket_size())
}
