//! A uniform cell list with optional periodic boundaries.
//!
//! Particles are sorted by cell so the particles of each cell form a contiguous slice. The
//! near buckets of a cell are the cell itself and its direct neighbours, with periodic images
//! reported through the bucket transpose.
use itertools::Itertools;
use log::info;

use crate::geometry::{Bbox, LatticeIterator};
use crate::traits::{BucketRange, NeighbourQuery, Particle};
use crate::types::{Error, Result};

/// Handle to a cell, possibly seen through a periodic boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellBucket<const D: usize> {
    index: usize,
    transpose: [f64; D],
}

impl<const D: usize> CellBucket<D> {
    /// Linear index of the cell.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Offset added to the positions of particles in this cell.
    pub fn transpose(&self) -> [f64; D] {
        self.transpose
    }
}

/// Uniform grid of buckets over a box shaped domain.
#[derive(Debug, Clone)]
pub struct CellList<P, const D: usize> {
    domain: Bbox<D>,
    periodic: [bool; D],
    ncells: [usize; D],
    cell_size: [f64; D],
    particles: Vec<P>,
    cell_start: Vec<usize>,
}

impl<P: Particle<D>, const D: usize> CellList<P, D> {
    /// Sort particles into cells of at least `bucket_size` along each dimension.
    ///
    /// Every particle must lie inside `domain`. Periodic dimensions need at least three cells.
    pub fn new(
        particles: Vec<P>,
        domain: Bbox<D>,
        periodic: [bool; D],
        bucket_size: [f64; D],
    ) -> Result<Self> {
        if bucket_size.iter().any(|b| !b.is_finite() || *b <= 0.0) {
            return Err(Error::InvalidBucketSize(bucket_size.to_vec()));
        }
        let side_lengths = domain.side_lengths();
        let ncells: [usize; D] = std::array::from_fn(|d| {
            ((side_lengths[d] / bucket_size[d]).floor() as usize).max(1)
        });
        if let Some(d) = (0..D).find(|&d| periodic[d] && ncells[d] < 3) {
            return Err(Error::TooFewPeriodicBuckets(d));
        }
        if let Some(p) = particles.iter().find(|p| !domain.contains(p.position())) {
            return Err(Error::ParticleOutsideDomain(p.position().to_vec()));
        }
        let cell_size: [f64; D] = std::array::from_fn(|d| side_lengths[d] / ncells[d] as f64);

        let mut list = Self {
            domain,
            periodic,
            ncells,
            cell_size,
            particles: Vec::new(),
            cell_start: Vec::new(),
        };

        // Counting sort by cell, stable within each cell
        let ncells_total: usize = ncells.iter().product();
        let cell_ids = particles
            .iter()
            .map(|p| list.linear_index(&list.cell_coords(p.position())))
            .collect_vec();
        let mut cell_start = vec![0; ncells_total + 1];
        for &id in &cell_ids {
            cell_start[id + 1] += 1;
        }
        for c in 0..ncells_total {
            cell_start[c + 1] += cell_start[c];
        }
        let mut slots = particles
            .into_iter()
            .zip(cell_ids)
            .map(|(p, id)| (id, p))
            .collect_vec();
        slots.sort_by_key(|(id, _)| *id);

        list.particles = slots.into_iter().map(|(_, p)| p).collect();
        list.cell_start = cell_start;

        info!(
            "Created cell list with {} particles in {:?} cells",
            list.particles.len(),
            ncells
        );
        Ok(list)
    }

    /// Build a non-periodic cell list over the bounding box of the particles.
    pub fn from_particles(particles: Vec<P>, bucket_size: [f64; D]) -> Result<Self> {
        let positions = particles.iter().map(|p| *p.position()).collect_vec();
        let domain = Bbox::from_points(&positions);
        Self::new(particles, domain, [false; D], bucket_size)
    }

    /// The domain covered by the cells.
    pub fn domain(&self) -> &Bbox<D> {
        &self.domain
    }

    /// Number of cells along each dimension.
    pub fn ncells(&self) -> [usize; D] {
        self.ncells
    }

    /// All particles, sorted by cell.
    pub fn particles(&self) -> &[P] {
        &self.particles
    }

    fn cell_coords(&self, position: &[f64; D]) -> [usize; D] {
        std::array::from_fn(|d| {
            let c = ((position[d] - self.domain.bmin[d]) / self.cell_size[d]).floor();
            c.clamp(0.0, (self.ncells[d] - 1) as f64) as usize
        })
    }

    fn linear_index(&self, coords: &[usize; D]) -> usize {
        coords
            .iter()
            .zip(&self.ncells)
            .fold(0, |acc, (c, n)| acc * n + c)
    }

    fn coords_from_index(&self, mut index: usize) -> [usize; D] {
        let mut coords = [0; D];
        for d in (0..D).rev() {
            coords[d] = index % self.ncells[d];
            index /= self.ncells[d];
        }
        coords
    }
}

/// Iterator over the cells neighbouring a cell.
pub struct CellNeighbours<'a, P, const D: usize> {
    list: &'a CellList<P, D>,
    base: [usize; D],
    base_transpose: [f64; D],
    offsets: LatticeIterator<D>,
}

impl<P: Particle<D>, const D: usize> Iterator for CellNeighbours<'_, P, D> {
    type Item = CellBucket<D>;

    fn next(&mut self) -> Option<Self::Item> {
        'offsets: for offset in self.offsets.by_ref() {
            let mut coords = [0; D];
            let mut transpose = self.base_transpose;
            for d in 0..D {
                let n = self.list.ncells[d] as isize;
                let mut c = self.base[d] as isize + offset[d] as isize - 1;
                if c < 0 || c >= n {
                    if !self.list.periodic[d] {
                        continue 'offsets;
                    }
                    let length = self.list.domain.bmax[d] - self.list.domain.bmin[d];
                    if c < 0 {
                        c += n;
                        transpose[d] -= length;
                    } else {
                        c -= n;
                        transpose[d] += length;
                    }
                }
                coords[d] = c as usize;
            }
            return Some(CellBucket {
                index: self.list.linear_index(&coords),
                transpose,
            });
        }
        None
    }
}

impl<P: Particle<D>, const D: usize> NeighbourQuery<D> for CellList<P, D> {
    type Particle = P;
    type Bucket = CellBucket<D>;
    type NearBuckets<'a>
        = CellNeighbours<'a, P, D>
    where
        Self: 'a;

    fn get_bucket(&self, position: &[f64; D]) -> CellBucket<D> {
        // Periodic dimensions map the position to its image inside the domain
        let mut wrapped = *position;
        let mut transpose = [0.0; D];
        for d in 0..D {
            if self.periodic[d] {
                let length = self.domain.bmax[d] - self.domain.bmin[d];
                let shift = ((position[d] - self.domain.bmin[d]) / length).floor() * length;
                wrapped[d] -= shift;
                transpose[d] = shift;
            }
        }
        CellBucket {
            index: self.linear_index(&self.cell_coords(&wrapped)),
            transpose,
        }
    }

    fn get_near_buckets(&self, bucket: CellBucket<D>) -> CellNeighbours<'_, P, D> {
        CellNeighbours {
            list: self,
            base: self.coords_from_index(bucket.index),
            base_transpose: bucket.transpose,
            offsets: LatticeIterator::new(3),
        }
    }

    fn get_bucket_particles(&self, bucket: CellBucket<D>) -> BucketRange<'_, P, D> {
        let start = self.cell_start[bucket.index];
        let end = self.cell_start[bucket.index + 1];
        BucketRange::with_transpose(&self.particles[start..end], bucket.transpose)
    }

    fn get_min_bucket_size(&self) -> [f64; D] {
        self.cell_size
    }
}
