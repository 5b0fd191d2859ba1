//! Trait definitions

mod expansion;
mod kernel;
mod search;

pub use expansion::Expansions;
pub use kernel::Kernel;
pub use search::{BucketRange, NeighbourQuery, Particle};
