//! Black box fast multipole method
//!
//! Kernel independent fast multipole evaluation of particle interactions using Chebyshev
//! interpolation, together with a bounded box search over bucketed particle sets.
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod admissibility;
pub mod box_search;
pub mod cell_list;
pub mod chebyshev;
pub mod direct;
pub mod expansions;
pub mod fmm;
pub mod geometry;
pub mod kernels;
pub mod traits;
pub mod tree;
pub mod types;

pub use fmm::{Fmm, FmmOptions};
pub use types::{Error, Result};
