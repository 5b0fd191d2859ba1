//! Expansion strategies for the fast multipole method.
mod black_box;
mod multiquadric;

pub use black_box::BlackBoxExpansions;
pub use multiquadric::MultiquadricExpansions;
