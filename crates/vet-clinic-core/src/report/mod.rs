//! Report export for veterinarian statistics.

mod statistics;

pub use statistics::*;
