//! Domain models for the vet-clinic system.

mod account;
mod appointment;
mod pet;
mod record;
mod service;
mod stats;

pub use account::*;
pub use appointment::*;
pub use pet::*;
pub use record::*;
pub use service::*;
pub use stats::*;
