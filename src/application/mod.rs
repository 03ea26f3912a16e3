// Application layer - tenancy enforcement and validation around the store.
// Aggregation stays in the domain layer; this module only orchestrates.

pub mod error;
mod service;

pub use error::*;
pub use service::*;
