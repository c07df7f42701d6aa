//! Core data models for league analytics.

mod fixture;
mod raw;
mod stats;
mod team;

pub use fixture::*;
pub use raw::*;
pub use stats::*;
pub use team::*;
