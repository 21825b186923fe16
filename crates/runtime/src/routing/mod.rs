//! Confidence routing
//!
//! Classifies an extraction confidence score into a band, a cache TTL and a
//! routing path (auto-approve, one of the review tiers, or manual validation).

pub mod classifier;
pub mod config;
pub mod decision;
pub mod error;

pub use classifier::*;
pub use config::*;
pub use decision::*;
pub use error::*;
