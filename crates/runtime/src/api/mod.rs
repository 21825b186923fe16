//! HTTP query API
//!
//! Optional JSON interface to the quality engine, compiled only with the
//! `http-api` feature.

pub mod middleware;
pub mod routes;
pub mod server;
pub mod traits;
pub mod types;

pub use routes::ApiState;
pub use server::{ApiDoc, HttpApiConfig, HttpApiServer};
pub use traits::QualityApiProvider;
