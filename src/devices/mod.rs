//! Device data sources
//!
//! ## Modules
//!
//! - `traits`: Snapshot types and the `TelemetrySources` trait
//! - `cached`: Latest-value cache that producers publish into

pub mod cached;
pub mod traits;

pub use cached::CachedSources;
