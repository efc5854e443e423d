//! Fuzzdeck Core
//!
//! Domain types, ports, and error handling for the Fuzzdeck control panel.
//! Every entity here is a read-mostly projection of state owned by the
//! fuzzing orchestrator; nothing in this crate persists or caches data.

pub mod agent;
pub mod crash;
pub mod error;
pub mod ids;
pub mod job;
pub mod metrics;
pub mod ports;
pub mod route;

pub use error::{Error, Result};
pub use ids::*;
pub use route::ApiPath;
