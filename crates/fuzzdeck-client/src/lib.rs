//! HTTP adapter for the orchestrator API.
//!
//! [`HttpFleetClient`] implements [`fuzzdeck_core::ports::FleetApi`] on top of
//! reqwest. Non-2xx answers become [`fuzzdeck_core::Error::Status`] carrying
//! the reason phrase and the response body.

pub mod client;
pub mod config;

pub use client::HttpFleetClient;
pub use config::ClientConfig;
