//! Integration test infrastructure for Fuzzdeck.
//!
//! Stands up the orchestrator HTTP contract with wiremock and wires the real
//! [`fuzzdeck_client::HttpFleetClient`] into the console layer.
//!
//! # Usage
//!
//! ```ignore
//! use fuzzdeck_tests::TestBackend;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let backend = TestBackend::start().await;
//!     backend.agents(serde_json::json!([])).await;
//!     let summary = backend.console().stats().load().await;
//! }
//! ```

pub mod fixtures;
pub mod helpers;

pub use helpers::TestBackend;

/// Initialize test logging (call once per test binary).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,fuzzdeck=debug")),
        )
        .with_test_writer()
        .try_init();
}
