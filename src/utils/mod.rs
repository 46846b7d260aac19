//! # Utility Modules
//!
//! Supporting pieces that sit beside the codec.
//!
//! ## Components
//! - **Logging**: tracing-subscriber setup from [`LoggingConfig`](crate::config::LoggingConfig)
//! - **Metrics**: Thread-safe encode/decode counters

pub mod logging;
pub mod metrics;

pub use metrics::{global_metrics, Metrics, MetricsSnapshot};
