//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry, health, api produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer, filtered by RUST_LOG or config)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Metrics go through the `metrics` facade; without an installed
//!   recorder every update is a no-op
//! - Log filter from RUST_LOG wins over the configured level

pub mod logging;
pub mod metrics;
