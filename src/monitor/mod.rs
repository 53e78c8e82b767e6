//! Monitoring façade.
//!
//! # Data Flow
//! ```text
//! api / daemon
//!     → MonitorService (service.rs)
//!         → ConnectionRegistry (reads, mutations, reload)
//!         → ProbeDispatcher (manual checks)
//!         → PollScheduler (periodic checks)
//!         → HealthCache (latest results)
//! ```
//!
//! # Design Decisions
//! - One service per process, shared behind `Arc`
//! - Read paths degrade (empty list, unknown status); write paths propagate
//! - A successful mutation resyncs a running poll session

pub mod service;

pub use service::{BuildError, MonitorService, WakeError};
