//! Health monitoring subsystem.
//!
//! # Data Flow
//! ```text
//! Periodic (scheduler.rs):
//!     Wall-clock ticker
//!     → one detached task per connection
//!     → dispatch.rs (probe under deadline, normalize failures)
//!     → cache.rs (overwrite latest result)
//!
//! Manual (check_one / check_all):
//!     → dispatch.rs directly, independent of the scheduler
//! ```
//!
//! # Design Decisions
//! - The cache keeps one result per connection, never a history
//! - Probe failures become `unknown` results; nothing is raised
//! - Overlapping ticks are tolerated; the cache is last-write-wins

pub mod cache;
pub mod dispatch;
pub mod scheduler;
pub mod types;

pub use cache::HealthCache;
pub use dispatch::{ProbeDispatcher, ProbeError, Prober, DEFAULT_PROBE_TIMEOUT};
pub use scheduler::{PollScheduler, PollTarget, DEFAULT_POLL_INTERVAL};
pub use types::{HealthResult, HealthStatus};
