//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → MonitorService → initial load → polling (if enabled)
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     broadcast → API drains → config watcher exits → polling stops
//! ```
//!
//! # Design Decisions
//! - A failed initial load is not fatal; the registry starts empty
//! - In-flight probes are not cancelled on shutdown

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
pub use startup::bootstrap;
