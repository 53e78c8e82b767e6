//! Endpoint health monitoring library.
//!
//! Keeps an ordered registry of monitored endpoints (websites and SSH
//! hosts), probes them on a fixed interval and on demand, and caches the
//! latest health result per endpoint.

// Core subsystems
pub mod health;
pub mod monitor;
pub mod registry;

// Capabilities
pub mod probe;
pub mod wol;

// Surfaces and cross-cutting concerns
pub mod api;
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::MonitorConfig;
pub use health::{HealthResult, HealthStatus};
pub use lifecycle::Shutdown;
pub use monitor::MonitorService;
pub use registry::{Connection, ConnectionConfig, ConnectionId, NewConnection};
