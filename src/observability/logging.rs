//! Structured logging.
//!
//! # Responsibilities
//! - Install the global tracing subscriber
//! - Derive the default filter from the configured level
//!
//! # Design Decisions
//! - `RUST_LOG` takes precedence when set
//! - Installing twice is not an error (tests may race to init)

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is absent.
pub fn default_filter(level: &str) -> String {
    format!("endpoint_watch={},tower_http=info", level)
}

/// Install the fmt subscriber. Returns false if one was already installed.
pub fn init_tracing(level: &str) -> bool {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level).into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
