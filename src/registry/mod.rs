//! Connection registry subsystem.
//!
//! # Data Flow
//! ```text
//! Mutation (save / delete / reorder):
//!     → store.rs contract (JSON file in file_store.rs)
//!     → on success: reload full set into state.rs
//!     → on failure: error propagated, view untouched
//!
//! Reads:
//!     state.rs snapshot → sorted_view (stable sort by `order`)
//! ```
//!
//! # Design Decisions
//! - The store is the source of truth; no optimistic local patches
//! - Ordering is recomputed on every read
//! - Validation happens at the API boundary, not in the store

pub mod file_store;
pub mod state;
pub mod store;
pub mod types;
pub mod validation;

pub use file_store::JsonFileStore;
pub use state::{sort_by_order, ConnectionRegistry, RegistryError, RegistryResult};
pub use store::{ConnectionStore, StoreError, StoreResult};
pub use types::{Connection, ConnectionConfig, ConnectionId, NewConnection};
pub use validation::{validate_connection, ConnectionValidationError};
