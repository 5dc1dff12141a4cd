//! Application layer for taskdeck.
//!
//! Holds the task store with its UI mode machine, selection and reorder
//! controllers, and the client configuration shared by front ends.

pub mod config;
pub mod error;
pub mod mode;
pub mod reorder;
pub mod selection;
pub mod store;

// Re-exports for convenience
pub use config::{ApiConfig, BASE_URL_ENV, ClientConfig, DEFAULT_BASE_URL, default_config_path};
pub use error::{StoreError, SyncError, ValidationError};
pub use mode::{Intent, TransitionError, UiMode};
pub use reorder::{DragState, DropOutcome, ReorderController};
pub use selection::SelectionSet;
pub use store::{DeleteOutcome, DeleteReport, DeleteStatus, RefreshOutcome, StoreSnapshot, TaskStore};
