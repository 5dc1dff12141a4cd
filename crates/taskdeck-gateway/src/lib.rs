//! Remote task gateway for taskdeck.
//!
//! The task service is opaque to the client and reachable only through the
//! four operations of [`TaskGateway`]. [`HttpGateway`] speaks the service's
//! JSON contract; [`MemoryGateway`] keeps everything in process.

pub mod error;
mod http;
mod memory;
mod wire;

pub use error::{GatewayError, GatewayOp};
pub use http::{HttpGateway, parse_base_url};
pub use memory::{GatewayCall, MemoryGateway};
pub use reqwest::Url;

use taskdeck_core::{Task, TaskId, TaskPatch};

/// Async access to the remote task store.
///
/// Latency and failures are opaque to callers; no operation can be
/// cancelled once issued.
#[allow(async_fn_in_trait)]
pub trait TaskGateway: Send + Sync {
    /// Create a task. The service answers with a status message only, so
    /// callers must [`list`](Self::list) to see the new task.
    ///
    /// # Errors
    /// Returns a [`GatewayError`] when the request fails or is rejected.
    async fn add(&self, description: &str) -> Result<String, GatewayError>;

    /// Fetch every task in the service's order.
    ///
    /// # Errors
    /// Returns a [`GatewayError`] when the request fails or the body cannot
    /// be decoded.
    async fn list(&self) -> Result<Vec<Task>, GatewayError>;

    /// Apply a partial update. Returns the updated task when the service
    /// echoes it back.
    ///
    /// # Errors
    /// Returns a [`GatewayError`] when the request fails or is rejected.
    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Option<Task>, GatewayError>;

    /// Delete a single task.
    ///
    /// # Errors
    /// Returns a [`GatewayError`] when the request fails or is rejected.
    async fn delete(&self, id: &TaskId) -> Result<(), GatewayError>;
}
