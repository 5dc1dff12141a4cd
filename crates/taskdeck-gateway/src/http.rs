//! HTTP implementation of [`TaskGateway`].

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use taskdeck_core::{Task, TaskId, TaskPatch};
use tracing::debug;

use crate::error::{GatewayError, GatewayOp};
use crate::wire::{
    AddTaskBody, AddTaskResponse, DeleteTaskBody, ErrorBody, ListTasksResponse, UpdateTaskResponse,
};
use crate::TaskGateway;

/// Gateway speaking the task service's JSON-over-HTTP contract.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
}

impl HttpGateway {
    /// Create a gateway with a default HTTP client.
    ///
    /// # Errors
    /// Returns [`GatewayError::InvalidBaseUrl`] when `base_url` is not an
    /// absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a gateway reusing an existing HTTP client.
    ///
    /// # Errors
    /// Returns [`GatewayError::InvalidBaseUrl`] when `base_url` is not an
    /// absolute http(s) URL.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, GatewayError> {
        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Base URL every endpoint is resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append `segments` to the base URL path, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot carry a path".into(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute(
        &self,
        operation: GatewayOp,
        request: RequestBuilder,
    ) -> Result<Vec<u8>, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|source| GatewayError::Transport { operation, source })?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| GatewayError::Transport { operation, source })?;
        debug!(%operation, status = status.as_u16(), bytes = body.len(), "task service responded");

        if !status.is_success() {
            return Err(GatewayError::Status {
                operation,
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }
        Ok(body.to_vec())
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        operation: GatewayOp,
        request: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let body = self.execute(operation, request).await?;
        serde_json::from_slice(&body).map_err(|source| GatewayError::Decode { operation, source })
    }
}

impl TaskGateway for HttpGateway {
    async fn add(&self, description: &str) -> Result<String, GatewayError> {
        let url = self.endpoint(&["addTask"])?;
        let request = self.client.post(url).json(&AddTaskBody { task: description });
        let response: AddTaskResponse = self.execute_json(GatewayOp::Add, request).await?;
        Ok(response.message)
    }

    async fn list(&self) -> Result<Vec<Task>, GatewayError> {
        let url = self.endpoint(&["listTasks"])?;
        let response: ListTasksResponse =
            self.execute_json(GatewayOp::List, self.client.get(url)).await?;
        Ok(response.tasks)
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Option<Task>, GatewayError> {
        let url = self.endpoint(&["updateTask", id.as_str()])?;
        let body = self
            .execute(GatewayOp::Update, self.client.put(url).json(patch))
            .await?;
        // The body shape is not part of the contract; only `{task}` is picked up.
        Ok(serde_json::from_slice::<UpdateTaskResponse>(&body)
            .ok()
            .map(|response| response.task))
    }

    async fn delete(&self, id: &TaskId) -> Result<(), GatewayError> {
        let url = self.endpoint(&["deleteTask"])?;
        let request = self.client.delete(url).json(&DeleteTaskBody { id });
        self.execute(GatewayOp::Delete, request).await?;
        Ok(())
    }
}

/// Validate a base URL for the task service.
///
/// # Errors
/// Returns [`GatewayError::InvalidBaseUrl`] for unparsable URLs, non-http(s)
/// schemes and URLs that cannot carry a path.
pub fn parse_base_url(raw: &str) -> Result<Url, GatewayError> {
    let invalid = |reason: String| GatewayError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot carry a path".into()));
    }
    Ok(url)
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(ErrorBody { error }) = serde_json::from_slice(body) {
        return error;
    }
    let text = String::from_utf8_lossy(body).trim().to_owned();
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_owned()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(base: &str) -> HttpGateway {
        HttpGateway::new(base).expect("valid base url")
    }

    #[test]
    fn endpoints_append_to_root() {
        let gw = gateway("http://localhost:3000");
        let url = gw.endpoint(&["listTasks"]).expect("endpoint");
        assert_eq!(url.as_str(), "http://localhost:3000/listTasks");
    }

    #[test]
    fn endpoints_keep_path_prefix() {
        let gw = gateway("https://example.invalid/api/");
        let url = gw.endpoint(&["updateTask", "abc"]).expect("endpoint");
        assert_eq!(url.as_str(), "https://example.invalid/api/updateTask/abc");

        let gw = gateway("https://example.invalid/api");
        let url = gw.endpoint(&["addTask"]).expect("endpoint");
        assert_eq!(url.as_str(), "https://example.invalid/api/addTask");
    }

    #[test]
    fn ids_are_percent_encoded() {
        let gw = gateway("http://localhost:3000");
        let url = gw.endpoint(&["updateTask", "a b/c"]).expect("endpoint");
        assert_eq!(url.as_str(), "http://localhost:3000/updateTask/a%20b%2Fc");
    }

    #[test]
    fn rejects_unusable_base_urls() {
        for raw in ["", "localhost:3000", "ftp://example.invalid", "mailto:someone@example.invalid"] {
            let err = HttpGateway::new(raw).expect_err("must reject");
            assert!(matches!(err, GatewayError::InvalidBaseUrl { .. }), "{raw}: {err}");
        }
    }

    #[test]
    fn error_message_prefers_service_error_field() {
        let message = error_message(StatusCode::BAD_REQUEST, br#"{"error":"Invalid task id"}"#);
        assert_eq!(message, "Invalid task id");

        let message = error_message(StatusCode::BAD_GATEWAY, b"upstream down\n");
        assert_eq!(message, "upstream down");

        let message = error_message(StatusCode::NOT_FOUND, b"");
        assert_eq!(message, "Not Found");
    }
}
