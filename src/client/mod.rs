// SPDX-License-Identifier: MIT

//! Workflow API client
//!
//! reqwest-based client for the backend REST surface: workflow CRUD
//! under `/api/v1/workflows`, execution triggering under
//! `/api/v1/executions`. Triggering returns the execution id used to
//! open the WebSocket event channel.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::error::FlowdeckError;
use crate::graph::model::GraphModel;
use crate::graph::snapshot::{Workflow, WorkflowCreate, WorkflowList, WorkflowUpdate};

/// Request body to start a workflow execution
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionStartRequest {
    /// Free-form keyed input, e.g. `{"input": "Write about quantum computing"}`
    pub trigger_input: HashMap<String, Value>,
    /// Provider API keys, e.g. `{"openai": "sk-..."}`
    pub api_keys: HashMap<String, String>,
}

impl ExecutionStartRequest {
    /// The common case: one `input` field, no extra keys.
    pub fn with_input(input: impl Into<String>) -> Self {
        let mut trigger_input = HashMap::new();
        trigger_input.insert("input".to_string(), Value::String(input.into()));
        Self {
            trigger_input,
            api_keys: HashMap::new(),
        }
    }
}

/// An execution record as returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionRecord {
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub status: String,
    #[serde(default)]
    pub trigger_input: HashMap<String, Value>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// HTTP client for the workflow backend
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the given base URL, e.g. `http://localhost:8000`.
    pub fn new(base_url: &str) -> Result<Self, FlowdeckError> {
        let base_url = Url::parse(base_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(FlowdeckError::config(format!(
                "Unsupported scheme '{}', expected http or https",
                base_url.scheme()
            )));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, FlowdeckError> {
        Ok(self.base_url.join(path)?)
    }

    /// The WebSocket base URL matching this client's HTTP base.
    pub fn socket_base(&self) -> Result<Url, FlowdeckError> {
        let mut ws = self.base_url.clone();
        let scheme = if ws.scheme() == "https" { "wss" } else { "ws" };
        ws.set_scheme(scheme)
            .map_err(|_| FlowdeckError::config("Cannot derive WebSocket scheme"))?;
        Ok(ws)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, FlowdeckError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(FlowdeckError::api(status.as_u16(), message))
    }

    pub async fn list_workflows(&self) -> Result<WorkflowList, FlowdeckError> {
        let response = self
            .http
            .get(self.endpoint("/api/v1/workflows")?)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn get_workflow(&self, id: Uuid) -> Result<Workflow, FlowdeckError> {
        let response = self
            .http
            .get(self.endpoint(&format!("/api/v1/workflows/{}", id))?)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn create_workflow(
        &self,
        request: &WorkflowCreate,
    ) -> Result<Workflow, FlowdeckError> {
        let response = self
            .http
            .post(self.endpoint("/api/v1/workflows")?)
            .json(request)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn update_workflow(
        &self,
        id: Uuid,
        request: &WorkflowUpdate,
    ) -> Result<Workflow, FlowdeckError> {
        let response = self
            .http
            .put(self.endpoint(&format!("/api/v1/workflows/{}", id))?)
            .json(request)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn delete_workflow(&self, id: Uuid) -> Result<(), FlowdeckError> {
        let response = self
            .http
            .delete(self.endpoint(&format!("/api/v1/workflows/{}", id))?)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Save a graph's canvas snapshot. The unsaved-changes flag is
    /// cleared only when the server accepted the update.
    pub async fn save_graph(
        &self,
        id: Uuid,
        model: &mut GraphModel,
    ) -> Result<Workflow, FlowdeckError> {
        let update = WorkflowUpdate {
            canvas_data: Some(model.to_canvas()),
            ..Default::default()
        };

        let workflow = self.update_workflow(id, &update).await?;
        model.mark_saved();
        Ok(workflow)
    }

    /// Trigger a run. The returned record carries the execution id used
    /// to open the event channel.
    pub async fn start_execution(
        &self,
        workflow_id: Uuid,
        request: &ExecutionStartRequest,
    ) -> Result<ExecutionRecord, FlowdeckError> {
        let response = self
            .http
            .post(self.endpoint(&format!(
                "/api/v1/executions/workflows/{}/execute",
                workflow_id
            ))?)
            .json(request)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn get_execution(&self, id: Uuid) -> Result<ExecutionRecord, FlowdeckError> {
        let response = self
            .http
            .get(self.endpoint(&format!("/api/v1/executions/{}", id))?)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_base_from_http() {
        let client = ApiClient::new("http://localhost:8000").unwrap();
        assert_eq!(client.socket_base().unwrap().as_str(), "ws://localhost:8000/");
    }

    #[test]
    fn test_socket_base_from_https() {
        let client = ApiClient::new("https://deck.example.com").unwrap();
        assert_eq!(
            client.socket_base().unwrap().as_str(),
            "wss://deck.example.com/"
        );
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(matches!(
            ApiClient::new("ftp://nope"),
            Err(FlowdeckError::Config(_))
        ));
    }

    #[test]
    fn test_start_request_with_input() {
        let request = ExecutionStartRequest::with_input("hello");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["trigger_input"]["input"], "hello");
        assert_eq!(value["api_keys"], serde_json::json!({}));
    }
}
