//! HTTP exchanges with the remote state store.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use taskstate_core::{GroupMeta, GroupUuid, StateError, StatusUpdate, TaskState, TaskUuid};

use crate::config::ClientConfig;
use crate::error::{classify_status, error_body, transport_error};
use crate::wire::{ChordTriggerRequest, ChordTriggerResponse, CreateGroupRequest, CreateTaskRequest};

/// Client for the store's REST API.
///
/// Holds nothing but the configured endpoint and a connection pool, so it is
/// cheap to clone and safe to share between tasks.
#[derive(Debug, Clone)]
pub struct StoreClient {
    inner: reqwest::Client,
    base_url: Url,
}

fn require_id(kind: &str, id: &str) -> Result<(), StateError> {
    if id.is_empty() {
        return Err(StateError::InvalidArgument(format!("{kind} uuid is empty")));
    }
    Ok(())
}

impl StoreClient {
    /// Create a new client for `config.base_url`.
    pub fn new(config: &ClientConfig) -> Result<Self, StateError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            StateError::InvalidArgument(format!("invalid base URL '{}': {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(StateError::InvalidArgument(format!(
                "base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| StateError::InvalidArgument(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { inner, base_url })
    }

    /// Create a PENDING record. `group_uuid` of `None` files the task outside
    /// any group.
    pub async fn create_task(
        &self,
        group_uuid: Option<&GroupUuid>,
        task_uuid: &TaskUuid,
        task_name: &str,
    ) -> Result<(), StateError> {
        require_id("task", task_uuid.as_str())?;
        let url = match group_uuid {
            Some(group) => {
                require_id("group", group.as_str())?;
                self.endpoint(&["tasks", group.as_str(), task_uuid.as_str()])
            }
            None => self.endpoint(&["tasks", task_uuid.as_str()]),
        };
        let resource = format!("task {task_uuid}");
        debug!(url = %url, task_name = %task_name, "POST create task");

        let request = self.inner.post(url).json(&CreateTaskRequest {
            task_name: task_name.to_string(),
        });
        self.exchange(request, StatusCode::CREATED, &resource).await?;
        Ok(())
    }

    /// Fetch one task record.
    pub async fn fetch_task(&self, task_uuid: &TaskUuid) -> Result<TaskState, StateError> {
        require_id("task", task_uuid.as_str())?;
        let url = self.endpoint(&["tasks", task_uuid.as_str()]);
        let resource = format!("task {task_uuid}");
        debug!(url = %url, "GET task");

        let response = self
            .exchange(self.inner.get(url), StatusCode::OK, &resource)
            .await?;
        decode(response, &resource).await
    }

    /// Fetch many task records in one round trip.
    ///
    /// The store answers with the records it knows, in request order.
    pub async fn fetch_tasks(&self, task_uuids: &[TaskUuid]) -> Result<Vec<TaskState>, StateError> {
        if task_uuids.is_empty() {
            return Err(StateError::InvalidArgument(
                "bulk fetch needs at least one task uuid".to_string(),
            ));
        }
        for uuid in task_uuids {
            require_id("task", uuid.as_str())?;
        }

        let url = self.endpoint(&["tasks"]);
        let query: Vec<(&str, &str)> = task_uuids
            .iter()
            .map(|uuid| ("task_uuid", uuid.as_str()))
            .collect();
        let resource = format!("{} tasks", task_uuids.len());
        debug!(url = %url, count = task_uuids.len(), "GET tasks");

        let response = self
            .exchange(self.inner.get(url).query(&query), StatusCode::OK, &resource)
            .await?;
        decode(response, &resource).await
    }

    /// Apply a partial status update.
    pub async fn update_task_status(
        &self,
        task_uuid: &TaskUuid,
        update: &StatusUpdate,
    ) -> Result<(), StateError> {
        require_id("task", task_uuid.as_str())?;
        let url = self.endpoint(&["tasks", task_uuid.as_str()]);
        let resource = format!("task {task_uuid}");
        debug!(url = %url, status = %update.status(), "PATCH task");

        self.exchange(self.inner.patch(url).json(update), StatusCode::OK, &resource)
            .await?;
        Ok(())
    }

    /// Fetch group metadata.
    pub async fn fetch_group(&self, group_uuid: &GroupUuid) -> Result<GroupMeta, StateError> {
        require_id("group", group_uuid.as_str())?;
        let url = self.endpoint(&["groups", group_uuid.as_str()]);
        let resource = format!("group {group_uuid}");
        debug!(url = %url, "GET group");

        let response = self
            .exchange(self.inner.get(url), StatusCode::OK, &resource)
            .await?;
        decode(response, &resource).await
    }

    /// Register a group and its members.
    pub async fn create_group(
        &self,
        group_uuid: &GroupUuid,
        task_uuids: &[TaskUuid],
    ) -> Result<(), StateError> {
        require_id("group", group_uuid.as_str())?;
        let url = self.endpoint(&["groups", group_uuid.as_str()]);
        let resource = format!("group {group_uuid}");
        debug!(url = %url, members = task_uuids.len(), "POST create group");

        let request = self.inner.post(url).json(&CreateGroupRequest {
            task_uuids: task_uuids.to_vec(),
        });
        self.exchange(request, StatusCode::CREATED, &resource).await?;
        Ok(())
    }

    /// Ask the store to flip the chord latch atomically.
    ///
    /// Returns true only if this request performed the flip.
    pub async fn set_chord_triggered(&self, group_uuid: &GroupUuid) -> Result<bool, StateError> {
        require_id("group", group_uuid.as_str())?;
        let url = self.endpoint(&["groups", group_uuid.as_str(), "chord-triggered"]);
        let resource = format!("group {group_uuid}");
        debug!(url = %url, "PATCH chord-triggered");

        let request = self.inner.patch(url).json(&ChordTriggerRequest {
            chord_triggered: true,
        });
        let response = self.exchange(request, StatusCode::OK, &resource).await?;
        let answer: ChordTriggerResponse = decode(response, &resource).await?;
        Ok(answer.updated)
    }

    pub async fn delete_task(&self, task_uuid: &TaskUuid) -> Result<(), StateError> {
        require_id("task", task_uuid.as_str())?;
        let url = self.endpoint(&["tasks", task_uuid.as_str()]);
        let resource = format!("task {task_uuid}");
        debug!(url = %url, "DELETE task");

        self.exchange(self.inner.delete(url), StatusCode::NO_CONTENT, &resource)
            .await?;
        Ok(())
    }

    pub async fn delete_group(&self, group_uuid: &GroupUuid) -> Result<(), StateError> {
        require_id("group", group_uuid.as_str())?;
        let url = self.endpoint(&["groups", group_uuid.as_str()]);
        let resource = format!("group {group_uuid}");
        debug!(url = %url, "DELETE group");

        self.exchange(self.inner.delete(url), StatusCode::NO_CONTENT, &resource)
            .await?;
        Ok(())
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base URL always accepts path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send one request and require `expected` as the response status.
    async fn exchange(
        &self,
        request: RequestBuilder,
        expected: StatusCode,
        resource: &str,
    ) -> Result<Response, StateError> {
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(e, resource))?;

        let status = response.status();
        if status == expected {
            return Ok(response);
        }

        let body = error_body(response.text().await);
        debug!(
            resource = %resource,
            status = status.as_u16(),
            body = %body,
            "Store rejected request"
        );
        Err(classify_status(status, body, resource))
    }
}

async fn decode<T: DeserializeOwned>(response: Response, resource: &str) -> Result<T, StateError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| transport_error(e, resource))?;
    serde_json::from_slice(&bytes).map_err(|e| {
        StateError::Unreachable(format!("malformed response for {resource}: {e}"))
    })
}
