//! Backend recording state in the remote store over HTTP.

use async_trait::async_trait;
use tracing::{debug, info};

use taskstate_client::{ClientConfig, StoreClient};
use taskstate_core::{GroupUuid, StateError, StatusUpdate, TaskSignature, TaskState, TaskUuid};

use crate::backend::Backend;

/// Facade over [`StoreClient`].
///
/// Holds only the client, so clones can be handed to any number of workers.
/// Every query goes to the store; nothing is cached.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: StoreClient,
}

impl HttpBackend {
    /// Create a backend talking to `config.base_url`.
    pub fn new(config: &ClientConfig) -> Result<Self, StateError> {
        Ok(Self::from_client(StoreClient::new(config)?))
    }

    pub fn from_client(client: StoreClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn init_group(
        &self,
        group_uuid: &GroupUuid,
        task_uuids: &[TaskUuid],
    ) -> Result<(), StateError> {
        self.client.create_group(group_uuid, task_uuids).await
    }

    async fn mark_pending(&self, signature: &TaskSignature) -> Result<(), StateError> {
        self.client
            .create_task(signature.group_uuid.as_ref(), &signature.uuid, &signature.name)
            .await
    }

    async fn update_status(
        &self,
        task_uuid: &TaskUuid,
        update: StatusUpdate,
    ) -> Result<(), StateError> {
        self.client.update_task_status(task_uuid, &update).await
    }

    async fn get_state(&self, task_uuid: &TaskUuid) -> Result<TaskState, StateError> {
        self.client.fetch_task(task_uuid).await
    }

    async fn group_task_states(
        &self,
        group_uuid: &GroupUuid,
        expected_count: usize,
    ) -> Result<Vec<TaskState>, StateError> {
        let group = self.client.fetch_group(group_uuid).await?;
        if group.task_count() != expected_count {
            debug!(
                group_uuid = %group_uuid,
                members = group.task_count(),
                expected_count,
                "Group size differs from expected count"
            );
        }
        if group.task_uuids.is_empty() {
            return Ok(Vec::new());
        }
        self.client.fetch_tasks(&group.task_uuids).await
    }

    async fn trigger_chord(&self, group_uuid: &GroupUuid) -> Result<bool, StateError> {
        // Single atomic store operation: no pre-read of the flag.
        let flipped = self.client.set_chord_triggered(group_uuid).await?;
        if flipped {
            info!(group_uuid = %group_uuid, "Chord claimed");
        } else {
            debug!(group_uuid = %group_uuid, "Chord already triggered");
        }
        Ok(flipped)
    }

    async fn purge_state(&self, task_uuid: &TaskUuid) -> Result<(), StateError> {
        self.client.delete_task(task_uuid).await
    }

    async fn purge_group(&self, group_uuid: &GroupUuid) -> Result<(), StateError> {
        self.client.delete_group(group_uuid).await
    }
}
