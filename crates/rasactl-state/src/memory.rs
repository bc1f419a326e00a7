//! In-process state store with the same contract as the secret store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use rasactl_core::{DeploymentRecord, RasactlError, RasactlResult, StateStore};

#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    records: Arc<RwLock<HashMap<String, DeploymentRecord>>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn write(&self, namespace: &str, record: &DeploymentRecord) -> RasactlResult<()> {
        self.records
            .write()
            .await
            .insert(namespace.to_string(), record.clone());
        Ok(())
    }

    async fn read(&self, namespace: &str) -> RasactlResult<DeploymentRecord> {
        self.records
            .read()
            .await
            .get(namespace)
            .cloned()
            .ok_or_else(|| RasactlError::NotFound(format!("no state record in {namespace}")))
    }

    async fn delete(&self, namespace: &str) -> RasactlResult<()> {
        self.records.write().await.remove(namespace);
        Ok(())
    }
}
