use async_trait::async_trait;
use gist_common::Result;
use tokio::sync::RwLock;

use crate::record::SummaryRecord;

/// Where finished summaries go.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    async fn store(&self, record: &SummaryRecord) -> Result<()>;
}

/// Keeps records in memory, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<SummaryRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<SummaryRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Most recent record for `url`, if any.
    pub async fn latest_for(&self, url: &str) -> Option<SummaryRecord> {
        self.records
            .read()
            .await
            .iter()
            .rev()
            .find(|r| r.source_url == url)
            .cloned()
    }
}

#[async_trait]
impl SummaryStore for MemoryStore {
    async fn store(&self, record: &SummaryRecord) -> Result<()> {
        self.records.write().await.push(record.clone());
        tracing::debug!(target: "gist.pipeline", id = %record.id, "store.memory.insert");
        Ok(())
    }
}
