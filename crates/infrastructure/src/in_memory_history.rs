use async_trait::async_trait;
use history_core::HistoryResult;
use history_domain::{HistoryEvent, HistoryLog, HistoryRepository};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// 内存历史仓储
///
/// 适用于嵌入式部署和测试，进程退出后数据丢失。
#[derive(Debug, Default)]
pub struct InMemoryHistoryRepository {
    /// 实例ID -> 历史日志
    logs: RwLock<HashMap<String, HistoryLog>>,
}

impl InMemoryHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    async fn append(&self, instance_id: &str, events: &[HistoryEvent]) -> HistoryResult<()> {
        let mut logs = self.logs.write().await;
        // 先在副本上追加，任何一个事件失败都不改动已有历史
        let mut log = logs.get(instance_id).cloned().unwrap_or_default();
        for event in events {
            log.append(event.clone())?;
        }
        debug!(
            instance.id = instance_id,
            appended = events.len(),
            total = log.len(),
            "history appended in memory"
        );
        logs.insert(instance_id.to_string(), log);
        Ok(())
    }

    async fn load(&self, instance_id: &str) -> HistoryResult<Option<HistoryLog>> {
        Ok(self.logs.read().await.get(instance_id).cloned())
    }

    async fn list_instances(&self) -> HistoryResult<Vec<String>> {
        let mut instances: Vec<String> = self.logs.read().await.keys().cloned().collect();
        instances.sort();
        Ok(instances)
    }

    async fn purge(&self, instance_id: &str) -> HistoryResult<bool> {
        Ok(self.logs.write().await.remove(instance_id).is_some())
    }
}
