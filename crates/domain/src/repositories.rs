//! 历史日志仓储抽象
//!
//! 持久化层只按结构读写事件字段，不经过调度组件的捕获路径。

use async_trait::async_trait;
use history_core::HistoryResult;

use crate::history::HistoryEvent;
use crate::history_log::HistoryLog;

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// 追加事件，事件ID必须接在已有历史之后
    async fn append(&self, instance_id: &str, events: &[HistoryEvent]) -> HistoryResult<()>;
    async fn load(&self, instance_id: &str) -> HistoryResult<Option<HistoryLog>>;
    async fn list_instances(&self) -> HistoryResult<Vec<String>>;
    /// 截断并删除整个实例的历史
    async fn purge(&self, instance_id: &str) -> HistoryResult<bool>;
}
