use thiserror::Error;

/// 历史事件模型错误类型定义
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("事件顺序错误: 事件ID {event_id} 必须大于上一个事件ID {last_event_id}")]
    EventOutOfOrder { event_id: i32, last_event_id: i32 },

    #[error("事件ID已用尽: 上一个事件ID {last_event_id}")]
    EventIdExhausted { last_event_id: i32 },

    #[error("活动任务未调度: scheduled_id={scheduled_id}")]
    TaskNotScheduled { scheduled_id: i32 },

    #[error("编排实例未找到: {instance_id}")]
    InstanceNotFound { instance_id: String },

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("存储错误: {0}")]
    Storage(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 统一的Result类型
pub type HistoryResult<T> = std::result::Result<T, HistoryError>;

impl HistoryError {
    pub fn event_out_of_order(event_id: i32, last_event_id: i32) -> Self {
        Self::EventOutOfOrder {
            event_id,
            last_event_id,
        }
    }
    pub fn event_id_exhausted(last_event_id: i32) -> Self {
        Self::EventIdExhausted { last_event_id }
    }
    pub fn task_not_scheduled(scheduled_id: i32) -> Self {
        Self::TaskNotScheduled { scheduled_id }
    }
    pub fn instance_not_found<S: Into<String>>(instance_id: S) -> Self {
        Self::InstanceNotFound {
            instance_id: instance_id.into(),
        }
    }
    pub fn storage_error<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }
}

impl From<serde_json::Error> for HistoryError {
    fn from(err: serde_json::Error) -> Self {
        HistoryError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for HistoryError {
    fn from(err: std::io::Error) -> Self {
        HistoryError::Storage(err.to_string())
    }
}
