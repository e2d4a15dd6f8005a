//! 编排实例历史日志
//!
//! 只追加：事件ID必须严格递增，已写入的事件不可修改或删除。

use history_core::{HistoryError, HistoryResult};
use serde::Serialize;

use crate::history::{HistoryEvent, HistoryEventData, TaskScheduledEvent};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HistoryLog {
    events: Vec<HistoryEvent>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从持久化数据重建，逐个校验事件顺序
    pub fn from_events(events: Vec<HistoryEvent>) -> HistoryResult<Self> {
        let mut log = Self::with_capacity(events.len());
        for event in events {
            log.append(event)?;
        }
        Ok(log)
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
        }
    }

    pub fn append(&mut self, event: HistoryEvent) -> HistoryResult<()> {
        if let Some(last_event_id) = self.last_event_id() {
            if event.event_id() <= last_event_id {
                return Err(HistoryError::event_out_of_order(
                    event.event_id(),
                    last_event_id,
                ));
            }
        }
        self.events.push(event);
        Ok(())
    }

    pub fn events(&self) -> &[HistoryEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last_event_id(&self) -> Option<i32> {
        self.events.last().map(HistoryEvent::event_id)
    }

    /// 下一个可分配的事件ID，最后一个ID已是 `i32::MAX` 时返回错误
    pub fn next_event_id(&self) -> HistoryResult<i32> {
        match self.last_event_id() {
            None => Ok(0),
            Some(id) => id
                .checked_add(1)
                .ok_or_else(|| HistoryError::event_id_exhausted(id)),
        }
    }

    pub fn task_scheduled(&self, event_id: i32) -> Option<&TaskScheduledEvent> {
        self.events
            .iter()
            .filter_map(HistoryEvent::as_task_scheduled)
            .find(|event| event.event_id() == event_id)
    }

    pub fn scheduled_tasks(&self) -> impl Iterator<Item = &TaskScheduledEvent> {
        self.events.iter().filter_map(HistoryEvent::as_task_scheduled)
    }

    pub fn to_json(&self) -> HistoryResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> HistoryResult<Self> {
        let events: Vec<HistoryEvent> = serde_json::from_str(json)?;
        Self::from_events(events)
    }
}

impl<'a> IntoIterator for &'a HistoryLog {
    type Item = &'a HistoryEvent;
    type IntoIter = std::slice::Iter<'a, HistoryEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
