pub mod history;
pub mod history_log;
pub mod repositories;
pub mod scheduling;
pub mod trace_context;

pub use history::*;
pub use history_core::{HistoryError, HistoryResult};
pub use history_log::HistoryLog;
pub use repositories::HistoryRepository;
pub use scheduling::DecisionRecorder;
pub use trace_context::{AmbientSpan, DistributedTraceContext, TraceContextBridge, TraceContextError};
