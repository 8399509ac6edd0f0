mod report;
mod run_metrics;

pub mod prelude {
    pub use crate::report::{ReportCollector, ReportConfig, Reporter};
    pub use crate::run_metrics::{MetricsSummary, RunMetrics};
    pub use crate::OperationRecord;
}

use std::time::{Duration, Instant};

/// One timed client operation.
///
/// Created just before the operation starts and completed with [`OperationRecord::finish`] once
/// the outcome is known.
#[derive(Debug, Clone)]
pub struct OperationRecord {
    operation_id: String,
    started: Instant,
    elapsed: Option<Duration>,
    is_error: bool,
}

impl OperationRecord {
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            started: Instant::now(),
            elapsed: None,
            is_error: false,
        }
    }

    /// Capture the elapsed time and the outcome of the operation.
    pub fn finish(mut self, is_error: bool) -> Self {
        self.elapsed = Some(self.started.elapsed());
        self.is_error = is_error;
        self
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// The measured duration, or [`None`] if the record was never finished.
    pub fn duration(&self) -> Option<Duration> {
        self.elapsed
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }
}
