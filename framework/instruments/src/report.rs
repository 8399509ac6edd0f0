mod summary_report;

use crate::OperationRecord;
use parking_lot::Mutex;

pub use summary_report::SummaryReportCollector;

/// A sink for finished [`OperationRecord`]s.
pub trait ReportCollector {
    fn add_operation(&mut self, operation_record: &OperationRecord);

    /// Called once, after the last operation has been recorded.
    fn finalize(&self);
}

/// Configuration for the reporting to be done during a scenario run.
#[derive(Debug, Default)]
pub struct ReportConfig {
    enable_summary: bool,
}

impl ReportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print a per-operation summary table when the reporter is finalized.
    pub fn enable_summary(mut self) -> Self {
        self.enable_summary = true;
        self
    }

    pub fn init_reporter(self) -> Reporter {
        let mut collectors: Vec<Box<dyn ReportCollector + Send>> = Vec::new();
        if self.enable_summary {
            collectors.push(Box::new(SummaryReportCollector::new()));
        }
        Reporter {
            collectors: Mutex::new(collectors),
        }
    }
}

/// Fans finished operation records out to the configured collectors.
///
/// With no collectors configured this is a noop reporter, which is useful when only the run
/// timing statistics are wanted.
pub struct Reporter {
    collectors: Mutex<Vec<Box<dyn ReportCollector + Send>>>,
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("collectors", &self.collectors.lock().len())
            .finish()
    }
}

impl Reporter {
    pub fn add_operation(&self, operation_record: OperationRecord) {
        let mut collectors = self.collectors.lock();
        for collector in collectors.iter_mut() {
            collector.add_operation(&operation_record);
        }
    }

    pub fn finalize(&self) {
        let collectors = self.collectors.lock();
        for collector in collectors.iter() {
            collector.finalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingCollector {
        operations: Arc<AtomicUsize>,
        finalized: Arc<AtomicUsize>,
    }

    impl ReportCollector for CountingCollector {
        fn add_operation(&mut self, _operation_record: &OperationRecord) {
            self.operations.fetch_add(1, Ordering::SeqCst);
        }

        fn finalize(&self) {
            self.finalized.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn reporter_fans_out_to_collectors() {
        let operations = Arc::new(AtomicUsize::new(0));
        let finalized = Arc::new(AtomicUsize::new(0));

        let reporter = ReportConfig::new().init_reporter();
        reporter.collectors.lock().push(Box::new(CountingCollector {
            operations: operations.clone(),
            finalized: finalized.clone(),
        }));

        reporter.add_operation(OperationRecord::new("browser_connect").finish(false));
        reporter.add_operation(OperationRecord::new("browser_connect").finish(true));
        reporter.finalize();

        assert_eq!(operations.load(Ordering::SeqCst), 2);
        assert_eq!(finalized.load(Ordering::SeqCst), 1);
    }
}
