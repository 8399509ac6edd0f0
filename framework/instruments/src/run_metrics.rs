use parking_lot::Mutex;
use std::fmt;
use std::time::Duration;

/// Wall-clock timings for a fixed number of benchmark runs.
///
/// The store is sized up front with one slot per run index so that concurrent agents can record
/// their timings without coordinating: each run writes its own slot and no ordering between
/// writers can lose an entry.
pub struct RunMetrics {
    slots: Mutex<Vec<Option<Duration>>>,
}

impl RunMetrics {
    pub fn with_slots(count: usize) -> Self {
        Self {
            slots: Mutex::new(vec![None; count]),
        }
    }

    /// Record the duration of the run at `index`.
    pub fn record(&self, index: usize, duration: Duration) {
        let mut slots = self.slots.lock();
        match slots.get_mut(index) {
            Some(slot) => *slot = Some(duration),
            None => log::error!(
                "Discarding timing for run {index}, only {} slots were allocated",
                slots.len()
            ),
        }
    }

    /// The number of runs that have recorded a timing so far.
    pub fn completed(&self) -> usize {
        self.slots.lock().iter().flatten().count()
    }

    /// Aggregate the recorded timings, or [`None`] when no run has completed.
    pub fn summarize(&self) -> Option<MetricsSummary> {
        let slots = self.slots.lock();
        let mut durations = slots.iter().flatten();

        let first = *durations.next()?;
        let (count, total, min, max) = durations.fold(
            (1_u32, first, first, first),
            |(count, total, min, max), d| (count + 1, total + *d, min.min(*d), max.max(*d)),
        );

        Some(MetricsSummary {
            count,
            total,
            average: total / count,
            min,
            max,
        })
    }
}

/// Aggregated run timings, reported in whole milliseconds.
///
/// The average is `total / count` in integer nanoseconds, truncated exactly as the division
/// happens, not rounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSummary {
    count: u32,
    total: Duration,
    average: Duration,
    min: Duration,
    max: Duration,
}

impl MetricsSummary {
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn average(&self) -> Duration {
        self.average
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }
}

impl fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total runs {}\ntotal duration (ms) {}\navg run duration (ms) {}\nmin run duration (ms) {}\nmax run duration (ms) {}",
            self.count,
            self.total.as_millis(),
            self.average.as_millis(),
            self.min.as_millis(),
            self.max.as_millis(),
        )
    }
}
