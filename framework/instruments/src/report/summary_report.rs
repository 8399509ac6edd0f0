mod operations_table;

use crate::report::summary_report::operations_table::OperationRow;
use crate::report::ReportCollector;
use crate::OperationRecord;
use itertools::Itertools;
use std::collections::HashMap;
use tabled::settings::Style;
use tabled::Table;

/// Keeps every operation record in memory and prints a per-operation summary table at the end of
/// the run.
pub struct SummaryReportCollector {
    operation_records: Vec<OperationRecord>,
}

impl SummaryReportCollector {
    pub fn new() -> Self {
        Self {
            operation_records: Vec::new(),
        }
    }

    fn print_summary_of_operations(&self) {
        println!("\nSummary of operations");

        let mut table = Table::new(build_rows(&self.operation_records));
        table.with(Style::modern());

        println!("{table}");
    }
}

impl Default for SummaryReportCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportCollector for SummaryReportCollector {
    fn add_operation(&mut self, operation_record: &OperationRecord) {
        self.operation_records.push(operation_record.clone());
    }

    fn finalize(&self) {
        self.print_summary_of_operations();
    }
}

fn build_rows(records: &[OperationRecord]) -> Vec<OperationRow> {
    records
        .iter()
        // Records that were never finished carry no timing to aggregate.
        .filter(|record| record.duration().is_some())
        .fold(
            HashMap::<String, Vec<&OperationRecord>>::new(),
            |mut acc, record| {
                acc.entry(record.operation_id().to_string())
                    .or_default()
                    .push(record);
                acc
            },
        )
        .into_iter()
        .map(|(operation_id, operations)| {
            let total_operations = operations.len();
            let total_duration_micros: u128 = operations
                .iter()
                .filter_map(|op| op.duration())
                .map(|d| d.as_micros())
                .sum();

            // Failed operations count towards the totals but not the min/max timings.
            let timings: Vec<_> = operations
                .iter()
                .filter(|op| !op.is_error())
                .filter_map(|op| op.duration())
                .collect();

            OperationRow {
                operation_id,
                total_operations,
                total_duration_ms: total_duration_micros as f64 / 1000.0,
                avg_time_ms: (total_duration_micros as f64 / total_operations as f64) / 1000.0,
                min_time_ms: timings
                    .iter()
                    .min()
                    .map(|d| d.as_micros() as f64 / 1000.0)
                    .unwrap_or_default(),
                max_time_ms: timings
                    .iter()
                    .max()
                    .map(|d| d.as_micros() as f64 / 1000.0)
                    .unwrap_or_default(),
            }
        })
        .sorted_by(|a, b| a.operation_id.cmp(&b.operation_id))
        .collect()
}
