//! JSON output formatter

use crate::output::OutputFormatter;
use crate::report::{Outcome, RunReport};
use serde_json::{Value, json};

/// JSON formatter for machine-readable output. The whole run is printed once, at the end.
#[derive(Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

/// Build the JSON document describing a run.
pub fn report_to_json(report: &RunReport) -> Value {
    let operations: Vec<Value> = report
        .summaries()
        .into_iter()
        .map(|(name, summary)| {
            json!({
                "name": name,
                "files": summary.files(),
                "clean": summary.clean,
                "modified": summary.modified,
                "violations": summary.violations,
                "errors": summary.errors,
            })
        })
        .collect();

    json!({
        "mode": report.mode(),
        "exit_code": report.exit_code(),
        "operations": operations,
        "outcomes": report.outcomes(),
    })
}

impl OutputFormatter for JsonFormatter {
    fn format_outcome(&self, _outcome: &Outcome) -> Option<String> {
        None
    }

    fn format_report(&self, report: &RunReport) -> Option<String> {
        Some(serde_json::to_string_pretty(&report_to_json(report)).unwrap_or_default())
    }
}
