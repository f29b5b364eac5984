use super::discovery::{Discoverer, DiscoveryError};
use crate::cli_types::Mode;
use crate::operations::{Operation, run_operation};
use crate::report::{Outcome, OutcomeStatus, RunReport};
use std::path::Path;
use std::time::Instant;

/// Run `operations` in order over the files below `root`.
///
/// Every file gets an outcome, even when the operation fails on it, and a failing
/// operation does not stop the ones after it. `on_outcome` sees each outcome as
/// soon as it is produced.
pub fn process_targets(
    operations: &[Box<dyn Operation>],
    root: &Path,
    mode: Mode,
    discoverer: &Discoverer,
    mut on_outcome: impl FnMut(&Outcome),
) -> Result<RunReport, DiscoveryError> {
    let mut report = RunReport::new(mode);

    for operation in operations {
        let start = Instant::now();
        report.begin_operation(operation.name());
        log::info!("Running {} ({})", operation.name(), operation.description());

        let files = discoverer.discover(root, operation.file_filter())?;
        log::debug!("{}: {} candidate file(s)", operation.name(), files.len());

        let mut failures = 0;
        for file in &files {
            let outcome = run_operation(operation.as_ref(), file, mode);
            if outcome.status == OutcomeStatus::Error {
                failures += 1;
            }
            on_outcome(&outcome);
            report.push(outcome);
        }

        log::info!(
            "Finished {} on {} file(s) in {}ms ({failures} error(s))",
            operation.name(),
            files.len(),
            start.elapsed().as_millis()
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColintSettings;
    use crate::operations::{CleanNotebook, NewlineFix};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn discoverer() -> Discoverer {
        Discoverer::new(&ColintSettings::default()).unwrap()
    }

    #[test]
    fn test_outcomes_in_execution_order() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::write(root.join("b.txt"), "no newline").unwrap();
        fs::write(root.join("a.py"), "x = 1\n").unwrap();
        fs::write(root.join("broken.ipynb"), "{ not json").unwrap();

        let operations: Vec<Box<dyn Operation>> = vec![Box::new(CleanNotebook::new(Vec::new())), Box::new(NewlineFix)];
        let mut seen = Vec::new();
        let report = process_targets(&operations, root, Mode::Check, &discoverer(), |o| {
            seen.push((o.operation, o.status))
        })
        .unwrap();

        assert_eq!(
            seen,
            vec![
                ("clean-jupyter", OutcomeStatus::Error),
                ("newline-fix", OutcomeStatus::Clean),
                ("newline-fix", OutcomeStatus::Violation),
                ("newline-fix", OutcomeStatus::Violation),
            ]
        );
        assert_eq!(report.outcomes().len(), 4);
        assert_eq!(report.operations(), &["clean-jupyter", "newline-fix"]);
        assert_eq!(report.exit_code(), crate::exit_codes::TOOL_ERROR);
        assert_eq!(fs::read_to_string(root.join("b.txt")).unwrap(), "no newline");
    }

    #[test]
    fn test_apply_then_check_is_clean() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir(root.join("pkg")).unwrap();
        fs::write(root.join("pkg/mod.py"), "x = 1").unwrap();

        let operations: Vec<Box<dyn Operation>> = vec![Box::new(NewlineFix)];
        let report = process_targets(&operations, root, Mode::Apply, &discoverer(), |_| {}).unwrap();
        assert_eq!(report.summaries()["newline-fix"].modified, 1);
        assert_eq!(report.exit_code(), crate::exit_codes::SUCCESS);

        let report = process_targets(&operations, root, Mode::Check, &discoverer(), |_| {}).unwrap();
        assert_eq!(report.summaries()["newline-fix"].clean, 1);
    }

    #[test]
    fn test_missing_root() {
        let temp = tempdir().unwrap();
        let operations: Vec<Box<dyn Operation>> = vec![Box::new(NewlineFix)];
        let result = process_targets(&operations, &temp.path().join("nope"), Mode::Check, &discoverer(), |_| {});
        assert!(matches!(result, Err(DiscoveryError::NotFound(_))));
    }
}
