use super::{Finding, Operation, OperationError, read_bytes, write_bytes};
use crate::file_processor::FileFilter;
use crate::utils::line_ending::dominant_line_ending;
use std::path::Path;

const MISSING_MESSAGE: &str = "No newline at end of file";
const ADDED_MESSAGE: &str = "Added newline at end of file";

/// Ensures every text file ends with a line terminator.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewlineFix;

fn needs_newline(content: &[u8]) -> bool {
    content.last().is_some_and(|byte| *byte != b'\n')
}

impl Operation for NewlineFix {
    fn name(&self) -> &'static str {
        "newline-fix"
    }

    fn description(&self) -> &'static str {
        "Ensure files end with a newline"
    }

    fn file_filter(&self) -> FileFilter {
        FileFilter::Text
    }

    fn check(&self, path: &Path) -> Result<Finding, OperationError> {
        let content = read_bytes(path)?;
        Ok(if needs_newline(&content) {
            Finding::violation(MISSING_MESSAGE)
        } else {
            Finding::clean()
        })
    }

    fn apply(&self, path: &Path) -> Result<Finding, OperationError> {
        let mut content = read_bytes(path)?;
        if !needs_newline(&content) {
            return Ok(Finding::clean());
        }
        let ending = dominant_line_ending(&content);
        content.extend_from_slice(ending.as_bytes());
        write_bytes(path, &content)?;
        Ok(Finding::modified(ADDED_MESSAGE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::OutcomeStatus;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::tempdir;

    fn fixture(content: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let temp = tempdir().unwrap();
        let path = temp.path().join("file.txt");
        fs::write(&path, content).unwrap();
        (temp, path)
    }

    #[test]
    fn test_missing_newline() {
        let (_temp, path) = fixture(b"print('hi')");

        let finding = NewlineFix.check(&path).unwrap();
        assert_eq!(finding.status, OutcomeStatus::Violation);
        assert_eq!(finding.message.as_deref(), Some(MISSING_MESSAGE));
        assert_eq!(fs::read(&path).unwrap(), b"print('hi')");

        let finding = NewlineFix.apply(&path).unwrap();
        assert_eq!(finding.status, OutcomeStatus::Modified);
        assert_eq!(fs::read(&path).unwrap(), b"print('hi')\n");
    }

    #[test]
    fn test_clean_and_empty_files() {
        for content in [&b""[..], b"x\n", b"x\r\n"] {
            let (_temp, path) = fixture(content);
            assert_eq!(NewlineFix.check(&path).unwrap(), Finding::clean());
            assert_eq!(NewlineFix.apply(&path).unwrap(), Finding::clean());
            assert_eq!(fs::read(&path).unwrap(), content);
        }
    }

    #[test]
    fn test_crlf_file_gets_crlf() {
        let (_temp, path) = fixture(b"a\r\nb\r\nc");
        NewlineFix.apply(&path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"a\r\nb\r\nc\r\n");
    }

    #[test]
    fn test_missing_file_is_error() {
        let temp = tempdir().unwrap();
        let err = NewlineFix.check(&temp.path().join("gone.txt")).unwrap_err();
        assert!(matches!(err, OperationError::FileAccess { .. }));
    }

    proptest! {
        #[test]
        fn prop_apply_is_idempotent(content in proptest::collection::vec(1u8..=255, 0..200)) {
            let (_temp, path) = fixture(&content);

            NewlineFix.apply(&path).unwrap();
            let once = fs::read(&path).unwrap();
            prop_assert!(once.is_empty() || once.ends_with(b"\n"));
            prop_assert!(once.starts_with(&content));

            let second = NewlineFix.apply(&path).unwrap();
            prop_assert_eq!(second, Finding::clean());
            prop_assert_eq!(fs::read(&path).unwrap(), once);
            prop_assert_eq!(NewlineFix.check(&path).unwrap(), Finding::clean());
        }
    }
}
