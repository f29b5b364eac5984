#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    Crlf,
    Mixed,
}

pub fn detect_line_ending_enum(content: &str) -> LineEnding {
    detect_line_ending_bytes_enum(content.as_bytes())
}

/// Byte-level variant used for files that are not guaranteed to be UTF-8.
pub fn detect_line_ending_bytes_enum(content: &[u8]) -> LineEnding {
    let (crlf_count, lf_count) = count_endings(content);

    match (crlf_count > 0, lf_count > 0) {
        (true, true) => LineEnding::Mixed,
        (true, false) => LineEnding::Crlf,
        _ => LineEnding::Lf,
    }
}

/// The line ending a newline should be written with: the most common one in the content.
pub fn dominant_line_ending(content: &[u8]) -> &'static str {
    let (crlf_count, lf_count) = count_endings(content);

    if crlf_count > lf_count { "\r\n" } else { "\n" }
}

/// Returns (CRLF count, standalone LF count).
fn count_endings(content: &[u8]) -> (usize, usize) {
    let mut crlf = 0;
    let mut lf = 0;
    for (idx, byte) in content.iter().enumerate() {
        if *byte == b'\n' {
            if idx > 0 && content[idx - 1] == b'\r' {
                crlf += 1;
            } else {
                lf += 1;
            }
        }
    }
    (crlf, lf)
}

pub fn normalize_line_ending(content: &str, target: LineEnding) -> String {
    match target {
        LineEnding::Lf => content.replace("\r\n", "\n"),
        LineEnding::Crlf => {
            // First normalize everything to LF, then convert to CRLF
            let normalized = content.replace("\r\n", "\n");
            normalized.replace('\n', "\r\n")
        }
        LineEnding::Mixed => content.to_string(), // Don't change mixed endings
    }
}

/// Re-applies the original content's line ending to text produced by a tool that only emits LF.
///
/// Output for an original with mixed endings is returned untouched.
pub fn ensure_consistent_line_endings(original: &str, modified: &str) -> String {
    let target_ending = detect_line_ending_enum(original);
    if target_ending == LineEnding::Mixed {
        return modified.to_string();
    }

    if detect_line_ending_enum(modified) != target_ending {
        normalize_line_ending(modified, target_ending)
    } else {
        modified.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_line_ending_enum() {
        assert_eq!(detect_line_ending_enum("hello\nworld"), LineEnding::Lf);
        assert_eq!(detect_line_ending_enum("hello\r\nworld"), LineEnding::Crlf);
        assert_eq!(detect_line_ending_enum("hello\r\nworld\nmixed"), LineEnding::Mixed);
        assert_eq!(detect_line_ending_enum("no line endings"), LineEnding::Lf);
    }

    #[test]
    fn test_dominant_line_ending() {
        assert_eq!(dominant_line_ending(b"hello\nworld"), "\n");
        assert_eq!(dominant_line_ending(b"hello\r\nworld"), "\r\n");
        assert_eq!(dominant_line_ending(b"a\r\nb\nc\nd"), "\n");
        assert_eq!(dominant_line_ending(b"no line endings"), "\n");
        assert_eq!(dominant_line_ending(b"\r\n"), "\r\n");
    }

    #[test]
    fn test_normalize_line_ending() {
        assert_eq!(normalize_line_ending("hello\r\nworld", LineEnding::Lf), "hello\nworld");
        assert_eq!(normalize_line_ending("hello\nworld", LineEnding::Crlf), "hello\r\nworld");
    }

    #[test]
    fn test_ensure_consistent_line_endings() {
        let original = "hello\r\nworld";
        let modified = "hello\nworld\nextra";
        assert_eq!(ensure_consistent_line_endings(original, modified), "hello\r\nworld\r\nextra");

        let original = "hello\nworld";
        let modified = "hello\r\nworld\r\nextra";
        assert_eq!(ensure_consistent_line_endings(original, modified), "hello\nworld\nextra");
    }

    #[test]
    fn test_mixed_original_keeps_tool_output() {
        let original = "import os\r\nimport sys\nx = 1\n";
        assert_eq!(ensure_consistent_line_endings(original, original), original);
        assert_eq!(ensure_consistent_line_endings(original, "a\nb\n"), "a\nb\n");
    }
}
