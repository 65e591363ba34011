//! Failure diagnostics
//!
//! Enriches runner failures with the script line they point at.

use crate::bridge::absolute;
use crate::runner::BuildFailure;

/// The script line a failure points at, formatted for humans
///
/// Best effort: returns `None` when the failure has no file location, the
/// file is gone or unreadable, or the line does not exist.
#[must_use]
pub fn find_fragment(failure: &BuildFailure) -> Option<String> {
    let location = failure.location.as_ref()?;
    let file = location.file.as_ref()?;
    if !file.exists() {
        return None;
    }

    let text = match std::fs::read_to_string(file) {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!("Could not re-read {}: {}", file.display(), e);
            return None;
        }
    };

    let line = text.lines().nth(location.line.checked_sub(1)?)?;
    Some(format!(
        "around script part ...{}... @ {}:{} in {}",
        line.trim(),
        location.line,
        location.column,
        absolute(file).display()
    ))
}

/// Failure text followed by the script fragment, if one can be found
#[must_use]
pub fn describe_failure(failure: &BuildFailure) -> String {
    let mut message = format!("a build failure has occurred in the script: {}", failure.message);
    if let Some(fragment) = find_fragment(failure) {
        message.push('\n');
        message.push_str(&fragment);
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::SourceLocation;

    fn script() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build-main.xml");
        std::fs::write(
            &path,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<main name=\"main\">\n  <fail message=\"x\"/>\n</main>\n",
        )
        .unwrap();
        (dir, path)
    }

    #[test]
    fn fragment_quotes_trimmed_line() {
        let (_dir, path) = script();
        let failure = BuildFailure::new("x").with_location(SourceLocation::new(&path, 3, 3));
        assert_eq!(
            find_fragment(&failure),
            Some(format!(
                "around script part ...<fail message=\"x\"/>... @ 3:3 in {}",
                path.display()
            ))
        );
    }

    #[test]
    fn no_fragment_without_location_or_file() {
        assert_eq!(find_fragment(&BuildFailure::new("x")), None);

        let gone = BuildFailure::new("x").with_location(SourceLocation::new("/no/such/file.xml", 1, 1));
        assert_eq!(find_fragment(&gone), None);

        let unnamed = BuildFailure::new("x").with_location(SourceLocation {
            file: None,
            line: 1,
            column: 1,
        });
        assert_eq!(find_fragment(&unnamed), None);
    }

    #[test]
    fn no_fragment_past_end_of_file() {
        let (_dir, path) = script();
        let failure = BuildFailure::new("x").with_location(SourceLocation::new(&path, 99, 1));
        assert_eq!(find_fragment(&failure), None);
        let zero = BuildFailure::new("x").with_location(SourceLocation::new(&path, 0, 1));
        assert_eq!(find_fragment(&zero), None);
    }

    #[test]
    fn describe_appends_fragment() {
        let (_dir, path) = script();
        let failure = BuildFailure::new("stop").with_location(SourceLocation::new(&path, 3, 3));
        let message = describe_failure(&failure);
        assert!(message.starts_with("a build failure has occurred in the script: stop\naround script part"));
        assert_eq!(
            describe_failure(&BuildFailure::new("stop")),
            "a build failure has occurred in the script: stop"
        );
    }
}
