use nocdc_core::Error;

/// Prints `err` to stderr as a titled notice.
pub fn show(err: &Error) {
    let (title, body) = describe(err);
    tracing::debug!(?err, "command failed");
    eprintln!("{title}\n  {body}");
}

fn describe(err: &Error) -> (&'static str, String) {
    match err {
        Error::Validation(err) => ("Validation Error", err.to_string()),
        Error::NotFound(_) => ("Not Found", err.to_string()),
        Error::Parse { path, line, reason } => (
            "Invalid Connections File",
            format!("{} line {line}: {reason}", path.display()),
        ),
        Error::UnknownType(name) if name.trim().is_empty() => (
            "Unknown Type",
            "Choose a database type with --type.".to_string(),
        ),
        Error::UnknownType(_) => ("Unknown Type", err.to_string()),
        Error::Connection(err) => (
            "Connection Test Failed",
            format!("{}\n  Details: {}", err.user_message, err.detail),
        ),
        Error::PartialFailure {
            package,
            message,
            skipped,
        } => {
            let mut body = format!("Failed to install {package}: {message}");
            if !skipped.is_empty() {
                body.push_str(&format!("\n  Not attempted: {}", skipped.join(", ")));
            }
            ("Installation Failed", body)
        }
        Error::Catalog { .. } => ("Catalog Error", err.to_string()),
        Error::Io { .. } => ("File Error", err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use nocdc_core::{ConnectionError, Field, ValidationError};

    use super::*;

    #[test]
    fn titles_follow_the_error_kind() {
        let (title, body) = describe(&ValidationError::Missing(Field::Host).into());
        assert_eq!(title, "Validation Error");
        assert_eq!(body, "Please fill in the host field.");

        let (title, body) = describe(&Error::Parse {
            path: PathBuf::from("connections.ini"),
            line: 3,
            reason: "missing ']'".into(),
        });
        assert_eq!(title, "Invalid Connections File");
        assert_eq!(body, "connections.ini line 3: missing ']'");
    }

    #[test]
    fn connection_failures_keep_the_driver_detail() {
        let err = ConnectionError::new("Connection refused.", "tcp connect error");
        let (title, body) = describe(&err.into());
        assert_eq!(title, "Connection Test Failed");
        assert!(body.starts_with("Connection refused."));
        assert!(body.ends_with("Details: tcp connect error"));
    }

    #[test]
    fn partial_failure_lists_skipped_packages() {
        let (title, body) = describe(&Error::PartialFailure {
            package: "a".into(),
            message: "boom".into(),
            skipped: vec!["b".into(), "c".into()],
        });
        assert_eq!(title, "Installation Failed");
        assert_eq!(body, "Failed to install a: boom\n  Not attempted: b, c");
    }

    #[test]
    fn missing_type_hints_at_the_flag() {
        let (title, body) = describe(&Error::UnknownType(String::new()));
        assert_eq!(title, "Unknown Type");
        assert!(body.contains("--type"));
    }
}
