use thiserror::Error;

/// Unified error type for ci-publish operations
#[derive(Error, Debug)]
pub enum CiPublishError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required setting(s): {}", .0.join(", "))]
    MissingSettings(Vec<String>),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Required tool '{0}' was not found on PATH")]
    ToolMissing(String),

    #[error("'{program}' exited with status {code}")]
    ToolFailed { program: String, code: i32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in ci-publish
pub type Result<T> = std::result::Result<T, CiPublishError>;

impl CiPublishError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        CiPublishError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        CiPublishError::Version(msg.into())
    }

    /// Create a missing-tool error
    pub fn tool_missing(program: impl Into<String>) -> Self {
        CiPublishError::ToolMissing(program.into())
    }

    /// Create a failed-tool error carrying the tool's exit status
    pub fn tool_failed(program: impl Into<String>, code: i32) -> Self {
        CiPublishError::ToolFailed {
            program: program.into(),
            code,
        }
    }

    /// Process exit code for this error.
    ///
    /// A failing external tool propagates its own status; every other
    /// failure exits with `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            CiPublishError::ToolFailed { code, .. } if *code != 0 => *code,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CiPublishError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CiPublishError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_missing_settings_lists_every_name() {
        let err = CiPublishError::MissingSettings(vec![
            "REGISTRY".to_string(),
            "APP_NAME".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Missing required setting(s): REGISTRY, APP_NAME"
        );
    }

    #[test]
    fn test_tool_failed_propagates_exit_code() {
        assert_eq!(CiPublishError::tool_failed("helm", 3).exit_code(), 3);
        assert_eq!(CiPublishError::tool_failed("docker", 125).exit_code(), 125);
    }

    #[test]
    fn test_tool_failed_with_zero_code_still_fails() {
        assert_eq!(CiPublishError::tool_failed("flux", 0).exit_code(), 1);
    }

    #[test]
    fn test_other_errors_exit_one() {
        let errors = vec![
            CiPublishError::config("x"),
            CiPublishError::version("x"),
            CiPublishError::tool_missing("helm"),
            CiPublishError::MissingSettings(vec!["VERSION".to_string()]),
        ];

        for err in errors {
            assert_eq!(err.exit_code(), 1, "unexpected exit code for {}", err);
        }
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (CiPublishError::config("x"), "Configuration error"),
            (CiPublishError::version("x"), "Version error"),
            (CiPublishError::tool_missing("flux"), "Required tool 'flux'"),
            (CiPublishError::tool_failed("helm", 2), "'helm' exited"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
