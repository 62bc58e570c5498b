//! Error types for the dump library.

use thiserror::Error;

use crate::core::schema::EntityKind;

/// Exit code for configuration errors (bad YAML, missing fields).
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for failed metadata queries against the source database.
pub const EXIT_METADATA_ERROR: u8 = 2;
/// Exit code for an unresolvable dependency cycle under the strict policy.
pub const EXIT_CYCLE_ERROR: u8 = 3;
/// Exit code for missing privileges on the source database.
pub const EXIT_PRIVILEGE_ERROR: u8 = 4;
/// Exit code for serialization failures.
pub const EXIT_SERIALIZATION_ERROR: u8 = 5;
/// Exit code for a cancelled or timed out export.
pub const EXIT_CANCELLED: u8 = 6;
/// Exit code for filesystem errors.
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for dump operations.
#[derive(Error, Debug)]
pub enum DumpError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A query against the metadata source failed.
    #[error("Metadata query failed ({query}): {message}")]
    MetadataQuery { query: String, message: String },

    /// The dependency graph of one entity kind has no linear order.
    #[error("Cyclic dependency between {kind}s: {}", unresolved.join(", "))]
    CyclicDependency {
        kind: EntityKind,
        unresolved: Vec<String>,
    },

    /// The definition text of a view or routine is not readable with the
    /// current credentials.
    #[error("Insufficient privilege to read the definition of {kind} {name}")]
    InsufficientPrivilege { kind: EntityKind, name: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Export was cancelled (SIGINT, timeout, etc.)
    #[error("Export cancelled")]
    Cancelled,
}

impl DumpError {
    /// Create a MetadataQuery error naming the query that failed.
    pub fn metadata(query: impl Into<String>, message: impl std::fmt::Display) -> Self {
        DumpError::MetadataQuery {
            query: query.into(),
            message: message.to_string(),
        }
    }

    /// Create a CyclicDependency error. The unresolved names are sorted so the
    /// message is stable between runs.
    pub fn cycle(kind: EntityKind, mut unresolved: Vec<String>) -> Self {
        unresolved.sort();
        DumpError::CyclicDependency { kind, unresolved }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            DumpError::Config(_) | DumpError::Yaml(_) => EXIT_CONFIG_ERROR,
            DumpError::MetadataQuery { .. } => EXIT_METADATA_ERROR,
            DumpError::CyclicDependency { .. } => EXIT_CYCLE_ERROR,
            DumpError::InsufficientPrivilege { .. } => EXIT_PRIVILEGE_ERROR,
            DumpError::Json(_) => EXIT_SERIALIZATION_ERROR,
            DumpError::Cancelled => EXIT_CANCELLED,
            DumpError::Io(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

#[cfg(feature = "mysql")]
impl From<sqlx::Error> for DumpError {
    fn from(e: sqlx::Error) -> Self {
        DumpError::metadata("mysql", e)
    }
}

/// Result type alias for dump operations.
pub type Result<T> = std::result::Result<T, DumpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_error_sorts_names() {
        let err = DumpError::cycle(EntityKind::Table, vec!["b".into(), "a".into()]);
        assert_eq!(err.to_string(), "Cyclic dependency between tables: a, b");
        assert_eq!(err.exit_code(), EXIT_CYCLE_ERROR);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(DumpError::Config("x".into()).exit_code(), EXIT_CONFIG_ERROR);
        assert_eq!(DumpError::metadata("q", "boom").exit_code(), EXIT_METADATA_ERROR);
        assert_eq!(DumpError::Cancelled.exit_code(), EXIT_CANCELLED);
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(DumpError::from(io).exit_code(), EXIT_IO_ERROR);
    }

    #[test]
    fn test_format_detailed_includes_message() {
        let err = DumpError::metadata("SHOW CREATE TABLE `t`", "table does not exist");
        let detailed = err.format_detailed();
        assert!(detailed.starts_with("Error: Metadata query failed"));
        assert!(detailed.contains("table does not exist"));
    }
}
