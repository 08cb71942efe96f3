//! Error types for lcia-core.

use thiserror::Error;

/// Result type alias for lcia-core operations.
pub type Result<T> = std::result::Result<T, LciaError>;

/// Errors that can occur while building or persisting an LCIA package.
///
/// Unresolvable units are not errors: they degrade the written flow data and
/// are reported through logging instead.
#[derive(Error, Debug)]
pub enum LciaError {
    /// A required column is absent from the input table.
    #[error("Missing required column: '{column}'")]
    MissingColumn {
        /// Exact column name that was expected.
        column: String,
    },

    /// A numeric column holds a value that cannot be parsed.
    #[error("Invalid number in row {row}, column '{column}': '{value}'")]
    InvalidNumber {
        /// 1-based data row index.
        row: usize,
        /// Column that was read.
        column: String,
        /// Raw cell content.
        value: String,
    },

    /// A BibTeX file could not be parsed.
    #[error("Bibliography parse error at line {line}: {message}")]
    Bibliography {
        /// Line on which the parser gave up.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// A catalog or registry file is malformed.
    #[error("Invalid configuration in {path}: {message}")]
    Config {
        /// File the configuration was read from.
        path: String,
        /// Description of the problem.
        message: String,
    },

    /// The archive sink could not be created or written.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// IO error reading inputs or writing the archive.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error for an entity.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV decoding error for the input table.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LciaError::MissingColumn {
            column: "Flowable".to_string(),
        };
        assert!(err.to_string().contains("Flowable"));

        let err = LciaError::InvalidNumber {
            row: 7,
            column: "Characterization Factor".to_string(),
            value: "n/a".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("row 7"));
        assert!(msg.contains("Characterization Factor"));
        assert!(msg.contains("n/a"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "lcia.bib");
        let err: LciaError = io.into();
        assert!(matches!(err, LciaError::Io(_)));
    }
}
