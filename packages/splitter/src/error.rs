//! Error types for the splitter.
//!
//! `SplitError` covers everything that aborts a run. Problems with a single
//! record are not errors in that sense: they are collected as `RecordIssue`
//! values in the run report and the run carries on.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the splitter library.
#[derive(Debug, Error)]
pub enum SplitError {
    /// Mode code other than 0 (keep CDATA) or 1 (plain).
    #[error("Invalid mode: '{0}'. Expected 0 (keep CDATA) or 1 (plain)")]
    InvalidMode(String),

    /// Input file could not be read.
    #[error("Failed to read input file {}: {source}", .path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// XML parsing failed in plain mode.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// XML parsing failed in CDATA-preserving mode.
    #[error("XML parsing failed: {0}")]
    XmlRead(#[from] quick_xml::Error),

    /// Input is not a well-formed single-root document.
    #[error("Malformed XML: {0}")]
    MalformedXml(String),

    /// Output directory could not be created.
    #[error("Failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output file could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for splitter operations.
pub type Result<T> = std::result::Result<T, SplitError>;

/// Non-fatal problem with a single record.
///
/// `record` is the 1-based position of the record in document order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordIssue {
    /// The record has no `Adr/Zip` field.
    #[error("record {record}: element is missing")]
    MissingField { record: usize },

    /// The field text is not a base-10 integer.
    #[error("record {record}: invalid value: {raw}")]
    InvalidValue { record: usize, raw: String },
}

impl RecordIssue {
    /// Position of the offending record in document order.
    #[must_use]
    pub fn record(&self) -> usize {
        match self {
            Self::MissingField { record } | Self::InvalidValue { record, .. } => *record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_mode_display() {
        let err = SplitError::InvalidMode("7".to_string());
        assert!(err.to_string().contains("'7'"));
        assert!(err.to_string().contains("Expected 0"));
    }

    #[test]
    fn test_read_input_display_names_path() {
        let err = SplitError::ReadInput {
            path: PathBuf::from("missing/input.xml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to read input file missing/input.xml: not found"
        );
    }

    #[test]
    fn test_record_issue_display() {
        let missing = RecordIssue::MissingField { record: 2 };
        assert_eq!(missing.to_string(), "record 2: element is missing");

        let invalid = RecordIssue::InvalidValue {
            record: 4,
            raw: "ABC12".to_string(),
        };
        assert_eq!(invalid.to_string(), "record 4: invalid value: ABC12");
        assert_eq!(invalid.record(), 4);
    }
}
