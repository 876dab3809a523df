//! Core data types for the splitter.

use std::fmt;
use std::path::PathBuf;

use crate::error::{RecordIssue, Result, SplitError};
use crate::xml::{CdataCodec, PlainCodec, XmlCodec};

/// Closed postal-code interval `[low, high]` with its output file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZipRange {
    /// Lowest postal code in the range (inclusive).
    pub low: i64,

    /// Highest postal code in the range (inclusive).
    pub high: i64,

    /// File name of the output document, relative to the output directory.
    pub file_name: &'static str,
}

impl ZipRange {
    /// Create a new range.
    #[must_use]
    pub const fn new(low: i64, high: i64, file_name: &'static str) -> Self {
        Self {
            low,
            high,
            file_name,
        }
    }

    /// Check whether `value` lies inside the range.
    #[must_use]
    pub fn contains(&self, value: i64) -> bool {
        self.low <= value && value <= self.high
    }
}

impl fmt::Display for ZipRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Output mode.
///
/// Each mode pairs a parser with a writer; see [`XmlCodec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Keep CDATA sections, wrap the postal code in CDATA, pretty-print.
    PreserveCdata,

    /// Merge CDATA into text and re-indent the output.
    Plain,
}

impl Mode {
    /// Map a numeric mode code (0 or 1) to a mode.
    ///
    /// # Examples
    /// ```
    /// use zipsplit::Mode;
    ///
    /// assert_eq!(Mode::from_code(0).unwrap(), Mode::PreserveCdata);
    /// assert_eq!(Mode::from_code(1).unwrap(), Mode::Plain);
    /// assert!(Mode::from_code(2).is_err());
    /// ```
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::PreserveCdata),
            1 => Ok(Self::Plain),
            other => Err(SplitError::InvalidMode(other.to_string())),
        }
    }

    /// Numeric code of this mode.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::PreserveCdata => 0,
            Self::Plain => 1,
        }
    }

    /// Human readable name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreserveCdata => "keep CDATA",
            Self::Plain => "plain",
        }
    }

    /// Parser/writer pair for this mode.
    #[must_use]
    pub fn codec(self) -> &'static dyn XmlCodec {
        match self {
            Self::PreserveCdata => &CdataCodec,
            Self::Plain => &PlainCodec,
        }
    }
}

/// One output file written by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    /// Range routed into this file.
    pub range: ZipRange,

    /// Full path of the written file.
    pub path: PathBuf,

    /// Number of records in the file.
    pub records: usize,
}

/// Outcome of a partition run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionReport {
    /// Files in range order, one per range.
    pub files: Vec<WrittenFile>,

    /// Records dropped because their postal code was missing or not a number.
    pub issues: Vec<RecordIssue>,

    /// Records with a numeric postal code outside every range.
    ///
    /// These are dropped without a diagnostic.
    pub unmatched: usize,
}

impl PartitionReport {
    /// Paths of all written files, in range order.
    #[must_use]
    pub fn written_files(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Total number of records written across all files.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.files.iter().map(|f| f.records).sum()
    }
}
