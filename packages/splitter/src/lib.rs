//! zipsplit - Split an XML register export by postal-code range.
//!
//! Reads one XML document, routes every `Register` record by the integer
//! in its `Adr/Zip` field, and writes one document per postal-code range.
//!
//! # Example
//!
//! ```
//! use zipsplit::config;
//! use zipsplit::Mode;
//!
//! assert_eq!(config::validate_mode("0").unwrap(), Mode::PreserveCdata);
//! assert_eq!(config::ZIP_RANGES[1].file_name, "zips_3001_6000.xml");
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Constants, range table and validation
//! - [`types`]: Ranges, modes and the run report
//! - [`error`]: Error types and Result alias
//! - [`xml`]: Owned XML tree, parsers and writers
//! - [`partition`]: Planning and moving records, writing outputs
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod partition;
pub mod types;
pub mod xml;

// Re-export main functions
pub use partition::{partition, partition_with_code};

// Re-export commonly used items
pub use error::{RecordIssue, Result, SplitError};
pub use types::{Mode, PartitionReport, WrittenFile, ZipRange};
