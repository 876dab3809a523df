//! Configuration constants and validation functions for the splitter.

use crate::error::{Result, SplitError};
use crate::types::{Mode, ZipRange};

/// Root tag of input and output documents.
pub const ROOT_TAG: &str = "Main";

/// Tag of a single record.
pub const RECORD_TAG: &str = "Register";

/// Path from an address element to the postal code.
///
/// The first segment is searched at any depth below the record, the rest
/// are direct children.
pub const FIELD_PATH: &str = "Adr/Zip";

/// Indentation unit for plain-mode output and pretty-printing.
pub const INDENT: &str = "  ";

/// Postal-code ranges in routing order. The first range that contains a
/// value wins.
pub const ZIP_RANGES: [ZipRange; 3] = [
    ZipRange::new(0, 3000, "zips_0_3000.xml"),
    ZipRange::new(3001, 6000, "zips_3001_6000.xml"),
    ZipRange::new(6001, 9999, "zips_6001_9999.xml"),
];

/// Question asked when no mode is given on the command line.
pub const MODE_PROMPT: &str = "Do you want to split the XML with CDATA intact (0) or not (1)?:";

/// Validate a mode answer as typed by a user.
///
/// # Arguments
/// * `answer` - Raw answer, surrounding whitespace is ignored
///
/// # Returns
/// * `Ok(Mode)` for `0` or `1`
/// * `Err(SplitError::InvalidMode)` otherwise
///
/// # Examples
/// ```
/// use zipsplit::config::validate_mode;
/// use zipsplit::Mode;
///
/// assert_eq!(validate_mode(" 0\n").unwrap(), Mode::PreserveCdata);
/// assert_eq!(validate_mode("1").unwrap(), Mode::Plain);
/// assert!(validate_mode("yes").is_err());
/// ```
pub fn validate_mode(answer: &str) -> Result<Mode> {
    match answer.trim() {
        "0" => Ok(Mode::PreserveCdata),
        "1" => Ok(Mode::Plain),
        other => Err(SplitError::InvalidMode(other.to_string())),
    }
}

/// Check whether an answer to a yes/no question means yes.
///
/// # Examples
/// ```
/// use zipsplit::config::is_affirmative;
///
/// assert!(is_affirmative("Y"));
/// assert!(is_affirmative(" yes\n"));
/// assert!(!is_affirmative("no"));
/// ```
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "yes" | "y")
}
