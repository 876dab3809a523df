//! Partitioning of records into postal-code range documents.
//!
//! A run works in two passes. [`plan_records`] walks the input tree and
//! decides, per record, which range it goes to (or why it is dropped),
//! without touching the tree. [`split_document`] then moves the planned
//! records out of the input into one output document per range. Records
//! are moved by value, so each one ends up in at most one output.

use std::fs;
use std::num::IntErrorKind;
use std::path::Path;

use crate::config::{FIELD_PATH, RECORD_TAG, ROOT_TAG, ZIP_RANGES};
use crate::error::{RecordIssue, Result, SplitError};
use crate::types::{Mode, PartitionReport, WrittenFile, ZipRange};
use crate::xml::{find_field, Document, Element, NodePath, XmlCodec};

/// Routing decision for a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Move to the range at this index.
    Range(usize),

    /// Numeric postal code outside every range; dropped silently.
    ///
    /// Values beyond `i64` are saturated.
    Unmatched(i64),

    /// Field missing or not a number; dropped with a diagnostic.
    Rejected(RecordIssue),
}

/// A record scheduled to move into a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    /// 1-based position of the record in document order.
    pub record: usize,

    /// Location of the record below the input root.
    pub path: NodePath,

    /// Index into the range table.
    pub range: usize,
}

/// Result of the planning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingPlan {
    /// Moves in document order.
    pub moves: Vec<PlannedMove>,

    /// Diagnostics for rejected records, in document order.
    pub issues: Vec<RecordIssue>,

    /// Number of records with a numeric code outside every range.
    pub unmatched: usize,
}

/// Output documents of a split, one per range, plus the routing outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutcome {
    /// Output documents in range order.
    pub documents: Vec<Document>,

    /// Diagnostics for rejected records.
    pub issues: Vec<RecordIssue>,

    /// Number of records dropped without a diagnostic.
    pub unmatched: usize,
}

/// Decide where a single record goes.
///
/// # Arguments
/// * `record` - The record element
/// * `position` - 1-based position of the record, used in diagnostics
/// * `ranges` - Ranges in routing order; the first match wins
pub fn classify_record(record: &Element, position: usize, ranges: &[ZipRange]) -> Route {
    let Some(field) = find_field(record, FIELD_PATH).and_then(|path| record.element_at(&path))
    else {
        return Route::Rejected(RecordIssue::MissingField { record: position });
    };

    let raw = field.text().unwrap_or_default();
    let value = match raw.trim().parse::<i64>() {
        Ok(value) => value,
        // Still an integer, just far outside every range.
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => i64::MAX,
        Err(e) if *e.kind() == IntErrorKind::NegOverflow => i64::MIN,
        Err(_) => {
            return Route::Rejected(RecordIssue::InvalidValue {
                record: position,
                raw: raw.trim().to_string(),
            })
        }
    };

    match ranges.iter().position(|range| range.contains(value)) {
        Some(index) => Route::Range(index),
        None => Route::Unmatched(value),
    }
}

/// First pass: route every record without modifying the document.
pub fn plan_records(document: &Document, ranges: &[ZipRange]) -> RoutingPlan {
    let mut plan = RoutingPlan::default();

    for (offset, path) in document.root.descendant_paths(RECORD_TAG).into_iter().enumerate() {
        let position = offset + 1;
        let Some(record) = document.root.element_at(&path) else {
            continue;
        };

        match classify_record(record, position, ranges) {
            Route::Range(range) => {
                tracing::debug!(record = position, range = %ranges[range], "Routing record");
                plan.moves.push(PlannedMove {
                    record: position,
                    path,
                    range,
                });
            }
            Route::Unmatched(value) => {
                tracing::debug!(record = position, value, "Postal code outside all ranges, dropping");
                plan.unmatched += 1;
            }
            Route::Rejected(issue) => {
                match &issue {
                    RecordIssue::MissingField { .. } => {
                        tracing::warn!(record = issue.record(), "Postal code element is missing");
                    }
                    RecordIssue::InvalidValue { raw, .. } => {
                        tracing::warn!(record = issue.record(), value = %raw, "Invalid postal code value");
                    }
                }
                plan.issues.push(issue);
            }
        }
    }

    plan
}

/// Second pass: move planned records into per-range documents.
///
/// Moves are applied in reverse document order, so detaching a record
/// never shifts the path of a record that is still to be moved. A record
/// nested inside another record is therefore detached before its
/// ancestor. Each output document keeps document order.
pub fn split_document(
    mut document: Document,
    ranges: &[ZipRange],
    codec: &dyn XmlCodec,
) -> SplitOutcome {
    let plan = plan_records(&document, ranges);

    let mut buckets: Vec<Vec<Element>> = vec![Vec::new(); ranges.len()];
    for planned in plan.moves.iter().rev() {
        let Some(mut record) = document.root.take_element(&planned.path) else {
            tracing::warn!(record = planned.record, "Planned record no longer present");
            continue;
        };

        if let Some(field) = find_field(&record, FIELD_PATH)
            .and_then(|path| record.element_at_mut(&path))
        {
            let raw = field.text().unwrap_or_default();
            codec.mark_field(field, &raw);
        }

        buckets[planned.range].push(record);
    }

    let root_tag = document.root_tag().to_string();
    let root_namespace = document.root.own_namespace_declaration();
    let documents = buckets
        .into_iter()
        .map(|mut records| {
            records.reverse();
            let mut output = Document::new(root_tag.as_str());
            output.root.attributes.extend(root_namespace.clone());
            output.root.children = records.into_iter().map(Into::into).collect();
            output
        })
        .collect();

    SplitOutcome {
        documents,
        issues: plan.issues,
        unmatched: plan.unmatched,
    }
}

/// Split an XML file into one file per postal-code range.
///
/// # Arguments
/// * `input` - Path of the input XML file
/// * `output_dir` - Directory for the output files, created if missing
/// * `mode` - Output mode
///
/// # Returns
/// A report listing the written files and per-record diagnostics.
///
/// # Errors
/// Reading or parsing the input fails before anything is written. Creating
/// the directory or writing a file fails the run; files written before the
/// failure stay on disk.
pub fn partition(input: &Path, output_dir: &Path, mode: Mode) -> Result<PartitionReport> {
    let codec = mode.codec();
    tracing::info!(input = %input.display(), mode = mode.as_str(), "Splitting XML");

    let bytes = fs::read(input).map_err(|source| SplitError::ReadInput {
        path: input.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|e| SplitError::ReadInput {
        path: input.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })?;
    let document = codec.parse(&text)?;

    if document.root_tag() != ROOT_TAG {
        tracing::warn!(
            root = document.root_tag(),
            expected = ROOT_TAG,
            "Unexpected root element, output documents reuse it"
        );
    }

    let outcome = split_document(document, &ZIP_RANGES, codec);
    write_outputs(outcome, &ZIP_RANGES, output_dir, codec)
}

/// Split with a numeric mode code (0 keeps CDATA, 1 is plain).
///
/// An invalid code fails before the input is touched.
pub fn partition_with_code(input: &Path, output_dir: &Path, code: u8) -> Result<PartitionReport> {
    let mode = Mode::from_code(code)?;
    partition(input, output_dir, mode)
}

/// Write each output document to its range file.
fn write_outputs(
    outcome: SplitOutcome,
    ranges: &[ZipRange],
    output_dir: &Path,
    codec: &dyn XmlCodec,
) -> Result<PartitionReport> {
    fs::create_dir_all(output_dir).map_err(|source| SplitError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::with_capacity(ranges.len());
    for (range, document) in ranges.iter().zip(outcome.documents) {
        let path = output_dir.join(range.file_name);
        let records = document.root.child_elements().count();
        let bytes = codec.render(document)?;
        fs::write(&path, bytes).map_err(|source| SplitError::WriteOutput {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), records, "Wrote output file");

        files.push(WrittenFile {
            range: *range,
            path,
            records,
        });
    }

    Ok(PartitionReport {
        files,
        issues: outcome.issues,
        unmatched: outcome.unmatched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{CdataCodec, Node, PlainCodec};
    use pretty_assertions::assert_eq;

    fn record(name: &str, zip: Option<&str>) -> Element {
        let mut record = Element::new("Register").with_child(Element::new("Name").with_text(name));
        if let Some(zip) = zip {
            record = record
                .with_child(Element::new("Adr").with_child(Element::new("Zip").with_text(zip)));
        }
        record
    }

    fn input(records: Vec<Element>) -> Document {
        let mut data = Element::new("Data");
        data.children = records.into_iter().map(Into::into).collect();
        Document::from_root(
            Element::new("Main")
                .with_child(Element::new("Head").with_child(Element::new("Etc")))
                .with_child(data),
        )
    }

    fn names(document: &Document) -> Vec<String> {
        document
            .root
            .child_elements()
            .filter_map(|r| r.child_elements().next())
            .filter_map(Element::text)
            .collect()
    }

    #[test]
    fn test_classify_boundaries() {
        let cases = [
            ("0", Route::Range(0)),
            ("3000", Route::Range(0)),
            ("3001", Route::Range(1)),
            ("6000", Route::Range(1)),
            ("6001", Route::Range(2)),
            ("9999", Route::Range(2)),
            (" 4500\n", Route::Range(1)),
            ("+12", Route::Range(0)),
            ("-5", Route::Unmatched(-5)),
            ("10000", Route::Unmatched(10000)),
        ];
        for (zip, expected) in cases {
            assert_eq!(
                classify_record(&record("x", Some(zip)), 1, &ZIP_RANGES),
                expected,
                "zip {zip:?}"
            );
        }
    }

    #[test]
    fn test_classify_huge_integers_are_unmatched() {
        let cases = [
            ("99999999999999999999", Route::Unmatched(i64::MAX)),
            (" -99999999999999999999 ", Route::Unmatched(i64::MIN)),
            ("9223372036854775807", Route::Unmatched(i64::MAX)),
        ];
        for (zip, expected) in cases {
            assert_eq!(
                classify_record(&record("x", Some(zip)), 1, &ZIP_RANGES),
                expected,
                "zip {zip:?}"
            );
        }

        let doc = input(vec![record("a", Some("99999999999999999999"))]);
        let plan = plan_records(&doc, &ZIP_RANGES);
        assert!(plan.issues.is_empty());
        assert_eq!(plan.unmatched, 1);
    }

    #[test]
    fn test_classify_every_value_lands_in_exactly_one_range() {
        for value in 0..=9999 {
            let route = classify_record(&record("x", Some(&value.to_string())), 1, &ZIP_RANGES);
            let Route::Range(index) = route else {
                panic!("value {value} was not routed");
            };
            let matching = ZIP_RANGES.iter().filter(|r| r.contains(value)).count();
            assert_eq!(matching, 1);
            assert!(ZIP_RANGES[index].contains(value));
        }
    }

    #[test]
    fn test_classify_missing_field() {
        assert_eq!(
            classify_record(&record("x", None), 3, &ZIP_RANGES),
            Route::Rejected(RecordIssue::MissingField { record: 3 })
        );

        // Zip outside of an Adr does not count.
        let stray = Element::new("Register").with_child(Element::new("Zip").with_text("100"));
        assert_eq!(
            classify_record(&stray, 1, &ZIP_RANGES),
            Route::Rejected(RecordIssue::MissingField { record: 1 })
        );
    }

    #[test]
    fn test_classify_invalid_values() {
        for raw in ["ABC12", "N/A", "", "  ", "12.5", "1 2"] {
            assert_eq!(
                classify_record(&record("x", Some(raw)), 2, &ZIP_RANGES),
                Route::Rejected(RecordIssue::InvalidValue {
                    record: 2,
                    raw: raw.trim().to_string(),
                }),
                "raw {raw:?}"
            );
        }
    }

    #[test]
    fn test_classify_empty_field_element() {
        let record = Element::new("Register")
            .with_child(Element::new("Adr").with_child(Element::new("Zip")));
        assert_eq!(
            classify_record(&record, 1, &ZIP_RANGES),
            Route::Rejected(RecordIssue::InvalidValue {
                record: 1,
                raw: String::new(),
            })
        );
    }

    #[test]
    fn test_plan_does_not_modify_document() {
        let doc = input(vec![record("a", Some("1")), record("b", Some("N/A"))]);
        let before = doc.clone();
        let plan = plan_records(&doc, &ZIP_RANGES);
        assert_eq!(doc, before);
        assert_eq!(plan.moves.len(), 1);
        assert_eq!(plan.moves[0].path, vec![1, 0]);
        assert_eq!(plan.issues.len(), 1);
    }

    #[test]
    fn test_split_scenario() {
        let doc = input(vec![
            record("a", Some("500")),
            record("b", Some("4500")),
            record("c", Some("9999")),
            record("d", Some("N/A")),
        ]);

        let outcome = split_document(doc, &ZIP_RANGES, &PlainCodec);
        assert_eq!(outcome.documents.len(), 3);
        assert_eq!(names(&outcome.documents[0]), vec!["a"]);
        assert_eq!(names(&outcome.documents[1]), vec!["b"]);
        assert_eq!(names(&outcome.documents[2]), vec!["c"]);
        assert_eq!(
            outcome.issues,
            vec![RecordIssue::InvalidValue {
                record: 4,
                raw: "N/A".to_string()
            }]
        );
        assert_eq!(outcome.unmatched, 0);
    }

    #[test]
    fn test_split_keeps_document_order_within_range() {
        let doc = input(vec![
            record("first", Some("10")),
            record("other", Some("5000")),
            record("second", Some("20")),
            record("third", Some("3000")),
        ]);
        let outcome = split_document(doc, &ZIP_RANGES, &PlainCodec);
        assert_eq!(names(&outcome.documents[0]), vec!["first", "second", "third"]);
        assert_eq!(names(&outcome.documents[1]), vec!["other"]);
        assert!(outcome.documents[2].root.children.is_empty());
    }

    #[test]
    fn test_split_reports_asymmetry_between_unmatched_and_invalid() {
        let doc = input(vec![
            record("neg", Some("-5")),
            record("big", Some("15000")),
            record("bad", Some("ABC12")),
            record("none", None),
        ]);
        let outcome = split_document(doc, &ZIP_RANGES, &PlainCodec);

        assert!(outcome.documents.iter().all(|d| d.root.children.is_empty()));
        // Numeric codes outside every range are counted, not diagnosed.
        assert_eq!(outcome.unmatched, 2);
        assert_eq!(
            outcome.issues,
            vec![
                RecordIssue::InvalidValue {
                    record: 3,
                    raw: "ABC12".to_string()
                },
                RecordIssue::MissingField { record: 4 },
            ]
        );
    }

    #[test]
    fn test_split_finds_records_at_any_depth() {
        let mut doc = input(vec![record("top", Some("1"))]);
        doc.root.children.push(
            Element::new("Archive")
                .with_child(Element::new("Batch").with_child(record("deep", Some("2"))))
                .into(),
        );
        let outcome = split_document(doc, &ZIP_RANGES, &PlainCodec);
        assert_eq!(names(&outcome.documents[0]), vec!["top", "deep"]);
    }

    #[test]
    fn test_split_nested_records_are_moved_once() {
        let outer = record("outer", Some("100")).with_child(record("inner", Some("7000")));
        let doc = input(vec![outer]);
        let outcome = split_document(doc, &ZIP_RANGES, &PlainCodec);

        assert_eq!(names(&outcome.documents[0]), vec!["outer"]);
        assert_eq!(names(&outcome.documents[2]), vec!["inner"]);
        // The inner record left the outer one.
        let moved_outer = outcome.documents[0].root.child_elements().next().unwrap();
        assert!(moved_outer.descendant_paths("Register").is_empty());
    }

    #[test]
    fn test_split_uses_input_root_tag() {
        let mut doc = input(vec![record("a", Some("1"))]);
        doc.root.name = "Export".to_string();
        doc.root.attributes.push(("version".to_string(), "2".to_string()));
        let outcome = split_document(doc, &ZIP_RANGES, &PlainCodec);
        for output in &outcome.documents {
            assert_eq!(output.root_tag(), "Export");
            assert!(output.root.attributes.is_empty());
        }
    }

    #[test]
    fn test_split_moved_records_keep_namespace_bindings() {
        let mut doc = input(vec![record("a", Some("1"))]);
        doc.root.name = "ex:Main".to_string();
        doc.root.attributes = vec![
            ("xmlns:ex".to_string(), "urn:export".to_string()),
            ("xmlns:xsi".to_string(), "urn:xsi".to_string()),
            ("version".to_string(), "2".to_string()),
        ];
        let outcome = split_document(doc, &ZIP_RANGES, &PlainCodec);

        for output in &outcome.documents {
            assert_eq!(
                output.root.attributes,
                vec![("xmlns:ex".to_string(), "urn:export".to_string())]
            );
        }
        let moved = outcome.documents[0].root.child_elements().next().unwrap();
        assert_eq!(
            moved.attributes,
            vec![
                ("xmlns:ex".to_string(), "urn:export".to_string()),
                ("xmlns:xsi".to_string(), "urn:xsi".to_string()),
            ]
        );
    }

    #[test]
    fn test_split_cdata_mode_wraps_field_once() {
        let mut already = Element::new("Register").with_child(Element::new("Name").with_text("c"));
        already.children.push(
            Element::new("Adr")
                .with_child(Element::new("Zip").with_child(Node::CData("250".to_string())))
                .into(),
        );
        let doc = input(vec![record("a", Some(" 42 ")), already]);
        let outcome = split_document(doc, &ZIP_RANGES, &CdataCodec);

        let zips: Vec<_> = outcome.documents[0]
            .root
            .descendant_paths("Zip")
            .into_iter()
            .map(|p| outcome.documents[0].root.element_at(&p).unwrap().children.clone())
            .collect();
        assert_eq!(
            zips,
            vec![
                vec![Node::CData(" 42 ".to_string())],
                vec![Node::CData("250".to_string())],
            ]
        );
    }

    #[test]
    fn test_split_plain_mode_leaves_field_text() {
        let doc = input(vec![record("a", Some(" 42 "))]);
        let outcome = split_document(doc, &ZIP_RANGES, &PlainCodec);
        let zip_path = outcome.documents[0].root.descendant_paths("Zip").remove(0);
        assert_eq!(
            outcome.documents[0].root.element_at(&zip_path).unwrap().children,
            vec![Node::Text(" 42 ".to_string())]
        );
    }
}
