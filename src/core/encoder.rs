//! Records to CSV text.
//!
//! The header row is the first record's key order. Text cells are always quoted with
//! inner quotes doubled; numbers and booleans are written as-is; null or absent cells
//! are empty. Lines are joined with `\n` and there is no trailing newline.

use crate::domain::model::{CellValue, ExportOptions, HeaderQuoting, Record, RecordPolicy};
use crate::utils::error::{ExportError, Result};
use std::borrow::Cow;

pub const FIELD_SEPARATOR: char = ',';
pub const LINE_SEPARATOR: &str = "\n";

/// Column names taken from the first record, in its key order.
pub fn header_row(records: &[Record]) -> Vec<String> {
    records
        .first()
        .map(|first| first.keys().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Wraps text in double quotes, doubling any quote inside it.
pub fn quote_text(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        if ch == '"' {
            quoted.push('"');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

fn needs_quoting(value: &str) -> bool {
    value
        .chars()
        .any(|c| matches!(c, FIELD_SEPARATOR | '"' | '\n' | '\r'))
}

pub fn encode_header(name: &str, quoting: HeaderQuoting) -> Cow<'_, str> {
    match quoting {
        HeaderQuoting::Always => Cow::Owned(quote_text(name)),
        HeaderQuoting::AsNeeded if needs_quoting(name) => Cow::Owned(quote_text(name)),
        HeaderQuoting::AsNeeded => Cow::Borrowed(name),
    }
}

pub fn encode_header_line<S: AsRef<str>>(headers: &[S], quoting: HeaderQuoting) -> String {
    headers
        .iter()
        .map(|h| encode_header(h.as_ref(), quoting))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn encode_cell(value: Option<&CellValue>) -> String {
    match value {
        Some(CellValue::Text(s)) => quote_text(s),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

pub fn encode_row<S: AsRef<str>>(record: &Record, headers: &[S]) -> String {
    headers
        .iter()
        .map(|h| encode_cell(record.get(h.as_ref())))
        .collect::<Vec<_>>()
        .join(",")
}

/// Keys the header row expects but the record lacks, and keys the header row never saw.
fn key_mismatch<S: AsRef<str>>(record: &Record, headers: &[S]) -> (Vec<String>, Vec<String>) {
    let missing = headers
        .iter()
        .map(|h| h.as_ref())
        .filter(|h| !record.contains_key(h))
        .map(str::to_string)
        .collect();
    let unexpected = record
        .keys()
        .filter(|k| !headers.iter().any(|h| h.as_ref() == *k))
        .map(str::to_string)
        .collect();
    (missing, unexpected)
}

/// Builds the full CSV document. Returns `None` when there are no records.
pub fn encode_records(records: &[Record], options: &ExportOptions) -> Result<Option<String>> {
    if records.is_empty() {
        return Ok(None);
    }

    let headers = header_row(records);
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(encode_header_line(&headers, options.header_quoting));

    for (index, record) in records.iter().enumerate() {
        let (missing, unexpected) = key_mismatch(record, &headers);
        if !missing.is_empty() || !unexpected.is_empty() {
            match options.record_policy {
                RecordPolicy::Strict => {
                    return Err(ExportError::NonUniformRecord {
                        index,
                        missing,
                        unexpected,
                    });
                }
                RecordPolicy::Lenient => {
                    tracing::warn!(
                        "Record {} does not match the header row (missing: {:?}, dropped: {:?})",
                        index,
                        missing,
                        unexpected
                    );
                }
            }
        }
        lines.push(encode_row(record, &headers));
    }

    tracing::debug!(
        "Encoded {} records across {} columns",
        records.len(),
        headers.len()
    );
    Ok(Some(lines.join(LINE_SEPARATOR)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict() -> ExportOptions {
        ExportOptions {
            record_policy: RecordPolicy::Strict,
            ..ExportOptions::default()
        }
    }

    #[test]
    fn test_encode_reference_example() {
        let records = vec![Record::new().with("name", "A,B").with("qty", 5i64)];
        let csv = encode_records(&records, &ExportOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(csv, "name,qty\n\"A,B\",5");
    }

    #[test]
    fn test_empty_input_encodes_nothing() {
        assert_eq!(encode_records(&[], &ExportOptions::default()).unwrap(), None);
    }

    #[test]
    fn test_text_is_always_quoted_and_quotes_doubled() {
        assert_eq!(encode_cell(Some(&CellValue::from("Line 1"))), "\"Line 1\"");
        assert_eq!(
            encode_cell(Some(&CellValue::from("12\" drum, \"heavy\""))),
            "\"12\"\" drum, \"\"heavy\"\"\""
        );
        assert_eq!(encode_cell(Some(&CellValue::from(""))), "\"\"");
        assert_eq!(encode_cell(Some(&CellValue::from("a\nb"))), "\"a\nb\"");
    }

    #[test]
    fn test_scalars_are_unquoted() {
        assert_eq!(encode_cell(Some(&CellValue::Integer(-12))), "-12");
        assert_eq!(encode_cell(Some(&CellValue::Float(96.5))), "96.5");
        assert_eq!(encode_cell(Some(&CellValue::Bool(true))), "true");
        assert_eq!(encode_cell(Some(&CellValue::Null)), "");
        assert_eq!(encode_cell(None), "");
    }

    #[test]
    fn test_header_order_follows_first_record() {
        let records = vec![
            Record::new()
                .with("line", "L1")
                .with("target", 500i64)
                .with("actual", 480i64),
            Record::new()
                .with("actual", 510i64)
                .with("line", "L2")
                .with("target", 500i64),
        ];
        let csv = encode_records(&records, &strict()).unwrap().unwrap();
        assert_eq!(csv, "line,target,actual\n\"L1\",500,480\n\"L2\",500,510");
    }

    #[test]
    fn test_header_quoting_policies() {
        let headers = ["qty", "size, mm", "say \"hi\""];
        assert_eq!(
            encode_header_line(&headers, HeaderQuoting::AsNeeded),
            "qty,\"size, mm\",\"say \"\"hi\"\"\""
        );
        assert_eq!(
            encode_header_line(&headers[..1], HeaderQuoting::Always),
            "\"qty\""
        );
    }

    #[test]
    fn test_lenient_policy_fills_missing_and_drops_extra() {
        let records = vec![
            Record::new().with("product", "Shoe").with("qty", 3i64),
            Record::new().with("product", "Pad").with("colour", "red"),
        ];
        let csv = encode_records(&records, &ExportOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(csv, "product,qty\n\"Shoe\",3\n\"Pad\",");
    }

    #[test]
    fn test_strict_policy_rejects_non_uniform_records() {
        let records = vec![
            Record::new().with("product", "Shoe").with("qty", 3i64),
            Record::new().with("product", "Pad").with("colour", "red"),
        ];
        let err = encode_records(&records, &strict()).unwrap_err();
        match err {
            ExportError::NonUniformRecord {
                index,
                missing,
                unexpected,
            } => {
                assert_eq!(index, 1);
                assert_eq!(missing, vec!["qty".to_string()]);
                assert_eq!(unexpected, vec!["colour".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_line_and_field_counts_match() {
        let records: Vec<Record> = (0..4i64)
            .map(|i| {
                Record::new()
                    .with("id", i)
                    .with("remark", format!("batch {i}, ok"))
                    .with("passed", i % 2 == 0)
            })
            .collect();
        let text = encode_records(&records, &strict()).unwrap().unwrap();

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let header_len = reader.headers().unwrap().len();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), records.len());
        assert!(rows.iter().all(|r| r.len() == header_len));
    }
}
