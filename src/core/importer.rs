//! CSV import with template-header validation.
//!
//! Every cell comes back as text; the file may carry extra columns but must carry
//! every template column.

use crate::domain::model::{CellValue, Record};
use crate::utils::error::{ExportError, Result};
use csv::ReaderBuilder;
use std::io::Read;

/// Template columns absent from `file_headers`, in template order.
pub fn missing_headers<T: AsRef<str>>(template_headers: &[T], file_headers: &[String]) -> Vec<String> {
    template_headers
        .iter()
        .map(|h| h.as_ref())
        .filter(|h| !file_headers.iter().any(|f| f == h))
        .map(str::to_string)
        .collect()
}

pub fn import_csv<R: Read, T: AsRef<str>>(reader: R, template_headers: &[T]) -> Result<Vec<Record>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let file_headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let missing = missing_headers(template_headers, &file_headers);
    if !missing.is_empty() {
        tracing::warn!("CSV is missing template columns: {:?}", missing);
        return Err(ExportError::MissingColumns { missing });
    }

    let mut records = Vec::new();
    for row in rdr.records() {
        // 完全空白的行已由 csv reader 略過；只有逗號的列仍是一筆資料
        let row = row?;
        let record: Record = file_headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), CellValue::Text(row.get(i).unwrap_or("").to_string())))
            .collect();
        records.push(record);
    }

    tracing::info!("Imported {} records", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: [&str; 3] = ["line", "shift", "actual"];

    #[test]
    fn test_import_reads_rows_as_text() {
        let data = "line,shift,actual\nL1,A,480\n\"L,2\",B,\"5\"\"\"\n";
        let records = import_csv(data.as_bytes(), &TEMPLATE).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("actual"), Some(&CellValue::from("480")));
        assert_eq!(records[1].get("line"), Some(&CellValue::from("L,2")));
        assert_eq!(records[1].get("actual"), Some(&CellValue::from("5\"")));
    }

    #[test]
    fn test_import_reports_missing_columns() {
        let data = "line,actual\nL1,480\n";
        let err = import_csv(data.as_bytes(), &TEMPLATE).unwrap_err();
        match err {
            ExportError::MissingColumns { missing } => assert_eq!(missing, vec!["shift"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_import_keeps_extra_columns_and_skips_empty_lines() {
        let data = "line,shift,actual,remarks\nL1,A,480,ok\n\n,,,\nL2,B,500,\n";
        let records = import_csv(data.as_bytes(), &TEMPLATE).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0].keys().collect::<Vec<_>>(),
            vec!["line", "shift", "actual", "remarks"]
        );
        assert!(records[1].keys().all(|k| records[1].get(k) == Some(&CellValue::from(""))));
        assert_eq!(records[1].len(), 4);
        assert_eq!(records[2].get("line"), Some(&CellValue::from("L2")));
        assert_eq!(records[2].get("remarks"), Some(&CellValue::from("")));
    }

    #[test]
    fn test_comma_only_row_is_a_record() {
        let data = "line,shift\nL1,A\n,\nL2,B\n";
        let records = import_csv(data.as_bytes(), &["line", "shift"]).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].get("line"), Some(&CellValue::from("")));
        assert_eq!(records[1].get("shift"), Some(&CellValue::from("")));
    }

    #[test]
    fn test_short_rows_fill_with_empty_text() {
        let data = "line,shift,actual\nL1,A\n";
        let records = import_csv(data.as_bytes(), &TEMPLATE).unwrap();
        assert_eq!(records[0].get("actual"), Some(&CellValue::from("")));
    }
}
