//! CSV export
//!
//! Records are serialized through serde, so the header row is the record's
//! own field names in declaration order. Cells are quoted per RFC 4180 and
//! text starting with `= + - @` gets a leading `'` so spreadsheets do not
//! evaluate it.

use serde::Serialize;
use serde_json::Value;
use shared::error::{AppError, AppResult};
use std::path::{Path, PathBuf};

const FALLBACK_FILE_NAME: &str = "hr-desk-export.csv";
const MAX_FILE_NAME_LEN: usize = 255;

/// Render records as CSV, columns taken from the first record
pub fn export_csv<T: Serialize>(records: &[T]) -> AppResult<String> {
    let rows = to_rows(records)?;
    let columns: Vec<String> = rows
        .first()
        .and_then(Value::as_object)
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default();
    Ok(rows_to_csv(&columns, &rows))
}

/// Render only the given columns, in the given order
pub fn export_csv_columns<T: Serialize>(records: &[T], columns: &[&str]) -> AppResult<String> {
    let rows = to_rows(records)?;
    let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    Ok(rows_to_csv(&columns, &rows))
}

/// Write an export into `dir` under a sanitized `*.csv` name
pub fn export_csv_file<T: Serialize>(records: &[T], dir: &Path, name: &str) -> AppResult<PathBuf> {
    let content = export_csv(records)?;
    std::fs::create_dir_all(dir)
        .map_err(|e| AppError::storage(format!("Failed to create {}: {e}", dir.display())))?;
    let path = dir.join(sanitize_export_filename(name));
    std::fs::write(&path, content)
        .map_err(|e| AppError::storage(format!("Failed to write {}: {e}", path.display())))?;
    tracing::info!(path = %path.display(), rows = records.len(), "CSV exported");
    Ok(path)
}

fn to_rows<T: Serialize>(records: &[T]) -> AppResult<Vec<Value>> {
    records
        .iter()
        .map(|r| {
            serde_json::to_value(r)
                .map_err(|e| AppError::internal(format!("Failed to serialize record: {e}")))
        })
        .collect()
}

fn rows_to_csv(columns: &[String], rows: &[Value]) -> String {
    if columns.is_empty() {
        return String::new();
    }
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        columns
            .iter()
            .map(|c| csv_escape(c))
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in rows {
        let line = columns
            .iter()
            .map(|column| cell(row.get(column)))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }
    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => csv_escape(&neutralize_csv_formula(text)),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => csv_escape(&other.to_string()),
    }
}

fn should_neutralize(value: &str) -> bool {
    let trimmed = value.trim_start();
    matches!(trimmed.chars().next(), Some('=' | '+' | '-' | '@'))
}

fn neutralize_csv_formula(value: &str) -> String {
    if should_neutralize(value) {
        format!("'{value}")
    } else {
        value.to_string()
    }
}

fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Keep `[A-Za-z0-9._-]`, replace the rest, force a `.csv` suffix
pub fn sanitize_export_filename(value: &str) -> String {
    let safe: String = value
        .trim()
        .chars()
        .take(MAX_FILE_NAME_LEN)
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    let safe = safe.trim_matches(|c| c == '_' || c == '.');
    if safe.is_empty() {
        return FALLBACK_FILE_NAME.to_string();
    }
    if safe.to_ascii_lowercase().ends_with(".csv") {
        safe.to_string()
    } else {
        format!("{safe}.csv")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Row {
        id: i64,
        name: String,
        note: Option<String>,
        active: bool,
    }

    fn row(id: i64, name: &str, note: Option<&str>) -> Row {
        Row {
            id,
            name: name.to_string(),
            note: note.map(str::to_string),
            active: true,
        }
    }

    #[test]
    fn test_header_follows_field_order() {
        let csv = export_csv(&[row(1, "Ana", None)]).unwrap();
        assert_eq!(csv, "id,name,note,active\r\n1,Ana,,true\r\n");
    }

    #[test]
    fn test_quoting() {
        let csv = export_csv(&[row(2, "Doe, \"JD\"", Some("line1\nline2"))]).unwrap();
        let data = csv.split_once("\r\n").unwrap().1;
        assert_eq!(data, "2,\"Doe, \"\"JD\"\"\",\"line1\nline2\",true\r\n");
    }

    #[test]
    fn test_formula_cells_neutralized() {
        let csv = export_csv(&[row(3, "=HYPERLINK(\"x\")", Some("@cmd"))]).unwrap();
        assert!(csv.contains("\"'=HYPERLINK(\"\"x\"\")\""));
        assert!(csv.contains(",'@cmd,"));
    }

    #[test]
    fn test_empty_and_selected_columns() {
        let empty: Vec<Row> = Vec::new();
        assert_eq!(export_csv(&empty).unwrap(), "");

        let csv = export_csv_columns(&[row(4, "Bo", None)], &["name", "id"]).unwrap();
        assert_eq!(csv, "name,id\r\nBo,4\r\n");
    }

    #[test]
    fn test_sanitize_export_filename() {
        assert_eq!(sanitize_export_filename("vendors"), "vendors.csv");
        assert_eq!(sanitize_export_filename("Payroll 2025/04.CSV"), "Payroll_2025_04.CSV");
        assert_eq!(sanitize_export_filename("../../etc/passwd"), "etc_passwd.csv");
        assert_eq!(sanitize_export_filename("///"), FALLBACK_FILE_NAME);
    }

    #[test]
    fn test_export_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_csv_file(&[row(1, "Ana", None)], dir.path(), "team list").unwrap();
        assert_eq!(path.file_name().unwrap(), "team_list.csv");
        assert!(std::fs::read_to_string(path).unwrap().starts_with("id,name"));
    }
}
