use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::ReportError;
use crate::models::{Cell, Record};

pub const REQUIRED_COLUMNS: [&str; 4] = ["Student ID", "Name", "Subject", "Score"];

/// Loads one record per row, dispatching on the file extension. CSV goes
/// through the `csv` crate; everything else is treated as a workbook.
pub fn load_records(path: &Path) -> Result<Vec<Record>, ReportError> {
    if !path.exists() {
        return Err(ReportError::SourceNotFound(path.to_path_buf()));
    }

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => load_csv(path),
        _ => load_workbook(path),
    }
}

/// Whole-run schema gate: every required column must be present, case- and
/// name-exact. Extra columns are ignored.
pub fn validate_columns(headers: &[String]) -> Result<(), ReportError> {
    let all_present = REQUIRED_COLUMNS
        .iter()
        .all(|required| headers.iter().any(|header| header == required));

    if all_present {
        Ok(())
    } else {
        Err(ReportError::MissingColumns)
    }
}

fn load_workbook(path: &Path) -> Result<Vec<Record>, ReportError> {
    let load_err = |message: String| ReportError::Load {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|err| load_err(err.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| load_err("workbook has no sheets".to_string()))?
        .map_err(|err| load_err(err.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(|value| sheet_cell(value).display()).collect())
        .unwrap_or_default();
    validate_columns(&headers)?;

    let position = |name: &str| headers.iter().position(|header| header == name);
    let (Some(id_col), Some(name_col), Some(subject_col), Some(score_col)) = (
        position(REQUIRED_COLUMNS[0]),
        position(REQUIRED_COLUMNS[1]),
        position(REQUIRED_COLUMNS[2]),
        position(REQUIRED_COLUMNS[3]),
    ) else {
        return Err(ReportError::MissingColumns);
    };

    let cell_at = |row: &[Data], index: usize| row.get(index).map_or(Cell::Empty, sheet_cell);

    let mut records = Vec::new();
    for row in rows {
        let student_id = cell_at(row, id_col);
        // Rows without a Student ID cannot be grouped; skip them like the
        // original stack drops null-keyed rows.
        if student_id.is_blank() {
            continue;
        }

        records.push(Record {
            student_id: student_id.display(),
            name: cell_at(row, name_col).display(),
            subject: cell_at(row, subject_col).display(),
            score: cell_at(row, score_col),
        });
    }

    Ok(records)
}

fn sheet_cell(value: &Data) -> Cell {
    match value {
        Data::Empty => Cell::Empty,
        Data::Float(value) => Cell::Number(*value),
        Data::Int(value) => Cell::Number(*value as f64),
        Data::Bool(value) => Cell::Bool(*value),
        Data::String(value) => Cell::Text(value.clone()),
        other => Cell::Text(other.to_string()),
    }
}

fn load_csv(path: &Path) -> Result<Vec<Record>, ReportError> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        #[serde(rename = "Student ID")]
        student_id: String,
        #[serde(rename = "Name")]
        name: String,
        #[serde(rename = "Subject")]
        subject: String,
        #[serde(rename = "Score")]
        score: String,
    }

    let load_err = |message: String| ReportError::Load {
        path: path.to_path_buf(),
        message,
    };

    let mut reader = csv::Reader::from_path(path).map_err(|err| load_err(err.to_string()))?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|err| load_err(err.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();
    validate_columns(&headers)?;

    let mut records = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        let row = result.map_err(|err| load_err(err.to_string()))?;
        if row.student_id.trim().is_empty() {
            continue;
        }

        let score = if row.score.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(row.score)
        };
        records.push(Record {
            student_id: row.student_id,
            name: row.name,
            subject: row.subject,
            score,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_csv(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("scores.csv");
        fs::write(&path, contents).expect("failed to write test csv");
        path
    }

    #[test]
    fn csv_rows_load_in_order_with_extra_columns_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(
            dir.path(),
            "Student ID,Name,Subject,Score,Homeroom\n\
             S1,Alice,Math,80,A\n\
             S2,Bob,Math,70,B\n\
             S1,Alice,Science,90,A\n",
        );

        let records = load_records(&path).expect("load should succeed");
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].student_id, "S1");
        assert_eq!(records[0].subject, "Math");
        assert_eq!(records[1].student_id, "S2");
        assert_eq!(records[2].subject, "Science");
        assert_eq!(records[2].score, Cell::Text("90".to_string()));
    }

    #[test]
    fn rows_without_a_student_id_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(
            dir.path(),
            "Student ID,Name,Subject,Score\n\
             S1,Alice,Math,80\n\
             ,,,\n\
             S2,Bob,Math,70\n",
        );

        let records = load_records(&path).expect("load should succeed");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn missing_score_column_fails_the_whole_run() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(dir.path(), "Student ID,Name,Subject\nS1,Alice,Math\n");

        let err = load_records(&path).expect_err("schema gate should trip");
        assert!(matches!(err, ReportError::MissingColumns));
        for column in REQUIRED_COLUMNS {
            assert!(err.to_string().contains(column));
        }
    }

    #[test]
    fn column_match_is_case_exact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_csv(dir.path(), "student id,name,subject,score\nS1,Alice,Math,80\n");

        let err = load_records(&path).expect_err("lowercase headers should not match");
        assert!(matches!(err, ReportError::MissingColumns));
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let err = load_records(Path::new("no_such_dir/student_data.xlsx"))
            .expect_err("missing path should fail");
        assert!(matches!(err, ReportError::SourceNotFound(_)));
    }

    #[test]
    fn corrupt_workbook_is_a_load_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.xlsx");
        fs::write(&path, b"this is not a zip archive").expect("write");

        let err = load_records(&path).expect_err("corrupt workbook should fail");
        assert!(matches!(err, ReportError::Load { .. }));
    }
}
