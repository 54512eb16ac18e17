use std::collections::HashMap;

use crate::error::ReportError;
use crate::models::{Record, RecordGroup, StudentSummary};

/// Groups records by Student ID. Rows with equal IDs join one group no matter
/// where they sit in the file, but each group keeps its rows in input order.
/// Groups come back sorted by Student ID so runs are deterministic.
pub fn group_records(records: Vec<Record>) -> Vec<RecordGroup> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<RecordGroup> = Vec::new();

    for record in records {
        match positions.get(&record.student_id) {
            Some(&at) => groups[at].records.push(record),
            None => {
                positions.insert(record.student_id.clone(), groups.len());
                groups.push(RecordGroup {
                    student_id: record.student_id.clone(),
                    records: vec![record],
                });
            }
        }
    }

    groups.sort_by(|a, b| a.student_id.cmp(&b.student_id));
    groups
}

/// Computes one student's totals. The name is taken from the group's first
/// record; a non-numeric score fails this student only.
pub fn summarize(group: &RecordGroup) -> Result<StudentSummary, ReportError> {
    let mut subject_scores = Vec::with_capacity(group.records.len());
    let mut total = 0.0;

    for record in &group.records {
        let score = record
            .score
            .as_number()
            .ok_or_else(|| ReportError::InvalidScore {
                student_id: group.student_id.clone(),
                subject: record.subject.clone(),
                value: record.score.display(),
            })?;
        total += score;
        subject_scores.push((record.subject.clone(), score));
    }

    let name = group
        .records
        .first()
        .map(|record| record.name.clone())
        .unwrap_or_default();
    let count = subject_scores.len() as f64;

    Ok(StudentSummary {
        student_id: group.student_id.clone(),
        name,
        total_score: total,
        average_score: total / count,
        subject_scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;

    fn record(student_id: &str, name: &str, subject: &str, score: Cell) -> Record {
        Record {
            student_id: student_id.to_string(),
            name: name.to_string(),
            subject: subject.to_string(),
            score,
        }
    }

    #[test]
    fn interleaved_rows_join_one_group_in_row_order() {
        let records = vec![
            record("S2", "Bob", "Math", Cell::Number(70.0)),
            record("S1", "Alice", "Math", Cell::Number(80.0)),
            record("S1", "Alice", "Science", Cell::Number(90.0)),
        ];

        let groups = group_records(records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].student_id, "S1");
        assert_eq!(groups[1].student_id, "S2");

        let subjects: Vec<&str> = groups[0]
            .records
            .iter()
            .map(|record| record.subject.as_str())
            .collect();
        assert_eq!(subjects, ["Math", "Science"]);
    }

    #[test]
    fn totals_and_average_cover_the_whole_group() {
        let group = RecordGroup {
            student_id: "S1".to_string(),
            records: vec![
                record("S1", "Alice", "Math", Cell::Number(80.0)),
                record("S1", "Alice", "Science", Cell::Number(91.0)),
            ],
        };

        let summary = summarize(&group).expect("summary should build");
        assert_eq!(summary.total_score, 171.0);
        assert_eq!(summary.average_score, 85.5);
        assert_eq!(
            summary.subject_scores,
            vec![("Math".to_string(), 80.0), ("Science".to_string(), 91.0)]
        );
    }

    #[test]
    fn single_record_group_has_total_equal_to_average() {
        let group = RecordGroup {
            student_id: "S2".to_string(),
            records: vec![record("S2", "Bob", "Math", Cell::Number(70.0))],
        };

        let summary = summarize(&group).expect("summary should build");
        assert_eq!(summary.total_score, 70.0);
        assert_eq!(summary.average_score, 70.0);
    }

    #[test]
    fn first_name_wins_within_a_group() {
        let group = RecordGroup {
            student_id: "S1".to_string(),
            records: vec![
                record("S1", "Alice", "Math", Cell::Number(80.0)),
                record("S1", "Alicia", "Science", Cell::Number(90.0)),
            ],
        };

        let summary = summarize(&group).expect("summary should build");
        assert_eq!(summary.name, "Alice");
    }

    #[test]
    fn text_scores_parse_before_summing() {
        let group = RecordGroup {
            student_id: "S1".to_string(),
            records: vec![
                record("S1", "Alice", "Math", Cell::Text("80".to_string())),
                record("S1", "Alice", "Science", Cell::Text("90.5".to_string())),
            ],
        };

        let summary = summarize(&group).expect("summary should build");
        assert_eq!(summary.total_score, 170.5);
    }

    #[test]
    fn non_numeric_score_names_the_student_and_subject() {
        let group = RecordGroup {
            student_id: "S1".to_string(),
            records: vec![record(
                "S1",
                "Alice",
                "Math",
                Cell::Text("eighty".to_string()),
            )],
        };

        let err = summarize(&group).expect_err("summary should fail");
        match err {
            ReportError::InvalidScore {
                student_id,
                subject,
                value,
            } => {
                assert_eq!(student_id, "S1");
                assert_eq!(subject, "Math");
                assert_eq!(value, "eighty");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
