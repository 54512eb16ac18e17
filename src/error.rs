use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("failed to read {}: {message}", path.display())]
    Load { path: PathBuf, message: String },

    #[error("input is missing required columns: Student ID, Name, Subject, Score")]
    MissingColumns,

    #[error("score for student {student_id} ({subject}) is not numeric: {value:?}")]
    InvalidScore {
        student_id: String,
        subject: String,
        value: String,
    },

    #[error("failed to write {}: {message}", path.display())]
    Render { path: PathBuf, message: String },
}
