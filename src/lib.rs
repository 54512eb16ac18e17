pub mod aggregate;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod render;

use std::path::Path;

pub use error::ReportError;
pub use models::CardOutcome;

/// Runs the whole pipeline: load, validate, group, then render one report card
/// per student. Load and schema failures end the run; a failure inside one
/// student's summary or rendering is captured in that student's outcome and the
/// loop moves on to the next student.
pub fn generate_report_cards(
    input: &Path,
    out_dir: &Path,
) -> Result<Vec<CardOutcome>, ReportError> {
    let records = loader::load_records(input)?;
    let groups = aggregate::group_records(records);

    let mut outcomes = Vec::with_capacity(groups.len());
    for group in groups {
        let student_id = group.student_id.clone();
        let result = aggregate::summarize(&group)
            .and_then(|summary| render::write_report_card(&summary, out_dir));
        outcomes.push(CardOutcome { student_id, result });
    }

    Ok(outcomes)
}
