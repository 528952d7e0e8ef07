use std::io::Write;

use crate::error::AppError;
use crate::models::SavedJob;

const HEADER: [&str; 7] = [
    "Job Title",
    "Company",
    "Location",
    "Job Board",
    "Salary",
    "Applied Date",
    "Source URL",
];

/// Write applied saved jobs as CSV, one row per job, header first.
///
/// Jobs that are not marked applied are skipped.
pub fn write_applied_csv<W: Write>(jobs: &[SavedJob], out: W) -> Result<usize, AppError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HEADER)?;

    let mut rows = 0;
    for saved in jobs.iter().filter(|s| s.applied) {
        let applied_date = saved
            .applied_at
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        writer.write_record([
            saved.job.title.as_str(),
            saved.job.company.as_str(),
            saved.job.location.as_str(),
            saved.job.source_board.as_str(),
            saved.job.salary.as_deref().unwrap_or("Not specified"),
            applied_date.as_str(),
            saved.job.source_url.as_str(),
        ])?;
        rows += 1;
    }

    writer
        .flush()
        .map_err(|e| AppError::CsvError(e.to_string()))?;
    Ok(rows)
}
