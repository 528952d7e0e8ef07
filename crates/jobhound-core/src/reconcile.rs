use std::collections::HashSet;

use crate::error::AppError;
use crate::models::{JobRecord, ReconciliationResult};
use crate::traits::ExistenceCheck;

/// Split candidates into new and already-known records.
///
/// Issues exactly one existence check for the whole batch. New records keep
/// their input order. This is a pure filter: nothing is written, so calling it
/// twice against unchanged storage gives the same answer.
pub async fn reconcile<C: ExistenceCheck>(
    candidates: Vec<JobRecord>,
    existence: &C,
) -> Result<ReconciliationResult, AppError> {
    let ids: HashSet<String> = candidates.iter().map(|job| job.id.clone()).collect();
    let known = existence.exists_any(&ids).await?;

    let total = candidates.len();
    let new_records: Vec<JobRecord> = candidates
        .into_iter()
        .filter(|job| !known.contains(&job.id))
        .collect();
    let new_count = new_records.len();
    let duplicate_count = total - new_count;

    tracing::debug!(new_count, duplicate_count, "Reconciled candidate batch");

    Ok(ReconciliationResult {
        new_records,
        new_count,
        duplicate_count,
    })
}
