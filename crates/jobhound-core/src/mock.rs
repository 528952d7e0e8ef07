use chrono::Utc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{JobBoard, JobRecord};

pub const DEFAULT_MOCK_COUNT: usize = 10;
/// Largest batch a caller may request.
pub const MAX_MOCK_COUNT: usize = 1000;

const TITLES: [&str; 5] = [
    "Senior Java Developer",
    "Python Engineer",
    "Full Stack Developer",
    "DevOps Engineer",
    "Data Scientist",
];
const COMPANIES: [&str; 5] = ["Google", "Microsoft", "Amazon", "Meta", "Apple"];
const LOCATIONS: [&str; 5] = ["New York", "San Francisco", "Seattle", "Austin", "Boston"];

const DESCRIPTION: &str = "This is a mock job description for testing purposes. \
    Required skills include Java, Spring Boot, and REST APIs.";
const SALARY: &str = "$100,000 - $150,000";

/// Reject counts above [`MAX_MOCK_COUNT`].
pub fn check_mock_count(count: usize) -> Result<usize, AppError> {
    if count > MAX_MOCK_COUNT {
        return Err(AppError::InvalidInput(format!(
            "mock count {count} exceeds the maximum of {MAX_MOCK_COUNT}"
        )));
    }
    Ok(count)
}

/// Synthetic job records for demos and tests.
///
/// Field values cycle through fixed lists by index; ids are fresh UUIDs on
/// every call, so two batches never collide with each other.
pub fn generate_mock(count: usize) -> Vec<JobRecord> {
    let scraped_at = Utc::now();
    let jobs: Vec<JobRecord> = (0..count)
        .map(|i| JobRecord {
            id: format!("{}-{}", JobBoard::MockBoard.id_prefix(), Uuid::new_v4()),
            title: TITLES[i % TITLES.len()].to_string(),
            company: COMPANIES[i % COMPANIES.len()].to_string(),
            location: LOCATIONS[i % LOCATIONS.len()].to_string(),
            description: DESCRIPTION.to_string(),
            salary: Some(SALARY.to_string()),
            source_url: format!("https://example.com/job/{i}"),
            source_board: JobBoard::MockBoard,
            scraped_at,
        })
        .collect();

    tracing::info!(count = jobs.len(), "Generated mock jobs");
    jobs
}
