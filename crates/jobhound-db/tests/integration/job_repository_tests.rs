use std::collections::HashSet;

use jobhound_core::models::{JobBoard, JobSearch};
use jobhound_core::reconcile;
use jobhound_core::traits::{ExistenceCheck, JobStore};
use jobhound_db::JobRepository;

use crate::integration::common::{job, setup_test_db};

fn ids(values: &[&str]) -> HashSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn insert_then_exists_any() {
    let (pool, _container) = setup_test_db().await;
    let repo = JobRepository::new(pool);

    let written = repo
        .insert_jobs(&[
            job("dice-a", "Rust Engineer", "Acme", "Remote"),
            job("dice-b", "Go Engineer", "Globex", "Austin"),
        ])
        .await
        .unwrap();
    assert_eq!(written, 2);

    let known = repo
        .exists_any(&ids(&["dice-a", "dice-b", "dice-zzz"]))
        .await
        .unwrap();
    assert_eq!(known, ids(&["dice-a", "dice-b"]));

    assert!(repo.exists_any(&HashSet::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn insert_ignores_existing_ids() {
    let (pool, _container) = setup_test_db().await;
    let repo = JobRepository::new(pool);

    repo.insert_jobs(&[job("dice-a", "Original", "Acme", "Remote")])
        .await
        .unwrap();
    let written = repo
        .insert_jobs(&[
            job("dice-a", "Replacement", "Acme", "Remote"),
            job("dice-c", "New", "Acme", "Remote"),
        ])
        .await
        .unwrap();

    assert_eq!(written, 1);
    let stored = repo.get("dice-a").await.unwrap().unwrap();
    assert_eq!(stored.title, "Original");
}

#[tokio::test]
async fn large_batch_spans_chunks() {
    let (pool, _container) = setup_test_db().await;
    let repo = JobRepository::new(pool);

    let jobs: Vec<_> = (0..1203)
        .map(|i| job(&format!("mock-{i}"), "Bulk", "Acme", "Remote"))
        .collect();

    assert_eq!(repo.insert_jobs(&jobs).await.unwrap(), 1203);
    assert_eq!(repo.list_all().await.unwrap().len(), 1203);
}

#[tokio::test]
async fn reconcile_against_postgres() {
    let (pool, _container) = setup_test_db().await;
    let repo = JobRepository::new(pool);
    repo.insert_jobs(&[job("B", "t", "c", "l"), job("D", "t", "c", "l")])
        .await
        .unwrap();

    let candidates: Vec<_> = ["A", "B", "C", "D", "E"]
        .iter()
        .map(|id| job(id, "t", "c", "l"))
        .collect();
    let result = reconcile(candidates, &repo).await.unwrap();

    let new_ids: Vec<_> = result.new_records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(new_ids, ["A", "C", "E"]);
    assert_eq!(result.duplicate_count, 2);
}

#[tokio::test]
async fn search_combines_filters_case_insensitively() {
    let (pool, _container) = setup_test_db().await;
    let repo = JobRepository::new(pool);
    repo.insert_jobs(&[
        job("1", "Senior Rust Engineer", "Acme", "Remote"),
        job("2", "Rust Developer", "Globex", "Austin, TX"),
        job("3", "Java Developer", "Acme", "Austin, TX"),
    ])
    .await
    .unwrap();

    let rust = repo
        .search(&JobSearch {
            keyword: Some("rust".into()),
            ..JobSearch::default()
        })
        .await
        .unwrap();
    assert_eq!(rust.len(), 2);

    let acme_austin = repo
        .search(&JobSearch {
            keyword: None,
            location: Some("austin".into()),
            company: Some("ACME".into()),
        })
        .await
        .unwrap();
    assert_eq!(acme_austin.len(), 1);
    assert_eq!(acme_austin[0].id, "3");

    let everything = repo
        .search(&JobSearch {
            keyword: Some("  ".into()),
            ..JobSearch::default()
        })
        .await
        .unwrap();
    assert_eq!(everything.len(), 3);
}

#[tokio::test]
async fn round_trips_board_and_salary() {
    let (pool, _container) = setup_test_db().await;
    let repo = JobRepository::new(pool);

    let mut record = job("wwr-x", "Remote Dev", "Acme", "Remote");
    record.source_board = JobBoard::WeWorkRemotely;
    record.salary = Some("$90k".into());
    repo.insert_jobs(std::slice::from_ref(&record)).await.unwrap();

    let stored = repo.get("wwr-x").await.unwrap().unwrap();
    assert_eq!(stored.source_board, JobBoard::WeWorkRemotely);
    assert_eq!(stored.salary.as_deref(), Some("$90k"));
    assert!(repo.get("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn health_check_passes() {
    let (pool, _container) = setup_test_db().await;
    JobRepository::new(pool).health_check().await.unwrap();
}
