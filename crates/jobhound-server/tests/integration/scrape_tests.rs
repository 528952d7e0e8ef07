use std::io::Write;
use std::time::Duration;

use axum::http::{Method, StatusCode};

use crate::integration::common::{
    DICE_LISTING, body_json, body_text, send, setup_test_app, setup_test_app_with_listing,
    wait_for_job_count,
};

#[tokio::test]
async fn scrape_saves_then_skips_duplicates() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/jobs")
        .with_status(200)
        .with_body(DICE_LISTING)
        .create_async()
        .await;
    let app = setup_test_app_with_listing(&server.url(), Duration::from_secs(10)).await;

    let first = send(&app.router, Method::POST, "/api/jobs/scrape", None).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(
        body_text(first).await,
        "Scraping completed! Saved 2 new jobs, skipped 0 duplicates."
    );

    let second = send(&app.router, Method::POST, "/api/jobs/scrape", None).await;
    assert_eq!(
        body_text(second).await,
        "Scraping completed! Saved 0 new jobs, skipped 2 duplicates."
    );

    let jobs = body_json(send(&app.router, Method::GET, "/api/jobs", None).await).await;
    let ids: Vec<_> = jobs
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&"dice-11111111-aaaa-4bbb-8ccc-000000000001".to_string()));
}

#[tokio::test]
async fn failing_source_reports_no_jobs() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/jobs")
        .with_status(503)
        .create_async()
        .await;
    let app = setup_test_app_with_listing(&server.url(), Duration::from_secs(10)).await;

    let response = send(&app.router, Method::POST, "/api/jobs/scrape", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_text(response).await,
        "Scraping completed but no jobs found."
    );
}

#[tokio::test]
async fn no_sources_reports_no_jobs() {
    let app = setup_test_app().await;
    let response = send(&app.router, Method::POST, "/api/jobs/scrape", None).await;
    assert_eq!(
        body_text(response).await,
        "Scraping completed but no jobs found."
    );
}

#[tokio::test]
async fn slow_scrape_returns_408_and_saves_later() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/jobs")
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(Duration::from_millis(1000));
            w.write_all(DICE_LISTING.as_bytes())
        })
        .create_async()
        .await;
    let app = setup_test_app_with_listing(&server.url(), Duration::from_millis(200)).await;

    let response = send(&app.router, Method::POST, "/api/jobs/scrape", None).await;

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert!(body_text(response).await.contains("taking longer than expected"));

    // The background batch still holds the single-flight guard.
    let second = send(&app.router, Method::POST, "/api/jobs/scrape", None).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(body_text(second).await, "Scraping is already in progress.");

    assert_eq!(wait_for_job_count(&app.router, 2).await, 2);
}

#[tokio::test]
async fn scrape_mock_returns_202_and_persists() {
    let app = setup_test_app().await;

    let response = send(&app.router, Method::POST, "/api/jobs/scrape-mock", None).await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(body_text(response).await, "Mock job scraping initiated");
    assert_eq!(wait_for_job_count(&app.router, 10).await, 10);

    let response = send(
        &app.router,
        Method::POST,
        "/api/jobs/scrape-mock?count=3",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(wait_for_job_count(&app.router, 13).await, 13);
}

#[tokio::test]
async fn scrape_mock_rejects_oversized_count() {
    let app = setup_test_app().await;

    let response = send(
        &app.router,
        Method::POST,
        "/api/jobs/scrape-mock?count=1099511627776",
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid_input");

    let jobs = body_json(send(&app.router, Method::GET, "/api/jobs", None).await).await;
    assert!(jobs.as_array().unwrap().is_empty());
}
