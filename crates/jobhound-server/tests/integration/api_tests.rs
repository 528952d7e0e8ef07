use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::Utc;
use tower::ServiceExt;

use jobhound_core::models::{JobBoard, JobRecord};
use jobhound_core::traits::JobStore;

use crate::integration::common::{TestApp, body_json, body_text, send, setup_test_app};

fn job(id: &str, title: &str, company: &str, location: &str) -> JobRecord {
    JobRecord {
        id: id.to_string(),
        title: title.to_string(),
        company: company.to_string(),
        location: location.to_string(),
        description: "Write software".to_string(),
        salary: None,
        source_url: format!("https://example.com/{id}"),
        source_board: JobBoard::Indeed,
        scraped_at: Utc::now(),
    }
}

async fn seeded_app() -> TestApp {
    let app = setup_test_app().await;
    app.db
        .jobs()
        .insert_jobs(&[
            job("indeed-1", "Senior Rust Engineer", "Acme", "Remote"),
            job("indeed-2", "Rust Developer", "Globex", "Austin, TX"),
            job("indeed-3", "Java Developer", "Acme", "Austin, TX"),
        ])
        .await
        .unwrap();
    app
}

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "ok");
}

#[tokio::test]
async fn unauthenticated_request_returns_401() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(Request::get("/api/jobs").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_api_key_returns_401() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(
            Request::post("/api/jobs/scrape-mock")
                .header("authorization", "Bearer wrong-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "unauthorized");
}

#[tokio::test]
async fn list_and_search_jobs() {
    let app = seeded_app().await;

    let all = body_json(send(&app.router, Method::GET, "/api/jobs", None).await).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
    assert_eq!(all[0]["job_board"], "Indeed");

    let response = send(
        &app.router,
        Method::GET,
        "/api/jobs/search?keyword=rust&location=austin",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let found = body_json(response).await;
    let found = found.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["id"], "indeed-2");
}

#[tokio::test]
async fn saved_jobs_require_identity() {
    let app = seeded_app().await;

    let response = send(&app.router, Method::GET, "/api/saved-jobs", None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "missing_identity");
}

#[tokio::test]
async fn save_unknown_job_returns_404() {
    let app = seeded_app().await;

    let response = send(
        &app.router,
        Method::POST,
        "/api/saved-jobs?job_id=nope",
        Some("alice"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "not_found");
}

#[tokio::test]
async fn saved_job_lifecycle_and_export() {
    let app = seeded_app().await;
    let router = &app.router;

    let saved = body_json(
        send(router, Method::POST, "/api/saved-jobs?job_id=indeed-1", Some("alice")).await,
    )
    .await;
    let first_id = saved["id"].as_i64().unwrap();
    assert_eq!(saved["applied"], false);
    assert_eq!(saved["job"]["title"], "Senior Rust Engineer");

    send(router, Method::POST, "/api/saved-jobs?job_id=indeed-2", Some("alice")).await;

    // Saving again returns the same row.
    let again = body_json(
        send(router, Method::POST, "/api/saved-jobs?job_id=indeed-1", Some("alice")).await,
    )
    .await;
    assert_eq!(again["id"].as_i64(), Some(first_id));

    let applied = send(
        router,
        Method::PUT,
        &format!("/api/saved-jobs/{first_id}/apply"),
        Some("alice"),
    )
    .await;
    assert_eq!(applied.status(), StatusCode::OK);
    assert_eq!(body_json(applied).await["applied"], true);

    let only_applied = body_json(
        send(router, Method::GET, "/api/saved-jobs?applied_only=true", Some("alice")).await,
    )
    .await;
    assert_eq!(only_applied.as_array().unwrap().len(), 1);

    let everything =
        body_json(send(router, Method::GET, "/api/saved-jobs", Some("alice")).await).await;
    assert_eq!(everything.as_array().unwrap().len(), 2);

    // Another user sees nothing and cannot touch alice's rows.
    let bobs = body_json(send(router, Method::GET, "/api/saved-jobs", Some("bob")).await).await;
    assert!(bobs.as_array().unwrap().is_empty());
    let forbidden = send(
        router,
        Method::DELETE,
        &format!("/api/saved-jobs/{first_id}"),
        Some("bob"),
    )
    .await;
    assert_eq!(forbidden.status(), StatusCode::NOT_FOUND);

    let export = send(router, Method::GET, "/api/saved-jobs/export", Some("alice")).await;
    assert_eq!(export.status(), StatusCode::OK);
    assert!(
        export.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    let csv = body_text(export).await;
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "Job Title,Company,Location,Job Board,Salary,Applied Date,Source URL"
    );
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("Senior Rust Engineer,Acme,Remote,Indeed,Not specified,"));

    let deleted = send(
        router,
        Method::DELETE,
        &format!("/api/saved-jobs/{first_id}"),
        Some("alice"),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    let remaining =
        body_json(send(router, Method::GET, "/api/saved-jobs", Some("alice")).await).await;
    assert_eq!(remaining.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(
            Request::get("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["paths"]["/api/jobs/scrape"].is_object());
    assert!(json["paths"]["/api/saved-jobs/{id}/apply"].is_object());
}
