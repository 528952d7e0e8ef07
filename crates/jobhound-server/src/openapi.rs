use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "jobhound API",
        version = "0.1.0",
        description = "Job-board scraping, deduplicated storage and saved-job tracking."
    ),
    paths(
        crate::routes::list_jobs,
        crate::routes::search_jobs,
        crate::routes::scrape_jobs,
        crate::routes::scrape_mock,
        crate::routes::list_saved,
        crate::routes::save_job,
        crate::routes::mark_applied,
        crate::routes::delete_saved,
        crate::routes::export_applied,
        crate::routes::health,
    ),
    components(schemas(
        crate::dto::JobResponse,
        crate::dto::SavedJobResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "jobs", description = "Stored job postings"),
        (name = "scrape", description = "Scrape triggers"),
        (name = "saved-jobs", description = "Per-user saved jobs and applications"),
        (name = "system", description = "Health and system status"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds Bearer token security scheme to the OpenAPI spec.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("token")
                        .description(Some(
                            "API key. Set via JOBHOUND_SERVER_API_KEY environment variable.",
                        ))
                        .build(),
                ),
            );
        }
    }
}
