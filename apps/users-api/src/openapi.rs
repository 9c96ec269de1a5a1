use utoipa::OpenApi;

/// Aggregated OpenAPI documentation for the users API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Users API",
        description = "REST API for user management backed by PostgreSQL"
    ),
    nest(
        (path = "/api/users", api = domain_users::handlers::ApiDoc)
    )
)]
pub struct ApiDoc;
