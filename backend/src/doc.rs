//! OpenAPI documentation for the preference endpoints.
//!
//! Served at `/api-docs/openapi.json` and printed by the `openapi-dump`
//! binary.

use utoipa::OpenApi;

use crate::inbound::http::preferences::WrappedPreferencesSchema;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "user-preferences",
        description = "Per-user JSON preference documents keyed by username."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::preferences::greeting,
        crate::inbound::http::preferences::get_preferences,
        crate::inbound::http::preferences::put_preferences,
        crate::inbound::http::preferences::post_preferences,
        crate::inbound::http::preferences::delete_preferences,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(WrappedPreferencesSchema)),
    tags(
        (name = "preferences", description = "Preference documents"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
