//! Preference document HTTP handlers.
//!
//! ```text
//! GET    /             greeting
//! GET    /{username}   flat document
//! PUT    /{username}   store document, respond wrapped
//! POST   /{username}   same as PUT
//! DELETE /{username}   remove document
//! ```

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, delete, get, post, put, web};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::domain::{Error, PreferenceShape, Username, WriteMethod};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Body returned by `GET /`.
pub const GREETING: &str = "Hello from user-preferences.";

/// Wrapped preference document returned by writes.
#[derive(Debug, ToSchema)]
pub struct WrappedPreferencesSchema {
    /// Arbitrary JSON object of user settings.
    #[schema(value_type = Object)]
    pub preferences: Map<String, Value>,
}

fn parse_username(raw: String) -> Result<Username, Error> {
    Username::new(&raw).map_err(|_| Error::unknown_user_name(&raw))
}

fn json_body(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(body)
}

async fn write_preferences(
    state: web::Data<HttpState>,
    username: String,
    body: web::Bytes,
    method: WriteMethod,
) -> ApiResult<HttpResponse> {
    let username = parse_username(username)?;
    let document = state.command.write(&username, &body, method).await?;
    Ok(json_body(document.render(PreferenceShape::Wrapped)))
}

/// Greeting used as a trivial liveness check.
#[utoipa::path(
    get,
    path = "/",
    tags = ["preferences"],
    responses((status = 200, description = "Fixed greeting", body = String, content_type = "text/plain"))
)]
#[get("/")]
pub async fn greeting() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(GREETING)
}

/// Fetch a user's preferences as a flat JSON object.
#[utoipa::path(
    get,
    path = "/{username}",
    tags = ["preferences"],
    params(("username" = String, Path, description = "Existing username")),
    responses(
        (status = 200, description = "Flat preference document; `{}` when none is stored", body = Object),
        (status = 400, description = "Unknown user, as `{\"user\":\"<name>\"}`", body = String, content_type = "text/plain"),
        (status = 500, description = "Storage failure or unreadable stored document", body = String, content_type = "text/plain")
    )
)]
#[get("/{username}")]
pub async fn get_preferences(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let username = parse_username(path.into_inner())?;
    let body = state.query.fetch(&username, PreferenceShape::Flat).await?;
    Ok(json_body(body))
}

/// Create or replace a user's preferences.
///
/// The body may be the document itself or the document wrapped under a sole
/// `preferences` key.
#[utoipa::path(
    put,
    path = "/{username}",
    tags = ["preferences"],
    params(("username" = String, Path, description = "Existing username")),
    request_body(content = Object, content_type = "application/json"),
    responses(
        (status = 200, description = "Stored document", body = WrappedPreferencesSchema),
        (status = 400, description = "Unknown user or body is not a JSON object", body = String, content_type = "text/plain"),
        (status = 500, description = "Storage failure", body = String, content_type = "text/plain")
    )
)]
#[put("/{username}")]
pub async fn put_preferences(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    write_preferences(state, path.into_inner(), body, WriteMethod::Put).await
}

/// Create or replace a user's preferences; identical to `PUT`.
#[utoipa::path(
    post,
    path = "/{username}",
    tags = ["preferences"],
    params(("username" = String, Path, description = "Existing username")),
    request_body(content = Object, content_type = "application/json"),
    responses(
        (status = 200, description = "Stored document", body = WrappedPreferencesSchema),
        (status = 400, description = "Unknown user or body is not a JSON object", body = String, content_type = "text/plain"),
        (status = 500, description = "Storage failure", body = String, content_type = "text/plain")
    )
)]
#[post("/{username}")]
pub async fn post_preferences(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    write_preferences(state, path.into_inner(), body, WriteMethod::Post).await
}

/// Remove a user's preferences. Succeeds when nothing is stored.
#[utoipa::path(
    delete,
    path = "/{username}",
    tags = ["preferences"],
    params(("username" = String, Path, description = "Existing username")),
    responses(
        (status = 200, description = "Removed; empty body"),
        (status = 400, description = "Unknown user", body = String, content_type = "text/plain"),
        (status = 500, description = "Storage failure", body = String, content_type = "text/plain")
    )
)]
#[delete("/{username}")]
pub async fn delete_preferences(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let username = parse_username(path.into_inner())?;
    state.command.remove(&username).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Register the preference routes. The `/{username}` routes match any single
/// segment, so register fixed paths before calling this.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(greeting)
        .service(get_preferences)
        .service(put_preferences)
        .service(post_preferences)
        .service(delete_preferences);
}
