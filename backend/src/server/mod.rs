//! Server construction and store selection.

mod config;

pub use config::ServerSettings;
use config::bind_target;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, HttpServer, get, web};
use color_eyre::eyre::{Result, WrapErr};
use tracing::{info, warn};
use utoipa::OpenApi;

use user_preferences::Trace;
use user_preferences::doc::ApiDoc;
use user_preferences::domain::ports::FixturePreferenceStore;
use user_preferences::inbound::http::health::{HealthState, live, ready};
use user_preferences::inbound::http::preferences;
use user_preferences::inbound::http::state::HttpState;
use user_preferences::outbound::persistence::{DbPool, DieselPreferenceStore};

#[get("/api-docs/openapi.json")]
async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

/// Wire the preference service onto PostgreSQL, or onto the in-memory store
/// when no database is configured.
pub async fn build_http_state(settings: &ServerSettings) -> Result<HttpState> {
    match settings.pool_config() {
        Some(pool_config) => {
            info!(database = %pool_config, "using PostgreSQL preference store");
            let pool = DbPool::new(pool_config)
                .await
                .wrap_err("failed to build database pool")?;
            Ok(HttpState::from_store(Arc::new(DieselPreferenceStore::new(
                pool,
            ))))
        }
        None => {
            warn!("no database URL configured; preferences are kept in memory");
            Ok(HttpState::from_store(Arc::new(
                FixturePreferenceStore::new(),
            )))
        }
    }
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(ready)
        .service(live)
        .service(openapi_json)
        .configure(preferences::configure)
}

/// Bind the HTTP server on the configured listen address.
///
/// The returned [`Server`] must be awaited to drive the listener. Readiness
/// is marked once the socket is bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
    settings: &ServerSettings,
) -> Result<Server> {
    let listen = settings.listen();
    let target = bind_target(&listen);
    let http_state = web::Data::new(http_state);
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(target.as_str())
    .wrap_err_with(|| format!("failed to bind {listen}"))?
    .run();

    info!(%listen, "listening");
    health_state.mark_ready();
    Ok(server)
}
