//! HTTP server assembly: configuration, adapter wiring, and startup.

pub mod config;

use std::io;
use std::sync::Arc;

use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::{Key, SameSite};
use actix_web::{web, App, HttpServer};
use tracing::{info, warn};

use crate::domain::{AttendanceService, ProximityService};
use crate::inbound::http;
use crate::inbound::http::health::HealthState;
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::{
    DbPool, DieselAttendanceStore, DieselCategoryRepository, DieselCommentRepository,
    DieselGeoIndex, DieselGroupRepository, DieselMeetupRepository, DieselUserRepository,
    PoolConfig,
};

pub use config::{AppConfig, ConfigError};

/// Wire the Diesel adapters and domain services onto a pool.
pub fn build_state(pool: &DbPool, config: &AppConfig) -> HttpState {
    let meetups = Arc::new(DieselMeetupRepository::new(pool.clone()));
    let attendance_store = Arc::new(DieselAttendanceStore::new(pool.clone()));
    let geo = Arc::new(DieselGeoIndex::new(pool.clone()));

    let attendance = AttendanceService::new(attendance_store, config.attendance);
    let proximity = ProximityService::new(geo, meetups.clone(), config.storage_timeout);

    HttpState {
        meetups,
        groups: Arc::new(DieselGroupRepository::new(pool.clone())),
        categories: Arc::new(DieselCategoryRepository::new(pool.clone())),
        comments: Arc::new(DieselCommentRepository::new(pool.clone())),
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        attendance: Arc::new(attendance),
        proximity: Arc::new(proximity),
    }
}

/// Load the session signing key, falling back to an ephemeral key only in
/// debug builds or when explicitly allowed.
fn load_session_key() -> io::Result<Key> {
    let key_path = std::env::var("SESSION_KEY_FILE")
        .unwrap_or_else(|_| "/var/run/secrets/session_key".to_owned());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(err) => {
            let allow_ephemeral =
                std::env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_ephemeral {
                warn!(path = %key_path, error = %err, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(io::Error::other(format!(
                    "failed to read session key at {key_path}: {err}"
                )))
            }
        }
    }
}

/// Run pending migrations against the configured database.
async fn run_migrations(database_url: String) -> io::Result<()> {
    use diesel::Connection;
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

    tokio::task::spawn_blocking(move || {
        let mut conn = diesel::PgConnection::establish(&database_url)
            .map_err(|err| io::Error::other(format!("database connection failed: {err}")))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map(|applied| info!(count = applied.len(), "migrations applied"))
            .map_err(|err| io::Error::other(format!("migrations failed: {err}")))
    })
    .await
    .map_err(|err| io::Error::other(format!("migration task panicked: {err}")))?
}

/// Build the pool, run migrations, and serve until shutdown.
pub async fn run(config: AppConfig) -> io::Result<()> {
    run_migrations(config.database_url.clone()).await?;

    let pool = DbPool::new(
        PoolConfig::new(config.database_url.as_str()).with_max_size(config.pool_max_size),
    )
    .await
    .map_err(|err| io::Error::other(err.to_string()))?;

    let state = build_state(&pool, &config);
    let key = load_session_key()?;
    let cookie_secure = config.cookie_secure;

    let health_state = web::Data::new(HealthState::new());
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
            .cookie_name("session".to_owned())
            .cookie_path("/".to_owned())
            .cookie_secure(cookie_secure)
            .cookie_http_only(true)
            .cookie_same_site(SameSite::Lax)
            .build();

        let app = App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(server_health_state.clone())
            .wrap(session)
            .configure(http::configure);

        #[cfg(debug_assertions)]
        let app = {
            use utoipa::OpenApi;
            use utoipa_swagger_ui::SwaggerUi;

            app.service(
                SwaggerUi::new("/docs/{_:.*}")
                    .url("/api-docs/openapi.json", crate::doc::ApiDoc::openapi()),
            )
        };

        app
    })
    .bind(config.bind_addr)?;

    info!(addr = %config.bind_addr, "listening");
    health_state.mark_ready();
    server.run().await
}
