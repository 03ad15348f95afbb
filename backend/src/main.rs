//! Backend entry-point: loads settings, migrates the schema and serves the
//! HTTP API.

mod server;

use std::io;

use actix_web::web;
use mockable::DefaultEnv;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use edumeetup::inbound::http::health::HealthState;
use edumeetup::inbound::http::session_config::fingerprint::key_fingerprint;
use edumeetup::inbound::http::session_config::{BuildMode, session_settings_from_env};
use edumeetup::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use edumeetup::settings::AppSettings;
use ortho_config::OrthoConfig;

use server::{ServerConfig, build_http_state, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let env = DefaultEnv::new();
    let session = session_settings_from_env(&env, BuildMode::from_debug_assertions())
        .map_err(io::Error::other)?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        "session key loaded"
    );

    let database_url = settings.database_url().map_err(io::Error::other)?;
    let applied = run_pending_migrations(database_url)
        .await
        .map_err(io::Error::other)?;
    info!(applied, "database migrations complete");

    let pool = DbPool::new(
        PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
    )
    .await
    .map_err(io::Error::other)?;

    let http_state = build_http_state(&pool, &settings).map_err(io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    info!(%bind_addr, "starting HTTP server");

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state,
        ServerConfig::new(session, bind_addr, http_state),
    )?;
    server.await
}
