//! Builds the handler state from settings and a database pool.

use edumeetup::domain::{CronSecret, Services};
use edumeetup::inbound::http::state::HttpState;
use edumeetup::outbound::persistence::DbPool;
use edumeetup::outbound::wiring::{WiringError, postgres_service_ports};
use edumeetup::settings::AppSettings;
use tracing::warn;

/// Services on the Postgres adapters plus the optional cron secret.
pub fn build_http_state(pool: &DbPool, settings: &AppSettings) -> Result<HttpState, WiringError> {
    let ports = postgres_service_ports(pool, settings)?;
    let services = Services::new(&ports, &settings.service_settings()?);
    let cron_secret = settings.cron_secret().and_then(CronSecret::new);
    if cron_secret.is_none() {
        warn!("EDUMEETUP_CRON_SECRET not set; /api/cron/triggers answers 503");
    }
    Ok(HttpState::new(services, cron_secret))
}
