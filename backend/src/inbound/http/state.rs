//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data`; it bundles the
//! domain services and the cron secret, so handlers stay free of I/O wiring
//! and can be tested against in-memory adapters.

use crate::domain::{CronSecret, Services};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub services: Services,
    /// `None` disables the cron trigger endpoint.
    pub cron_secret: Option<CronSecret>,
}

impl HttpState {
    /// Construct state from wired services.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use edumeetup::domain::CronSecret;
    /// use edumeetup::inbound::http::state::HttpState;
    /// use edumeetup::test_support::TestWorld;
    ///
    /// let world = TestWorld::new(Utc::now());
    /// let state = HttpState::new(world.services.clone(), CronSecret::new("s3cret"));
    /// assert!(state.cron_secret.is_some());
    /// ```
    #[must_use]
    pub fn new(services: Services, cron_secret: Option<CronSecret>) -> Self {
        Self {
            services,
            cron_secret,
        }
    }
}
