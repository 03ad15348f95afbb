//! HTTP server configuration object.

use std::net::SocketAddr;

use edumeetup::inbound::http::session_config::SessionSettings;
use edumeetup::inbound::http::state::HttpState;

/// Everything `create_server` needs once startup checks have passed.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: HttpState,
}

impl ServerConfig {
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, http_state: HttpState) -> Self {
        Self {
            session,
            bind_addr,
            http_state,
        }
    }
}
