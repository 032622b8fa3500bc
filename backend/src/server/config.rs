//! HTTP server configuration object and helpers.

use actix_web::cookie::{Key, SameSite};
use coursework::domain::DependencyPolicy;
use coursework::domain::ports::StorePorts;
use coursework::inbound::http::session_config::SessionSettings;
use std::net::SocketAddr;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) stores: StorePorts,
    pub(crate) policy: DependencyPolicy,
}

impl ServerConfig {
    /// Construct a server configuration over the given store adapters.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, stores: StorePorts) -> Self {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
        } = session;
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            stores,
            policy: DependencyPolicy::default(),
        }
    }

    /// Override the timeout applied to every store call.
    #[must_use]
    pub fn with_policy(mut self, policy: DependencyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
