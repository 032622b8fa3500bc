//! Backend entry-point: loads settings, prepares the stores and serves the API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use coursework::config::AppSettings;
use coursework::domain::DependencyPolicy;
use coursework::domain::ports::StorePorts;
use coursework::inbound::http::health::HealthState;
use coursework::inbound::http::session_config::{BuildMode, session_settings};
use coursework::outbound::memory::InMemoryStore;
use coursework::outbound::persistence::{
    DbPool, PoolConfig, run_pending_migrations, store_ports,
};
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    let session = session_settings(&settings, BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    info!(fingerprint = %session.key_fingerprint(), "session key loaded");

    let policy = DependencyPolicy::new(settings.dependency_timeout()?);
    let stores = build_stores(&settings, policy).await?;
    let bind_addr = settings.bind_addr()?;

    let config = ServerConfig::new(session, bind_addr, stores).with_policy(policy);
    info!(addr = %config.bind_addr(), "starting coursework server");

    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await?;
    Ok(())
}

async fn build_stores(settings: &AppSettings, policy: DependencyPolicy) -> Result<StorePorts> {
    let Some(url) = settings.database_url() else {
        warn!("no database url configured; state is kept in memory and lost on exit");
        return Ok(StorePorts::from_store(Arc::new(InMemoryStore::new())));
    };

    run_pending_migrations(url)
        .await
        .wrap_err("failed to migrate database")?;
    let config = PoolConfig::new(url)
        .with_max_size(settings.pool_max_size()?)
        .with_checkout_timeout(policy.timeout());
    let pool = DbPool::new(config)
        .await
        .wrap_err("failed to build database pool")?;
    Ok(store_ports(pool))
}
