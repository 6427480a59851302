//! Backend entry-point: loads settings, wires adapters, and serves the REST
//! API alongside the notification dispatcher.

mod server;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use qanda::config::AppSettings;
use qanda::domain::DispatcherConfig;
use qanda::domain::ports::TokenService;
use qanda::inbound::http::health::HealthState;
use qanda::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use qanda::outbound::queue::RabbitMqHttpQueue;
use qanda::outbound::search::MeilisearchIndex;
use qanda::outbound::token::HmacTokenService;

use server::{RunningServer, ServerConfig, create_server};

const BROKER_TIMEOUT: Duration = Duration::from_secs(10);

fn token_service(settings: &AppSettings) -> io::Result<Arc<dyn TokenService>> {
    let ttl = settings.token_ttl();
    match settings.token_secret().map_err(io::Error::other)? {
        Some(secret) => Ok(Arc::new(HmacTokenService::new(secret, ttl))),
        None => {
            warn!("QANDA_TOKEN_SECRET not set; using an ephemeral signing key (dev only)");
            Ok(Arc::new(HmacTokenService::ephemeral(ttl)))
        }
    }
}

async fn server_config(settings: &AppSettings) -> io::Result<ServerConfig> {
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let app_url = settings.app_url().map_err(io::Error::other)?;
    let mut config = ServerConfig::new(bind_addr, app_url, token_service(settings)?)
        .with_dispatcher(DispatcherConfig {
            poll_interval: settings.dispatcher_poll_interval(),
            ..DispatcherConfig::default()
        });

    match settings.database_url.as_deref() {
        Some(url) => {
            run_migrations(url).await.map_err(io::Error::other)?;
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .map_err(io::Error::other)?;
            pool.ping().await.map_err(io::Error::other)?;
            config = config.with_db_pool(pool);
        }
        None => warn!("QANDA_DATABASE_URL not set; data is kept in memory only"),
    }

    if let Some(broker) = settings.rabbitmq().map_err(io::Error::other)? {
        let queue = RabbitMqHttpQueue::new(broker, BROKER_TIMEOUT).map_err(io::Error::other)?;
        config = config.with_queue(Arc::new(queue));
    }

    if let Some(url) = settings.meilisearch_url.as_deref() {
        let index = MeilisearchIndex::new(url, settings.meilisearch_key.as_deref())
            .map_err(io::Error::other)?;
        config = config.with_search_index(Arc::new(index));
    }

    Ok(config)
}

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

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| io::Error::other(err.to_string()))?;
    let config = server_config(&settings).await?;

    let health_state = web::Data::new(HealthState::new());
    let RunningServer {
        server,
        dispatcher,
        shutdown,
    } = create_server(health_state.clone(), config)?;

    let result = server.await;

    health_state.mark_unhealthy();
    if shutdown.send(true).is_err() {
        warn!("notification dispatcher already stopped");
    }
    if let Err(error) = dispatcher.await {
        warn!(%error, "notification dispatcher task failed");
    }
    info!("server stopped");
    result
}
