use actix_web::{web, HttpServer};
use anyhow::Context;
use log::info;
use std::sync::Arc;
use std::time::Duration;

use pv_api::app::{create_app, AppState};
use pv_api::config::{load_config, service_config};
use pv_core::repositories::{CodeStore, UserDirectory};
use pv_core::services::{ClientRateLimiter, DeliveryChannel, VerificationService};
use pv_infra::{
    spawn_expiry_sweeper, InMemoryCodeStore, InMemoryRateLimiter, InMemoryUserDirectory,
    LoggingDeliveryChannel, MySqlUserDirectory, RedisClient, RedisCodeStore, RedisRateLimiter,
    TwilioDeliveryChannel,
};
use pv_shared::config::{
    AppConfig, DeliveryProvider, DirectoryBackend, Environment, LoggingConfig, StoreBackend,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();
    dotenvy::from_filename(environment.env_file()).ok();
    dotenvy::dotenv().ok();

    let config = load_config().context("Failed to load configuration")?;
    init_logging(&config.logging);

    info!("Starting phone verification API ({})", config.environment);

    let service_config = service_config(&config);
    let validity_minutes = service_config.validity_minutes();
    let ledger_retention = service_config.resend_cooldown();

    let (store, rate_limiter) = build_store(&config, ledger_retention).await?;
    let delivery = build_delivery(&config, validity_minutes)?;
    let directory = build_directory(&config).await?;

    let verification = Arc::new(VerificationService::new(
        store,
        delivery,
        directory,
        service_config,
    ));
    let state = web::Data::new(AppState::new(verification, rate_limiter, &config));

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let mut server = HttpServer::new(move || create_app(state.clone()))
        .keep_alive(Duration::from_secs(config.server.keep_alive));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await
        .context("Server terminated with an error")
}

fn init_logging(config: &LoggingConfig) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.level.as_str()),
    );
    builder.format_module_path(config.module_path);
    if !config.timestamp {
        builder.format_timestamp(None);
    }
    // A logger may already be installed when embedded
    let _ = builder.try_init();
}

async fn build_store(
    config: &AppConfig,
    ledger_retention: chrono::Duration,
) -> anyhow::Result<(Arc<dyn CodeStore>, Arc<dyn ClientRateLimiter>)> {
    match config.cache.backend {
        StoreBackend::Memory => {
            info!("Using in-memory code store and rate limiter");
            let store: Arc<dyn CodeStore> = Arc::new(InMemoryCodeStore::new(ledger_retention));
            let _sweeper = spawn_expiry_sweeper(
                store.clone(),
                Duration::from_secs(config.cache.sweep_interval_seconds.max(1)),
            );
            Ok((store, Arc::new(InMemoryRateLimiter::new())))
        }
        StoreBackend::Redis => {
            info!("Using Redis code store and rate limiter");
            let client = RedisClient::connect(&config.cache.url)
                .await
                .context("Failed to connect to Redis")?;
            let store = RedisCodeStore::new(client.clone(), &config.cache.key_prefix, ledger_retention);
            let limiter = RedisRateLimiter::new(client, &config.cache.key_prefix);
            Ok((Arc::new(store), Arc::new(limiter)))
        }
    }
}

fn build_delivery(
    config: &AppConfig,
    validity_minutes: i64,
) -> anyhow::Result<Arc<dyn DeliveryChannel>> {
    match config.delivery.provider {
        DeliveryProvider::Mock => {
            info!("Using logging delivery channel; codes are not sent");
            Ok(Arc::new(LoggingDeliveryChannel::new(validity_minutes)))
        }
        DeliveryProvider::Twilio => {
            let channel = TwilioDeliveryChannel::new(config.delivery.twilio.clone(), validity_minutes)
                .context("Failed to configure Twilio delivery")?;
            Ok(Arc::new(channel))
        }
    }
}

async fn build_directory(config: &AppConfig) -> anyhow::Result<Arc<dyn UserDirectory>> {
    match config.directory.backend {
        DirectoryBackend::Memory => {
            info!("Using in-memory user directory");
            Ok(Arc::new(InMemoryUserDirectory::new()))
        }
        DirectoryBackend::Mysql => {
            let directory = MySqlUserDirectory::connect(&config.directory)
                .await
                .context("Failed to connect to the user directory database")?;
            Ok(Arc::new(directory))
        }
    }
}
