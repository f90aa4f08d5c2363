//! Service bootstrap: storage, adapters, router and the HTTP listener.

use std::sync::Arc;

use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use axum::http::{HeaderValue, Method};
use thiserror::Error;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::adapters::brevo::{BrevoConfig, BrevoEmailSender};
use crate::adapters::http::{router, DonationAppState};
use crate::adapters::postgres::PostgresDonationLedger;
use crate::config::{AppConfig, ConfigError, ValidationError};
use crate::domain::webhook::{PaystackSignatureVerifier, StripeSignatureVerifier};

/// Failures that stop the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ValidationError> for StartupError {
    fn from(err: ValidationError) -> Self {
        StartupError::Config(ConfigError::ValidationFailed(err))
    }
}

pub async fn connect(config: &AppConfig) -> Result<PgPool, StartupError> {
    let db = &config.database;
    let pool = PgPoolOptions::new()
        .min_connections(db.min_connections)
        .max_connections(db.max_connections)
        .acquire_timeout(db.acquire_timeout())
        .idle_timeout(db.idle_timeout())
        .connect(&db.url)
        .await?;

    tracing::info!(max_connections = db.max_connections, "PostgreSQL pool created");

    if db.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Migrations applied");
    }

    Ok(pool)
}

/// Wires every adapter behind its port.
pub fn build_state(config: &AppConfig, pool: PgPool) -> DonationAppState {
    let ledger = PostgresDonationLedger::new(pool, config.campaign.id.clone(), config.campaign.goal())
        .with_retry_policy(config.database.retry_policy());

    let email = &config.email;
    if !email.is_configured() {
        tracing::warn!("Brevo credentials not configured; receipt emails will fail");
    }
    let notifier = BrevoEmailSender::new(
        BrevoConfig::new(email.brevo_api_key.clone(), email.sender_email.clone())
            .with_sender_name(email.sender_name.clone()),
    );

    let payment = &config.payment;
    DonationAppState {
        ledger: Arc::new(ledger),
        notifier: Arc::new(notifier),
        stripe_verifier: Arc::new(StripeSignatureVerifier::new(
            SecretString::new(payment.stripe_webhook_secret.clone()),
            payment.stripe_tolerance_secs,
        )),
        paystack_verifier: Arc::new(PaystackSignatureVerifier::new(SecretString::new(
            payment.paystack_secret_key.clone(),
        ))),
        branding: Arc::new(config.campaign.branding()),
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let allowed: Vec<_> = origins.iter().filter_map(|o| o.parse::<HeaderValue>().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST])
}

/// Runs the service until SIGINT/SIGTERM.
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    config.validate()?;
    let addr = config.server.socket_addr()?;

    if config.payment.is_test_mode() {
        tracing::info!("Stripe API key is a test key");
    }

    let pool = connect(&config).await?;
    let state = build_state(&config, pool);
    let app = router(state, config.server.request_timeout())
        .layer(cors_layer(&config.server.cors_origins_list()));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
