//! Salon Deals API server

use std::process;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use salon_deals::adapters::auth::JwtSessionValidator;
use salon_deals::adapters::email::{ResendConfig, ResendEmailSender};
use salon_deals::adapters::http::{api_router, AppState};
use salon_deals::adapters::postgres::{
    PostgresCodeReader, PostgresDealRepository, PostgresDiscountCodeRepository,
    PostgresSalonRepository,
};
use salon_deals::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use salon_deals::application::handlers::{GenerationSettings, NotificationDispatcher};
use salon_deals::config::{AppConfig, ServerConfig};

#[tokio::main]
async fn main() {
    let config = AppConfig::load()
        .map_err(|e| e.to_string())
        .and_then(|config| config.validate().map(|_| config).map_err(|e| e.to_string()))
        .unwrap_or_else(|e| {
            // Logging is not initialized yet
            eprintln!("Configuration error: {e}");
            process::exit(1);
        });

    init_tracing(&config.server);

    if let Err(e) = run(config).await {
        error!(error = %e, "Server terminated");
        process::exit(1);
    }
}

fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&server.log_level));
    if server.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Connecting to database...");
    let pool = config.database.connect().await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Migrations applied");
    }

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.server.request_timeout_secs))
        .build()?;

    let stripe = StripeConfig::new(
        config.payment.stripe_api_key.clone(),
        config.payment.stripe_webhook_secret.clone(),
    )
    .with_currency(config.payment.currency.clone())
    .with_require_livemode(config.payment.require_livemode);

    let email = ResendEmailSender::new(
        ResendConfig::new(config.email.resend_api_key.clone(), config.email.from_header())
            .with_timeout(config.email.http_timeout()),
    )?;
    let dispatcher = NotificationDispatcher::new(Arc::new(email), config.email.retry_policy());

    let state = AppState {
        sessions: Arc::new(JwtSessionValidator::new(config.auth.jwt_config())),
        salons: Arc::new(PostgresSalonRepository::new(pool.clone())),
        deals: Arc::new(PostgresDealRepository::new(pool.clone())),
        codes: Arc::new(PostgresDiscountCodeRepository::new(pool.clone())),
        reader: Arc::new(PostgresCodeReader::new(pool)),
        payments: Arc::new(StripePaymentAdapter::new(stripe, http_client)),
        dispatcher: Arc::new(dispatcher),
        generation: GenerationSettings {
            batch_size: config.codes.batch_size,
            batch_delay: config.codes.batch_delay(),
            max_quantity: config.codes.max_quantity,
        },
        public_base_url: config.server.public_base_url.clone(),
    };

    let app = api_router(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors_layer(&config.server))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
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
}
