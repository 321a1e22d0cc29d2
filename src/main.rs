use actix_cors::Cors;
use actix_web::{http::header, App, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use quotely::config::{AppConfig, Config};
use quotely::middleware::RequestId;
use quotely::AppState;

fn init_tracing(app: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("quotely={},actix_web=info,sqlx=warn", app.log_level))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if app.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    init_tracing(&config.app);

    tracing::info!(env = %config.app.env, "Starting quotation service");

    let pool = config
        .database
        .create_pool()
        .await
        .context("Failed to create database pool")?;

    tracing::info!(
        min_connections = config.database.pool_size,
        max_connections = config.database.max_connections,
        "Database pool initialized"
    );

    if config.database.run_migrations {
        config
            .database
            .migrate(&pool)
            .await
            .context("Failed to run migrations")?;
        tracing::info!("Migrations applied");
    }

    let state = AppState::from_pool(pool, &config.pdf);
    let frontend_url = config.server.frontend_url.clone();
    let bind_address = config.server.bind_address();

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_url)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
            .allowed_header("x-request-id")
            .expose_headers(vec![header::CONTENT_DISPOSITION])
            .max_age(3600);

        let state = state.clone();
        App::new()
            .wrap(RequestId)
            .wrap(TracingLogger::default())
            .wrap(cors)
            .configure(move |cfg| state.configure(cfg))
    })
    .workers(config.server.workers)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    tracing::info!(address = %bind_address, "Server started");

    server.await.context("Server error")
}
