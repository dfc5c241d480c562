use actix_web::{App, HttpServer, web};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod model;
mod service;

use app::AppState;
use model::Config;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr();

    let state = AppState::new(config)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let news_service = web::Data::new(state.news_service);
    let cache = web::Data::new(state.cache);

    tracing::info!("Starting newscheck server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(news_service.clone())
            .app_data(cache.clone())
            .app_data(api::json_config())
            .app_data(api::query_config())
            .configure(api::verify::configure)
            .configure(api::feeds::configure)
            .configure(api::keys::configure)
            .configure(api::health::configure)
            .configure(api::openapi::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
