use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use study_buddy_api::config::Config;
use study_buddy_api::handlers::not_found;
use study_buddy_api::middleware::CorsMiddleware;
use study_buddy_api::routes::api;
use study_buddy_api::services::AnswerService;
use study_buddy_api::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let answer_service = match AnswerService::from_config(&config).await {
        Ok(service) => service,
        Err(e) => {
            error!("Failed to initialize answer service: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Starting Study Buddy API on port {}",
        config.server.port
    );

    let state = AppState::new(config.clone(), answer_service);
    let cors_policy = state.answer_service.cors_policy();
    let payload_limit = config.server.max_json_payload_size;

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::PayloadConfig::new(payload_limit))
            .wrap(CorsMiddleware::new(cors_policy.clone()))
            .wrap(Logger::default())
            .configure(api::configure)
            .default_service(web::route().to(not_found))
    })
    .bind(format!("{}:{}", config.server.host, config.server.port))?;

    info!(
        "Server started successfully at http://{}:{}",
        config.server.host, config.server.port
    );

    server.workers(config.server.workers).run().await
}
