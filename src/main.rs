use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use marketplace_server::{configure_routes, AppError, AppState, Settings};
use std::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn cors_for(config: &Settings) -> Cors {
    if !config.cors.enabled {
        // CORS disabled - use most restrictive settings
        return Cors::default();
    }

    let cors = if config.cors.allow_any_origin {
        Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
    } else {
        config
            .cors
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "DELETE"])
            .allowed_headers(vec!["Authorization", "Content-Type"])
            .supports_credentials()
    };

    cors.max_age(config.cors.max_age as usize)
}

#[actix_web::main]
async fn main() -> marketplace_server::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    // Load configuration
    let config = Settings::new()?;
    info!("Configuration loaded for {} environment", config.environment);

    config.validate()?;
    if config.debug.enabled {
        warn!("Debug endpoints are enabled; they expose schema and row contents");
    }

    // Initialize application state
    let state = web::Data::new(AppState::new(config.clone()).await?);

    // Create and bind TCP listener
    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))?;
    info!("Starting server at http://{}:{}", config.server.host, config.server.port);

    let debug_routes = config.debug.enabled;
    let server_config = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(cors_for(&server_config))
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(|cfg| configure_routes(cfg, debug_routes))
    })
    .listen(listener)?
    .workers(config.server.workers as usize)
    .run()
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(())
}
