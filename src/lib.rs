pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod debug;
pub mod error;
pub mod media;
pub mod messaging;

use actix_web::{web, HttpResponse};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::{AuthService, Credentials, Session};
pub use db::{CatalogStore, FixtureStore, PgStore, SchemaInspector, UserStore};
pub use media::{CloudinaryClient, MediaHost};
pub use messaging::MessagingStub;

use db::schema::check_schema;

/// Upper bound for JSON bodies outside the upload routes.
const JSON_BODY_LIMIT: usize = 256 * 1024;

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub auth: Arc<AuthService>,
    pub catalog: Arc<dyn CatalogStore>,
    pub schema: Arc<dyn SchemaInspector>,
    pub media: Arc<dyn MediaHost>,
    pub messaging: Arc<MessagingStub>,
}

impl AppState {
    /// Build the state described by `config`: Postgres (schema-checked) or the
    /// demo fixture store, plus the Cloudinary client.
    pub async fn new(config: Settings) -> Result<Self> {
        config.validate()?;
        let media: Arc<dyn MediaHost> = Arc::new(CloudinaryClient::new(&config.media)?);

        if config.database.fixture {
            warn!("Serving from the in-memory fixture store");
            let store = Arc::new(FixtureStore::demo()?);
            return Self::with_store(config, store, media).primed().await;
        }

        let store = PgStore::new_with_options(
            &config.database.url,
            config.database.max_connections,
            Duration::from_secs(config.database.acquire_timeout_secs),
        )
        .await?;
        info!("Connected to database");

        if config.database.run_migrations {
            store.migrate().await?;
            info!("Migrations applied");
        }

        let report = check_schema(&store).await?;
        if let Err(drift) = report.into_result() {
            if config.database.enforce_schema {
                return Err(drift.into());
            }
            warn!("Starting despite {}", drift);
        }

        Self::with_store(config, Arc::new(store), media).primed().await
    }

    async fn primed(self) -> Result<Self> {
        self.auth.prime().await?;
        Ok(self)
    }

    /// Wire every store seam to one backing store.
    pub fn with_store<S>(config: Settings, store: Arc<S>, media: Arc<dyn MediaHost>) -> Self
    where
        S: UserStore + CatalogStore + SchemaInspector + 'static,
    {
        let auth = AuthService::new(
            store.clone(),
            config.auth.jwt_secret.clone(),
            config.auth.token_expiry_hours,
        );

        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            catalog: store.clone(),
            schema: store,
            media,
            messaging: Arc::new(MessagingStub::new()),
        }
    }
}

fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            warn!("Rejected request body: {}", err);
            AppError::validation("Invalid request body").into()
        })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        warn!("Rejected query string: {}", err);
        AppError::validation("Invalid query parameters").into()
    })
}

/// Mount every route. Diagnostics are only added when `debug_routes` is set.
pub fn configure_routes(cfg: &mut web::ServiceConfig, debug_routes: bool) {
    use auth::handlers::{login, me, passport_login, signup};
    use catalog::handlers::{get_vendor, list_event_types, list_events, list_vendors};
    use media::handlers::{delete_image, upload_image, upload_images, UPLOAD_BODY_LIMIT};
    use messaging::handlers::send_message;

    let mut api = web::scope("/api")
        .route("/auth/login", web::post().to(login))
        .route("/auth/passport-login", web::post().to(passport_login))
        .route("/auth/signup", web::post().to(signup))
        .route("/auth/me", web::get().to(me))
        .route("/events", web::get().to(list_events))
        .route("/event-types", web::get().to(list_event_types))
        .route("/vendors", web::get().to(list_vendors))
        .route("/vendors/{id}", web::get().to(get_vendor))
        .service(
            web::resource("/upload")
                .app_data(json_config(UPLOAD_BODY_LIMIT))
                .route(web::post().to(upload_image)),
        )
        .service(
            web::resource("/upload/batch")
                .app_data(json_config(UPLOAD_BODY_LIMIT))
                .route(web::post().to(upload_images)),
        )
        .route("/upload/{public_id:.*}", web::delete().to(delete_image))
        .route("/whatsapp/send", web::post().to(send_message));

    if debug_routes {
        api = api
            .route("/check-schema", web::get().to(debug::check_schema))
            .route("/debug-columns", web::get().to(debug::debug_columns))
            .route("/debug-vendors", web::get().to(debug::debug_vendors))
            .route("/debug-events", web::get().to(debug::debug_events));
    }

    cfg.app_data(json_config(JSON_BODY_LIMIT))
        .app_data(query_config())
        .route("/health", web::get().to(health_check))
        .service(api);
}
