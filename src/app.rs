use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    config::{AppConfig, PaginationConfig},
    database,
    error::Result,
    routes,
    services::image_store::ImageStore,
};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub images: ImageStore,
    pub jwt_secret: Arc<str>,
    pub pagination: PaginationConfig,
}

impl AppState {
    pub fn new(db: PgPool, images: ImageStore, jwt_secret: &str, pagination: PaginationConfig) -> Self {
        Self {
            db,
            images,
            jwt_secret: Arc::from(jwt_secret),
            pagination,
        }
    }
}

/// Routes plus uploaded-file serving, without transport concerns.
pub fn router(state: AppState) -> Router {
    let mut app = routes::create_router(state.clone());

    let prefix = state.images.url_prefix();
    if prefix.starts_with('/') && prefix.len() > 1 {
        app = app.nest_service(prefix, ServeDir::new(state.images.root()));
    }

    app.with_state(state)
}

pub async fn build(config: &AppConfig) -> Result<Router> {
    let pool = database::create_pool(&config.database).await?;
    let state = AppState::new(
        pool,
        ImageStore::from_config(&config.upload),
        &config.auth.jwt_secret,
        config.pagination,
    );

    let allowed_origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .map(|origin| {
            origin.parse::<HeaderValue>().map_err(|_| {
                crate::error::AppError::ConfigError(format!("Invalid CORS origin: {}", origin))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
        .allow_origin(allowed_origins);

    let app = router(state)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    Ok(app)
}
