pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::GalleryConfig;
use crate::infrastructure::{database, storage};
use crate::services::asset_store::AssetStore;
use crate::services::catalog::SeaOrmCatalog;
use crate::services::codec::ImageCodec;
use crate::services::gallery::GalleryService;
use axum::{
    Router,
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::pictures::upload::create_picture,
        api::handlers::pictures::upload::update_picture,
        api::handlers::pictures::upload::update_picture_form,
        api::handlers::pictures::manage::delete_picture,
        api::handlers::pictures::manage::delete_picture_json,
        api::handlers::pictures::list::list_pictures,
        api::handlers::pictures::list::picture_facets,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::pictures::PictureUploadForm,
            api::handlers::pictures::CreatePictureResponse,
            api::handlers::pictures::UpdatePictureResponse,
            api::handlers::pictures::UpdatedParts,
            api::handlers::pictures::DeletePictureRequest,
            api::handlers::pictures::DeletePictureResponse,
            services::gallery::PictureRecord,
            services::catalog::Facets,
            services::variant_set::VariantSet,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "pictures", description = "Picture gallery endpoints"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub assets: Arc<dyn AssetStore>,
    pub gallery: Arc<GalleryService>,
    pub config: GalleryConfig,
}

/// Connects the database, prepares the upload directory and wires the
/// production codec, catalog and asset store together.
pub async fn setup_state(config: GalleryConfig) -> anyhow::Result<AppState> {
    let db = database::setup_database(&config).await?;
    let assets: Arc<dyn AssetStore> = storage::setup_storage(&config).await?;

    let gallery = Arc::new(GalleryService::new(
        Arc::new(SeaOrmCatalog::new(db.clone())),
        assets.clone(),
        Arc::new(ImageCodec),
        config.clone(),
    ));

    Ok(AppState {
        db,
        assets,
        gallery,
        config,
    })
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/pictures",
            get(api::handlers::pictures::list_pictures)
                .post(api::handlers::pictures::create_picture),
        )
        .route("/pictures/facets", get(api::handlers::pictures::picture_facets))
        .route(
            "/pictures/update",
            post(api::handlers::pictures::update_picture_form),
        )
        .route(
            "/pictures/delete",
            post(api::handlers::pictures::delete_picture_json),
        )
        .route(
            "/pictures/:id",
            delete(api::handlers::pictures::delete_picture)
                .put(api::handlers::pictures::update_picture),
        )
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            state.config.max_file_size + 10 * 1024 * 1024, // Add 10MB buffer for multipart overhead
        ))
        .with_state(state)
}
