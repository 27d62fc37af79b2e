use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use crate::config::ServerConfig;
use crate::notes::{HierarchyReader, HierarchyWriter};
use crate::store::StoreClient;
use crate::structuring::Structurer;

pub mod routes;

/// Server state, shared by every request
pub struct AppState {
    pub writer: HierarchyWriter,
    pub reader: HierarchyReader,
    pub structurer: Arc<dyn Structurer>,
}

impl AppState {
    pub fn new(store: StoreClient, structurer: Arc<dyn Structurer>) -> Self {
        Self {
            writer: HierarchyWriter::new(store.clone()),
            reader: HierarchyReader::new(store),
            structurer,
        }
    }
}

/// All API routes, without static files
pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/read-file", post(routes::read_file))
        .route("/store", post(routes::store_notes))
        .route("/api/health", get(routes::health))
        .route("/api/classes", get(routes::get_classes))
        .route("/api/topics/{class_id}", get(routes::get_topics))
        .route("/api/notes/{topic_id}", get(routes::get_notes))
        .route("/api/class_hierarchy/{class_id}", get(routes::get_class_hierarchy))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let mut app = router(state, config.max_upload_bytes);

    if let Some(dir) = &config.static_dir {
        if std::path::Path::new(dir).is_dir() {
            app = app.fallback_service(ServeDir::new(dir));
        } else {
            tracing::warn!("Static directory '{}' does not exist; serving API only", dir);
        }
    }

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Starting server on {}", addr);
    println!("🌍 Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
