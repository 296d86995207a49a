pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use db::TodoContext;

#[derive(Clone)]
pub struct AppState {
    pub db: TodoContext,
    pub base_path: Arc<String>,
    /// Serve the OpenAPI document and Swagger UI (development only).
    pub expose_docs: bool,
}

pub fn create_app(state: AppState) -> Router {
    let base_path = state.base_path.clone();

    let mut app_routes: Router<AppState> = Router::new()
        .route("/api/todoitems", get(handlers::todo_items::list_todo_items))
        .route("/api/todoitems", post(handlers::todo_items::create_todo_item))
        .route("/api/todoitems/{id}", get(handlers::todo_items::get_todo_item))
        .route(
            "/api/todoitems/{id}",
            put(handlers::todo_items::update_todo_item),
        )
        .route(
            "/api/todoitems/{id}",
            delete(handlers::todo_items::delete_todo_item),
        );

    if state.expose_docs {
        app_routes = app_routes
            .route(handlers::docs::OPENAPI_PATH, get(handlers::docs::openapi_json))
            .merge(handlers::docs::swagger_ui(&state.base_path));
    }

    let app_routes = app_routes
        .layer(
            tower::ServiceBuilder::new()
                .layer(tower_http::trace::TraceLayer::new_for_http())
                .layer(tower_http::compression::CompressionLayer::new()),
        )
        .with_state(state);

    tracing::info!("base_path: {base_path:?}");

    if base_path.is_empty() {
        app_routes
    } else {
        Router::new().nest(&*base_path, app_routes)
    }
}
