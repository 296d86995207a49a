use axum::Json;
use utoipa::OpenApi;
use utoipa_swagger_ui::{Config, SwaggerUi};

use crate::handlers::todo_items;
use crate::models::{TodoItem, TodoItemPayload};

#[derive(OpenApi)]
#[openapi(
    info(title = "TodoApi", version = "v1"),
    paths(
        todo_items::list_todo_items,
        todo_items::get_todo_item,
        todo_items::create_todo_item,
        todo_items::update_todo_item,
        todo_items::delete_todo_item,
    ),
    components(schemas(TodoItem, TodoItemPayload)),
    tags((name = "TodoItems", description = "Todo item management"))
)]
pub struct ApiDoc;

pub const OPENAPI_PATH: &str = "/swagger/v1/swagger.json";
pub const SWAGGER_UI_PATH: &str = "/swagger-ui";

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Swagger UI pages. The browser fetches the document itself, so its URL
/// has to include the base path the router is nested under.
pub fn swagger_ui(base_path: &str) -> SwaggerUi {
    SwaggerUi::new(SWAGGER_UI_PATH).config(Config::new([format!("{base_path}{OPENAPI_PATH}")]))
}
