use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use tracing::{info, warn};

use crate::error::AppError;
use crate::extract::{ItemId, Payload};
use crate::models::{TodoItem, TodoItemPayload};
use crate::AppState;

pub const ID_MISMATCH: &str = "ID in URL does not match ID in body.";

#[utoipa::path(
    get,
    path = "/api/todoitems",
    tag = "TodoItems",
    responses((status = 200, description = "All todo items", body = [TodoItem]))
)]
pub async fn list_todo_items(
    State(state): State<AppState>,
) -> Result<Json<Vec<TodoItem>>, AppError> {
    let items = state.db.list_all()?;
    info!(count = items.len(), "Listed todo items");
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/todoitems/{id}",
    tag = "TodoItems",
    params(("id" = i64, Path, description = "Todo item id")),
    responses(
        (status = 200, description = "The todo item", body = TodoItem),
        (status = 404, description = "No item with this id")
    )
)]
pub async fn get_todo_item(
    State(state): State<AppState>,
    ItemId(id): ItemId,
) -> Result<Json<TodoItem>, AppError> {
    match state.db.find_by_id(id)? {
        Some(item) => Ok(Json(item)),
        None => Err(AppError::NotFound),
    }
}

#[utoipa::path(
    post,
    path = "/api/todoitems",
    tag = "TodoItems",
    request_body = TodoItemPayload,
    responses(
        (status = 201, description = "Created", body = TodoItem,
            headers(("Location" = String, description = "URL of the new item"))),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_todo_item(
    State(state): State<AppState>,
    Payload(payload): Payload<TodoItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    let candidate = payload
        .validate(0)
        .inspect_err(|errors| warn!(?errors, "Rejected invalid todo item"))?;

    let item = state.db.insert(&candidate)?;
    info!(id = item.id, title = %item.title, "Created todo item");

    let location = format!("{}/api/todoitems/{}", state.base_path, item.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(item)))
}

#[utoipa::path(
    put,
    path = "/api/todoitems/{id}",
    tag = "TodoItems",
    params(("id" = i64, Path, description = "Todo item id")),
    request_body = TodoItemPayload,
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Id mismatch or validation failed"),
        (status = 404, description = "No item with this id")
    )
)]
pub async fn update_todo_item(
    State(state): State<AppState>,
    ItemId(id): ItemId,
    Payload(payload): Payload<TodoItemPayload>,
) -> Result<StatusCode, AppError> {
    if payload.id != id {
        warn!(path_id = id, body_id = payload.id, "Id mismatch on update");
        return Err(AppError::BadRequest(ID_MISMATCH.to_string()));
    }

    let item = payload
        .validate(id)
        .inspect_err(|errors| warn!(id, ?errors, "Rejected invalid todo item"))?;

    if state.db.update(&item)? {
        info!(id, completed = item.is_completed, "Updated todo item");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

#[utoipa::path(
    delete,
    path = "/api/todoitems/{id}",
    tag = "TodoItems",
    params(("id" = i64, Path, description = "Todo item id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No item with this id")
    )
)]
pub async fn delete_todo_item(
    State(state): State<AppState>,
    ItemId(id): ItemId,
) -> Result<StatusCode, AppError> {
    if state.db.delete(id)? {
        info!(id, "Deleted todo item");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
