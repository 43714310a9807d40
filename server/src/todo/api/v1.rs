use crate::timestamp::{Timestamp, TimestampError};
use crate::todo::{ToDo, TodoService, TodoServiceError, TodoState};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// API version implemented by this server. Requests carrying an empty
/// version string are accepted as "current".
pub const API_VERSION: &str = "v1";

/// JSON response for API errors.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Classified error code: INVALID_ARGUMENT, NOT_FOUND, UNIMPLEMENTED, or INTERNAL
    pub error: String,
    /// Human-readable description including the offending identifier or value
    pub message: String,
}

impl ErrorResponse {
    fn new(error: &str, message: String) -> Self {
        Self {
            error: error.to_string(),
            message,
        }
    }
}

/// JSON representation of a to-do item on the wire.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToDoJson {
    /// Storage-assigned unique identifier
    pub id: i64,
    /// Short title of the item
    pub title: String,
    /// Optional free-text description
    pub description: Option<String>,
    /// Reminder instant in wire timestamp form
    pub reminder: Timestamp,
}

impl TryFrom<ToDo> for ToDoJson {
    type Error = TimestampError;

    fn try_from(todo: ToDo) -> Result<Self, TimestampError> {
        Ok(Self {
            id: todo.id(),
            title: todo.title().to_string(),
            description: todo.description().map(str::to_string),
            reminder: Timestamp::from_utc(todo.reminder())?,
        })
    }
}

/// Request payload for creating a to-do item.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTodoRequest {
    /// Requested API version; empty means "current"
    #[serde(default)]
    pub api: String,
    pub title: String,
    pub description: Option<String>,
    pub reminder: Timestamp,
}

/// Response payload for a created to-do item.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateTodoResponse {
    /// API version implemented by the server
    pub api: String,
    /// Identifier assigned to the new item by storage
    pub id: i64,
}

/// Request payload for reading a single to-do item.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReadTodoRequest {
    #[serde(default)]
    pub api: String,
    pub id: i64,
}

/// Response payload carrying a single to-do item.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadTodoResponse {
    pub api: String,
    pub to_do: ToDoJson,
}

/// Request payload for updating a to-do item. Title, description, and
/// reminder are overwritten wholesale; the identifier is immutable.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTodoRequest {
    #[serde(default)]
    pub api: String,
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub reminder: Timestamp,
}

/// Response payload for an update, reporting the affected row count.
#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateTodoResponse {
    pub api: String,
    pub updated: u64,
}

/// Request payload for deleting a to-do item.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteTodoRequest {
    #[serde(default)]
    pub api: String,
    pub id: i64,
}

/// Response payload for a delete, reporting the removed row count.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteTodoResponse {
    pub api: String,
    pub deleted: u64,
}

/// Request payload for listing every to-do item. No filter, no pagination.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReadAllTodosRequest {
    #[serde(default)]
    pub api: String,
}

/// Response payload carrying every to-do item in storage order.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadAllTodosResponse {
    pub api: String,
    pub to_dos: Vec<ToDoJson>,
}

/// Checks whether the API version requested by the client is supported by
/// the server. Runs before any other work, so a mismatched version never
/// touches the database.
fn check_api(api: &str) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    if !api.is_empty() && api != API_VERSION {
        return Err((
            StatusCode::NOT_IMPLEMENTED,
            Json(ErrorResponse::new(
                "UNIMPLEMENTED",
                format!(
                    "unsupported API version: service implements API version '{}' but asked for '{}'",
                    API_VERSION, api
                ),
            )),
        ));
    }
    Ok(())
}

/// Maps a service failure onto its classified status code and JSON body.
fn service_error_response(err: &TodoServiceError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        TodoServiceError::TodoNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("NOT_FOUND", err.to_string())),
        ),
        TodoServiceError::AmbiguousId(_) | TodoServiceError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("INTERNAL", err.to_string())),
        ),
    }
}

/// A reminder that cannot be converted from wire form is a client error.
fn invalid_reminder_response(err: &TimestampError) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(
            "INVALID_ARGUMENT",
            format!("reminder field has invalid format: {}", err),
        )),
    )
}

/// A stored reminder that cannot be converted to wire form indicates
/// corrupted state, not a client mistake.
fn corrupt_reminder_response(id: i64, err: &TimestampError) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(
            "INTERNAL",
            format!("stored reminder of to-do item with ID {} is invalid: {}", id, err),
        )),
    )
}

/// Handler for POST /api/v1/todos/create - Inserts a new to-do item.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/v1/todos/create",
    request_body = CreateTodoRequest,
    responses(
        (status = 200, description = "Item created", body = CreateTodoResponse),
        (status = 400, description = "Invalid reminder timestamp", body = ErrorResponse),
        (status = 501, description = "Unsupported API version", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn create_todo_handler(
    State(state): State<Arc<TodoState>>,
    Json(payload): Json<CreateTodoRequest>,
) -> Result<Json<CreateTodoResponse>, (StatusCode, Json<ErrorResponse>)> {
    check_api(&payload.api)?;

    let reminder = payload
        .reminder
        .to_utc()
        .map_err(|err| invalid_reminder_response(&err))?;

    let service = TodoService::new(&state.db);
    match service
        .create_todo(payload.title, payload.description, reminder)
        .await
    {
        Ok(todo) => Ok(Json(CreateTodoResponse {
            api: API_VERSION.to_string(),
            id: todo.id(),
        })),
        Err(err) => {
            tracing::error!("Failed to create to-do item: {}", err);
            Err(service_error_response(&err))
        }
    }
}

/// Handler for POST /api/v1/todos/read - Returns one to-do item by ID.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/v1/todos/read",
    request_body = ReadTodoRequest,
    responses(
        (status = 200, description = "Item found", body = ReadTodoResponse),
        (status = 404, description = "No item with the given ID", body = ErrorResponse),
        (status = 501, description = "Unsupported API version", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn read_todo_handler(
    State(state): State<Arc<TodoState>>,
    Json(payload): Json<ReadTodoRequest>,
) -> Result<Json<ReadTodoResponse>, (StatusCode, Json<ErrorResponse>)> {
    check_api(&payload.api)?;

    let service = TodoService::new(&state.db);
    match service.get_todo_by_id(payload.id).await {
        Ok(todo) => {
            let id = todo.id();
            let to_do =
                ToDoJson::try_from(todo).map_err(|err| corrupt_reminder_response(id, &err))?;
            Ok(Json(ReadTodoResponse {
                api: API_VERSION.to_string(),
                to_do,
            }))
        }
        Err(err) => {
            tracing::error!("Failed to read to-do item {}: {}", payload.id, err);
            Err(service_error_response(&err))
        }
    }
}

/// Handler for POST /api/v1/todos/update - Overwrites an item's fields.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/v1/todos/update",
    request_body = UpdateTodoRequest,
    responses(
        (status = 200, description = "Item updated", body = UpdateTodoResponse),
        (status = 400, description = "Invalid reminder timestamp", body = ErrorResponse),
        (status = 404, description = "No item with the given ID", body = ErrorResponse),
        (status = 501, description = "Unsupported API version", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn update_todo_handler(
    State(state): State<Arc<TodoState>>,
    Json(payload): Json<UpdateTodoRequest>,
) -> Result<Json<UpdateTodoResponse>, (StatusCode, Json<ErrorResponse>)> {
    check_api(&payload.api)?;

    let reminder = payload
        .reminder
        .to_utc()
        .map_err(|err| invalid_reminder_response(&err))?;

    let service = TodoService::new(&state.db);
    match service
        .update_todo(payload.id, payload.title, payload.description, reminder)
        .await
    {
        Ok(updated) => Ok(Json(UpdateTodoResponse {
            api: API_VERSION.to_string(),
            updated,
        })),
        Err(err) => {
            tracing::error!("Failed to update to-do item {}: {}", payload.id, err);
            Err(service_error_response(&err))
        }
    }
}

/// Handler for POST /api/v1/todos/delete - Removes one to-do item by ID.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/v1/todos/delete",
    request_body = DeleteTodoRequest,
    responses(
        (status = 200, description = "Item deleted", body = DeleteTodoResponse),
        (status = 404, description = "No item with the given ID", body = ErrorResponse),
        (status = 501, description = "Unsupported API version", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn delete_todo_handler(
    State(state): State<Arc<TodoState>>,
    Json(payload): Json<DeleteTodoRequest>,
) -> Result<Json<DeleteTodoResponse>, (StatusCode, Json<ErrorResponse>)> {
    check_api(&payload.api)?;

    let service = TodoService::new(&state.db);
    match service.delete_todo_by_id(payload.id).await {
        Ok(deleted) => Ok(Json(DeleteTodoResponse {
            api: API_VERSION.to_string(),
            deleted,
        })),
        Err(err) => {
            tracing::error!("Failed to delete to-do item {}: {}", payload.id, err);
            Err(service_error_response(&err))
        }
    }
}

/// Handler for POST /api/v1/todos/read-all - Returns every to-do item.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/v1/todos/read-all",
    request_body = ReadAllTodosRequest,
    responses(
        (status = 200, description = "All items retrieved", body = ReadAllTodosResponse),
        (status = 501, description = "Unsupported API version", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Todos"
)]
pub async fn read_all_todos_handler(
    State(state): State<Arc<TodoState>>,
    Json(payload): Json<ReadAllTodosRequest>,
) -> Result<Json<ReadAllTodosResponse>, (StatusCode, Json<ErrorResponse>)> {
    check_api(&payload.api)?;

    let service = TodoService::new(&state.db);
    match service.get_all_todos().await {
        Ok(todos) => {
            let mut to_dos = Vec::with_capacity(todos.len());
            for todo in todos {
                let id = todo.id();
                let json =
                    ToDoJson::try_from(todo).map_err(|err| corrupt_reminder_response(id, &err))?;
                to_dos.push(json);
            }
            Ok(Json(ReadAllTodosResponse {
                api: API_VERSION.to_string(),
                to_dos,
            }))
        }
        Err(err) => {
            tracing::error!("Failed to read all to-do items: {}", err);
            Err(service_error_response(&err))
        }
    }
}

/// Creates and returns the to-do API router, one POST route per operation.
pub fn create_api_router(state: Arc<TodoState>) -> Router {
    Router::new()
        .route("/todos/create", post(create_todo_handler))
        .route("/todos/read", post(read_todo_handler))
        .route("/todos/update", post(update_todo_handler))
        .route("/todos/delete", post(delete_todo_handler))
        .route("/todos/read-all", post(read_all_todos_handler))
        .with_state(state)
}
