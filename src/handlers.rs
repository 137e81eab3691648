use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use crate::auth;
use crate::db::Database;
use crate::error::ApiError;
use crate::filters::TodoFilters;
use crate::notify::TodoEvent;
use crate::serializers::{TodoOut, TodoWrite};
use crate::AppState;

pub async fn list_todos(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<TodoFilters>, QueryRejection>,
) -> Result<Json<Vec<TodoOut>>, ApiError> {
    let user = auth::authenticate(&headers)?;
    let Query(filters) = query.map_err(|err| ApiError::MalformedQuery(err.body_text()))?;
    let db = Database::connect(&state.db_path)?;
    let todos = db.list_todos(&user, &filters)?;
    Ok(Json(todos.into_iter().map(TodoOut::from).collect()))
}

pub async fn create_todo(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<TodoWrite>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoOut>), ApiError> {
    let user = auth::authenticate(&headers)?;
    let Json(payload) = payload.map_err(|err| ApiError::BadRequest(err.body_text()))?;
    let input = payload.validate()?;
    let db = Database::connect(&state.db_path)?;
    let todo = TodoOut::from(db.create_todo(&user, &input)?);
    tracing::info!(user = %user, id = todo.id, "created todo");
    let _ = state.events.send(TodoEvent::Created { todo: todo.clone() });
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn retrieve_todo(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<TodoOut>, ApiError> {
    let user = auth::authenticate(&headers)?;
    let db = Database::connect(&state.db_path)?;
    let todo = db.get_todo(&user, id)?.ok_or(ApiError::NotFound)?;
    Ok(Json(todo.into()))
}

pub async fn update_todo(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    payload: Result<Json<TodoWrite>, JsonRejection>,
) -> Result<Json<TodoOut>, ApiError> {
    let user = auth::authenticate(&headers)?;
    let Json(payload) = payload.map_err(|err| ApiError::BadRequest(err.body_text()))?;
    let db = Database::connect(&state.db_path)?;
    // missing or foreign rows 404 before payload validation
    db.get_todo(&user, id)?.ok_or(ApiError::NotFound)?;
    let input = payload.validate()?;
    let todo = db
        .update_todo(&user, id, &input)?
        .map(TodoOut::from)
        .ok_or(ApiError::NotFound)?;
    tracing::info!(user = %user, id = todo.id, "updated todo");
    let _ = state.events.send(TodoEvent::Updated { todo: todo.clone() });
    Ok(Json(todo))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let user = auth::authenticate(&headers)?;
    let db = Database::connect(&state.db_path)?;
    if !db.delete_todo(&user, id)? {
        return Err(ApiError::NotFound);
    }
    tracing::info!(user = %user, id, "deleted todo");
    let _ = state.events.send(TodoEvent::Deleted { id, user });
    Ok(StatusCode::NO_CONTENT)
}
