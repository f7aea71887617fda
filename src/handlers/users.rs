use super::parse_id;
use crate::error::AppError;
use crate::extractors::CaseInsensitiveJson;
use crate::models::User;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let users = state.users.list(&state.shutdown).await?;
    Ok(Json(users))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<Json<User>, AppError> {
    let id = parse_id(&id_str)?;
    let user = state.users.get(&state.shutdown, id).await?;
    Ok(Json(user))
}

pub async fn create(
    State(state): State<AppState>,
    CaseInsensitiveJson(payload): CaseInsensitiveJson<User>,
) -> Result<Json<User>, AppError> {
    let user = state.users.create(&state.shutdown, payload).await?;
    Ok(Json(user))
}

pub async fn update(
    State(state): State<AppState>,
    CaseInsensitiveJson(payload): CaseInsensitiveJson<User>,
) -> Result<StatusCode, AppError> {
    state.users.update(&state.shutdown, payload).await?;
    Ok(StatusCode::OK)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id_str)?;
    state.users.delete(&state.shutdown, id).await?;
    Ok(StatusCode::OK)
}
