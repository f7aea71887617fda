use super::parse_id;
use crate::error::AppError;
use crate::extractors::CaseInsensitiveJson;
use crate::models::Product;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    let products = state.products.list(&state.shutdown).await?;
    Ok(Json(products))
}

pub async fn read(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<Json<Product>, AppError> {
    let id = parse_id(&id_str)?;
    let product = state.products.get(&state.shutdown, id).await?;
    Ok(Json(product))
}

pub async fn create(
    State(state): State<AppState>,
    CaseInsensitiveJson(payload): CaseInsensitiveJson<Product>,
) -> Result<Json<Product>, AppError> {
    let product = state.products.create(&state.shutdown, payload).await?;
    Ok(Json(product))
}

pub async fn update(
    State(state): State<AppState>,
    CaseInsensitiveJson(payload): CaseInsensitiveJson<Product>,
) -> Result<StatusCode, AppError> {
    state.products.update(&state.shutdown, payload).await?;
    Ok(StatusCode::OK)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id_str)?;
    state.products.delete(&state.shutdown, id).await?;
    Ok(StatusCode::OK)
}
