//! HTTP handlers for the Users and Products resources.

pub mod products;
pub mod users;

use crate::error::AppError;
use uuid::Uuid;

fn parse_id(id_str: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id_str).map_err(|_| AppError::BadRequest(format!("invalid uuid: {}", id_str)))
}
