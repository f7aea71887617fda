//! Resource services: each operation runs in its own retryable transaction.

mod products;
mod users;

pub use products::ProductsService;
pub use users::UsersService;

use crate::error::AppError;

/// Reject the first blank field (empty or whitespace-only).
fn require_non_blank(fields: &[(&str, &str)]) -> Result<(), AppError> {
    for (name, value) in fields {
        if value.trim().is_empty() {
            return Err(AppError::BadRequest(format!("{} is required", name)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_rejected() {
        assert!(require_non_blank(&[("name", "Chair")]).is_ok());
        let err = require_non_blank(&[("name", "Chair"), ("material", "  ")]).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "material is required"));
    }
}
