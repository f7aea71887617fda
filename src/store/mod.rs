//! Store port: how the gateway talks to a transactional backend.
//!
//! A [`Store`] hands out [`StoreTx`] transactions. Every read and write goes
//! through a transaction; nothing is visible to other transactions until
//! [`StoreTx::commit`]. Dropping a transaction without committing discards it.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, PgStore};

use crate::error::AppError;
use crate::models::{EntityKind, Product, User};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, AppError>;

    /// Create missing tables. Never alters existing ones.
    async fn ensure_schema(&self) -> Result<(), AppError>;

    /// Cheap round trip used by readiness checks.
    async fn ping(&self) -> Result<(), AppError>;
}

#[async_trait]
pub trait StoreTx: Send {
    async fn count(&mut self, kind: EntityKind) -> Result<i64, AppError>;

    async fn list_users(&mut self) -> Result<Vec<User>, AppError>;
    async fn find_user(&mut self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_user_by_login(&mut self, login: &str) -> Result<Option<User>, AppError>;
    async fn insert_user(&mut self, user: &User) -> Result<User, AppError>;
    /// Returns the stored row, or `None` when no row has `user.id`.
    async fn update_user(&mut self, user: &User) -> Result<Option<User>, AppError>;
    /// Returns whether a row was removed.
    async fn delete_user(&mut self, id: Uuid) -> Result<bool, AppError>;

    async fn list_products(&mut self) -> Result<Vec<Product>, AppError>;
    async fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, AppError>;
    async fn insert_product(&mut self, product: &Product) -> Result<Product, AppError>;
    async fn update_product(&mut self, product: &Product) -> Result<Option<Product>, AppError>;
    async fn delete_product(&mut self, id: Uuid) -> Result<bool, AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;
    async fn rollback(self: Box<Self>) -> Result<(), AppError>;
}
