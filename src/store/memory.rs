//! In-process store. Transactions take an exclusive lock and work on a copy of
//! the tables; the copy replaces the committed state only on commit.

use super::{Store, StoreTx};
use crate::error::AppError;
use crate::models::{EntityKind, Product, User};
use async_trait::async_trait;
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
struct Tables {
    users: Vec<User>,
    products: Vec<Product>,
}

#[derive(Default)]
struct Counters {
    begins: AtomicU32,
    commits: AtomicU32,
    rollbacks: AtomicU32,
    failing_commits: AtomicU32,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    counters: Arc<Counters>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` commits fail with a connection reset.
    pub fn fail_next_commits(&self, n: u32) {
        self.counters.failing_commits.store(n, Ordering::SeqCst);
    }

    pub fn begins(&self) -> u32 {
        self.counters.begins.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> u32 {
        self.counters.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> u32 {
        self.counters.rollbacks.load(Ordering::SeqCst)
    }

    /// Committed users, outside any transaction.
    pub async fn users(&self) -> Vec<User> {
        self.tables.lock().await.users.clone()
    }

    /// Committed products, outside any transaction.
    pub async fn products(&self) -> Vec<Product> {
        self.tables.lock().await.products.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, AppError> {
        let committed = Arc::clone(&self.tables).lock_owned().await;
        let working = committed.clone();
        self.counters.begins.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryTx {
            committed,
            working,
            counters: Arc::clone(&self.counters),
        }))
    }

    async fn ensure_schema(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

struct MemoryTx {
    committed: OwnedMutexGuard<Tables>,
    working: Tables,
    counters: Arc<Counters>,
}

fn upsert_in<T: Clone>(rows: &mut [T], id_of: impl Fn(&T) -> Uuid, row: &T) -> Option<T> {
    let id = id_of(row);
    let pos = rows.iter().position(|r| id_of(r) == id)?;
    rows[pos] = row.clone();
    Some(row.clone())
}

fn remove_from<T>(rows: &mut Vec<T>, id_of: impl Fn(&T) -> Uuid, id: Uuid) -> bool {
    let before = rows.len();
    rows.retain(|r| id_of(r) != id);
    rows.len() != before
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn count(&mut self, kind: EntityKind) -> Result<i64, AppError> {
        let n = match kind {
            EntityKind::User => self.working.users.len(),
            EntityKind::Product => self.working.products.len(),
        };
        Ok(n as i64)
    }

    async fn list_users(&mut self) -> Result<Vec<User>, AppError> {
        Ok(self.working.users.clone())
    }

    async fn find_user(&mut self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.working.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_login(&mut self, login: &str) -> Result<Option<User>, AppError> {
        Ok(self.working.users.iter().find(|u| u.login == login).cloned())
    }

    async fn insert_user(&mut self, user: &User) -> Result<User, AppError> {
        if self.working.users.iter().any(|u| u.id == user.id || u.login == user.login) {
            return Err(AppError::Conflict(format!("user {} already exists", user.login)));
        }
        self.working.users.push(user.clone());
        Ok(user.clone())
    }

    async fn update_user(&mut self, user: &User) -> Result<Option<User>, AppError> {
        Ok(upsert_in(&mut self.working.users, |u| u.id, user))
    }

    async fn delete_user(&mut self, id: Uuid) -> Result<bool, AppError> {
        Ok(remove_from(&mut self.working.users, |u| u.id, id))
    }

    async fn list_products(&mut self) -> Result<Vec<Product>, AppError> {
        Ok(self.working.products.clone())
    }

    async fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, AppError> {
        Ok(self.working.products.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_product(&mut self, product: &Product) -> Result<Product, AppError> {
        if self.working.products.iter().any(|p| p.id == product.id) {
            return Err(AppError::Conflict(format!("product {} already exists", product.id)));
        }
        self.working.products.push(product.clone());
        Ok(product.clone())
    }

    async fn update_product(&mut self, product: &Product) -> Result<Option<Product>, AppError> {
        Ok(upsert_in(&mut self.working.products, |p| p.id, product))
    }

    async fn delete_product(&mut self, id: Uuid) -> Result<bool, AppError> {
        Ok(remove_from(&mut self.working.products, |p| p.id, id))
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let MemoryTx {
            mut committed,
            working,
            counters,
        } = *self;
        let injected = counters
            .failing_commits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(AppError::Db(sqlx::Error::Io(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "injected connection reset during commit",
            ))));
        }
        *committed = working;
        counters.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        self.counters.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
