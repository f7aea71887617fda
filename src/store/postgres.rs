//! PostgreSQL adapter: `users` and `products` tables in the connection's default schema.

use super::{Store, StoreTx};
use crate::error::{AppError, ConfigError};
use crate::models::{EntityKind, Product, User};
use async_trait::async_trait;
use sqlx::{ConnectOptions, PgPool, Postgres, Transaction};
use std::str::FromStr;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, login, password_hash, avatar_url, email, last_known_ip";
const PRODUCT_COLUMNS: &str = "id, name, description, adjective, material, price";

const USERS_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        login TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        avatar_url TEXT NOT NULL DEFAULT '',
        email TEXT NOT NULL DEFAULT '',
        last_known_ip TEXT NOT NULL DEFAULT ''
    )
"#;

const PRODUCTS_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS products (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        adjective TEXT NOT NULL,
        material TEXT NOT NULL,
        price NUMERIC(12, 2) NOT NULL DEFAULT 0
    )
"#;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }

    async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(USERS_DDL).execute(&self.pool).await?;
        sqlx::query(PRODUCTS_DDL).execute(&self.pool).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn count(&mut self, kind: EntityKind) -> Result<i64, AppError> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        tracing::debug!(sql = %sql, "query (tx)");
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(&mut *self.tx).await?;
        Ok(count)
    }

    async fn list_users(&mut self) -> Result<Vec<User>, AppError> {
        let sql = format!("SELECT {} FROM users", USER_COLUMNS);
        tracing::debug!(sql = %sql, "query (tx)");
        let rows = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows)
    }

    async fn find_user(&mut self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        tracing::debug!(sql = %sql, %id, "query (tx)");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn find_user_by_login(&mut self, login: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE login = $1", USER_COLUMNS);
        tracing::debug!(sql = %sql, login, "query (tx)");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(login)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn insert_user(&mut self, user: &User) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users ({cols}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {cols}",
            cols = USER_COLUMNS
        );
        tracing::debug!(sql = %sql, id = %user.id, "query (tx)");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.login)
            .bind(&user.password_hash)
            .bind(&user.avatar_url)
            .bind(&user.email)
            .bind(&user.last_known_ip)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn update_user(&mut self, user: &User) -> Result<Option<User>, AppError> {
        let sql = format!(
            "UPDATE users SET login = $2, password_hash = $3, avatar_url = $4, email = $5, \
             last_known_ip = $6 WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        tracing::debug!(sql = %sql, id = %user.id, "query (tx)");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.login)
            .bind(&user.password_hash)
            .bind(&user.avatar_url)
            .bind(&user.email)
            .bind(&user.last_known_ip)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn delete_user(&mut self, id: Uuid) -> Result<bool, AppError> {
        tracing::debug!(%id, "delete user (tx)");
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_products(&mut self) -> Result<Vec<Product>, AppError> {
        let sql = format!("SELECT {} FROM products", PRODUCT_COLUMNS);
        tracing::debug!(sql = %sql, "query (tx)");
        let rows = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows)
    }

    async fn find_product(&mut self, id: Uuid) -> Result<Option<Product>, AppError> {
        let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
        tracing::debug!(sql = %sql, %id, "query (tx)");
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn insert_product(&mut self, product: &Product) -> Result<Product, AppError> {
        let sql = format!(
            "INSERT INTO products ({cols}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {cols}",
            cols = PRODUCT_COLUMNS
        );
        tracing::debug!(sql = %sql, id = %product.id, "query (tx)");
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(product.id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(&product.adjective)
            .bind(&product.material)
            .bind(product.price)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn update_product(&mut self, product: &Product) -> Result<Option<Product>, AppError> {
        let sql = format!(
            "UPDATE products SET name = $2, description = $3, adjective = $4, material = $5, \
             price = $6 WHERE id = $1 RETURNING {}",
            PRODUCT_COLUMNS
        );
        tracing::debug!(sql = %sql, id = %product.id, "query (tx)");
        let row = sqlx::query_as::<_, Product>(&sql)
            .bind(product.id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(&product.adjective)
            .bind(&product.material)
            .bind(product.price)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row)
    }

    async fn delete_product(&mut self, id: Uuid) -> Result<bool, AppError> {
        tracing::debug!(%id, "delete product (tx)");
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts =
        sqlx::postgres::PgConnectOptions::from_str(&admin_url).map_err(|e| ConfigError::Invalid {
            key: "DATABASE_URL",
            value: database_url.to_string(),
            reason: e.to_string(),
        })?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| ConfigError::Invalid {
            key: "DATABASE_URL",
            value: url.to_string(),
            reason: "no database path".into(),
        })?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let (db_name, query) = match path_and_query.split_once('?') {
        Some((name, query)) => (name.trim(), Some(query)),
        None => (path_and_query.trim(), None),
    };
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = match query {
        Some(q) => format!("{}postgres?{}", base, q),
        None => format!("{}postgres", base),
    };
    Ok((admin_url, db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
