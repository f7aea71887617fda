//! Persisted entities. Both travel as camelCase JSON; missing fields fall back to
//! empty values so request validation, not deserialization, rejects them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: Uuid,
    pub login: String,
    pub password_hash: String,
    pub avatar_url: String,
    pub email: String,
    pub last_known_ip: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub adjective: String,
    pub material: String,
    /// Written as a JSON number; numbers and numeric strings are both read.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Entity collections known to the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Product,
}

impl EntityKind {
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Product => "products",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}
