//! MiniCRUD: User and Product CRUD API over PostgreSQL.

pub mod cancel;
pub mod config;
pub mod error;
pub mod extractors;
pub mod gateway;
pub mod handlers;
pub mod json;
pub mod models;
pub mod routes;
pub mod seed;
pub mod service;
pub mod state;
pub mod store;

pub use cancel::{Cancellation, CancellationSource};
pub use config::Settings;
pub use error::{AppError, ConfigError};
pub use gateway::{DataGateway, RetryPolicy, SeedReport};
pub use models::{EntityKind, Product, User};
pub use routes::{app, common_routes, entity_routes};
pub use seed::{FakeSeedProvider, SeedProvider};
pub use service::{ProductsService, UsersService};
pub use state::AppState;
pub use store::{ensure_database_exists, MemoryStore, PgStore, Store, StoreTx};
