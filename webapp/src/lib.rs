//! MiniCRUD frontend: talks to the API through [`ApiClient`].

pub mod client;
pub mod config;
pub mod password;
pub mod routes;

pub use client::{ApiClient, ClientError, Response};
pub use config::WebSettings;
pub use password::PasswordHasher;
pub use routes::{router, WebState};
