//! Frontend routes. Each one answers with the [`Response`] envelope the client
//! produced, so API failures reach the caller as `message` with status 200.

use crate::client::{ApiClient, Response};
use crate::password::PasswordHasher;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use minicrud::extractors::CaseInsensitiveJson;
use minicrud::models::{Product, User};
use serde::Deserialize;

const INVALID_CREDENTIALS: &str = "invalid login or password";

#[derive(Clone)]
pub struct WebState {
    pub api: ApiClient,
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub login: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub login: String,
    pub password: String,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn users(State(state): State<WebState>) -> Json<Response<Vec<User>>> {
    Json(state.api.get("Users").await)
}

async fn products(State(state): State<WebState>) -> Json<Response<Vec<Product>>> {
    Json(state.api.get("Products").await)
}

async fn signup(
    State(state): State<WebState>,
    CaseInsensitiveJson(form): CaseInsensitiveJson<SignupForm>,
) -> Json<Response<User>> {
    let user = User {
        login: form.login,
        password_hash: PasswordHasher::hash(&form.password),
        email: form.email,
        ..User::default()
    };
    let mut created: Response<User> = state.api.post("Users", &user).await;
    if let Some(user) = created.data.as_mut() {
        user.password_hash.clear();
    }
    Json(created)
}

async fn login(
    State(state): State<WebState>,
    CaseInsensitiveJson(form): CaseInsensitiveJson<LoginForm>,
) -> Json<Response<User>> {
    let listed: Response<Vec<User>> = state.api.get("Users").await;
    let users = match listed {
        Response {
            data: Some(users),
            message: None,
        } => users,
        Response { message, .. } => {
            return Json(Response::failure(message.unwrap_or_else(|| INVALID_CREDENTIALS.into())))
        }
    };
    let found = users
        .into_iter()
        .find(|u| {
            u.login == form.login && PasswordHasher::verify(&form.password, &u.password_hash)
        });
    match found {
        Some(mut user) => {
            user.password_hash.clear();
            tracing::info!(login = %user.login, "user logged in");
            Json(Response::success(user))
        }
        None => {
            tracing::info!(login = %form.login, "login rejected");
            Json(Response::failure(INVALID_CREDENTIALS))
        }
    }
}

/// GET /health, /users, /products; POST /signup, /login.
pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/users", get(users))
        .route("/products", get(products))
        .route("/signup", post(signup))
        .route("/login", post(login))
        .with_state(state)
}
