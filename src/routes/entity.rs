//! Resource routes. Both resources share one shape: collection at `/{Resource}`,
//! item at `/{Resource}/:id`, and updates sent to the collection with the id in the body.

use crate::handlers::{products, users};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .route("/Users", get(users::list).post(users::create).put(users::update))
        .route("/Users/:id", get(users::read).delete(users::delete))
        .route(
            "/Products",
            get(products::list).post(products::create).put(products::update),
        )
        .route("/Products/:id", get(products::read).delete(products::delete))
        .with_state(state)
}
