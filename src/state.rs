//! Shared application state for all routes.

use crate::cancel::Cancellation;
use crate::gateway::DataGateway;
use crate::seed::SeedProvider;
use crate::service::{ProductsService, UsersService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub gateway: DataGateway,
    pub users: UsersService,
    pub products: ProductsService,
    /// Fired on shutdown; in-flight transactions roll back.
    pub shutdown: Cancellation,
}

impl AppState {
    pub fn new(gateway: DataGateway, seeds: Arc<dyn SeedProvider>, shutdown: Cancellation) -> Self {
        AppState {
            users: UsersService::new(gateway.clone(), seeds),
            products: ProductsService::new(gateway.clone()),
            gateway,
            shutdown,
        }
    }
}
