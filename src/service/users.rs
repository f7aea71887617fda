use super::require_non_blank;
use crate::cancel::Cancellation;
use crate::error::AppError;
use crate::gateway::DataGateway;
use crate::models::User;
use crate::seed::SeedProvider;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct UsersService {
    gateway: DataGateway,
    seeds: Arc<dyn SeedProvider>,
}

impl UsersService {
    pub fn new(gateway: DataGateway, seeds: Arc<dyn SeedProvider>) -> Self {
        UsersService { gateway, seeds }
    }

    /// All users. An empty table is reported as not found.
    pub async fn list(&self, cancel: &Cancellation) -> Result<Vec<User>, AppError> {
        self.gateway
            .run_in_transaction(cancel, |tx| {
                Box::pin(async move {
                    let users = tx.list_users().await?;
                    if users.is_empty() {
                        return Err(AppError::NotFound("no users".into()));
                    }
                    Ok(users)
                })
            })
            .await
    }

    pub async fn get(&self, cancel: &Cancellation, id: Uuid) -> Result<User, AppError> {
        self.gateway
            .run_in_transaction(cancel, move |tx| {
                Box::pin(async move {
                    tx.find_user(id)
                        .await?
                        .ok_or_else(|| AppError::NotFound(format!("user {}", id)))
                })
            })
            .await
    }

    /// Validate, check for id and login collisions, then store a generated user
    /// carrying the caller's login, password hash and email under a fresh id.
    pub async fn create(&self, cancel: &Cancellation, payload: User) -> Result<User, AppError> {
        let seeds = Arc::clone(&self.seeds);
        let created = self
            .gateway
            .run_in_transaction(cancel, move |tx| {
                let payload = payload.clone();
                let seeds = Arc::clone(&seeds);
                Box::pin(async move {
                    require_non_blank(&[
                        ("login", payload.login.as_str()),
                        ("passwordHash", payload.password_hash.as_str()),
                        ("email", payload.email.as_str()),
                    ])?;
                    if tx.find_user(payload.id).await?.is_some() {
                        let message = format!("user {} already exists", payload.id);
                        return Err(AppError::Conflict(message));
                    }
                    if tx.find_user_by_login(&payload.login).await?.is_some() {
                        return Err(AppError::Conflict(format!("login {} is taken", payload.login)));
                    }
                    let mut user = seeds.generate_user();
                    user.id = Uuid::new_v4();
                    user.login = payload.login;
                    user.password_hash = payload.password_hash;
                    user.email = payload.email;
                    tx.insert_user(&user).await
                })
            })
            .await?;
        tracing::info!(id = %created.id, login = %created.login, "user created");
        Ok(created)
    }

    /// Copy login, password hash and email onto the stored user.
    pub async fn update(&self, cancel: &Cancellation, payload: User) -> Result<(), AppError> {
        self.gateway
            .run_in_transaction(cancel, move |tx| {
                let payload = payload.clone();
                Box::pin(async move {
                    if !payload.email.contains('@') {
                        return Err(AppError::BadRequest("email must contain '@'".into()));
                    }
                    let mut found = tx
                        .find_user(payload.id)
                        .await?
                        .ok_or_else(|| AppError::NotFound(format!("user {}", payload.id)))?;
                    if let Some(owner) = tx.find_user_by_login(&payload.login).await? {
                        if owner.id != found.id {
                            let message = format!("login {} is taken", payload.login);
                            return Err(AppError::Conflict(message));
                        }
                    }
                    found.login = payload.login;
                    found.password_hash = payload.password_hash;
                    found.email = payload.email;
                    tx.update_user(&found)
                        .await?
                        .ok_or_else(|| AppError::NotFound(format!("user {}", found.id)))?;
                    Ok(())
                })
            })
            .await
    }

    pub async fn delete(&self, cancel: &Cancellation, id: Uuid) -> Result<(), AppError> {
        self.gateway
            .run_in_transaction(cancel, move |tx| {
                Box::pin(async move {
                    if tx.find_user(id).await?.is_none() {
                        return Err(AppError::NotFound(format!("user {}", id)));
                    }
                    tx.delete_user(id).await?;
                    Ok(())
                })
            })
            .await?;
        tracing::info!(%id, "user deleted");
        Ok(())
    }
}
