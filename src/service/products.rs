use super::require_non_blank;
use crate::cancel::Cancellation;
use crate::error::AppError;
use crate::gateway::DataGateway;
use crate::models::Product;
use uuid::Uuid;

#[derive(Clone)]
pub struct ProductsService {
    gateway: DataGateway,
}

impl ProductsService {
    pub fn new(gateway: DataGateway) -> Self {
        ProductsService { gateway }
    }

    /// All products. An empty table is reported as not found.
    pub async fn list(&self, cancel: &Cancellation) -> Result<Vec<Product>, AppError> {
        self.gateway
            .run_in_transaction(cancel, |tx| {
                Box::pin(async move {
                    let products = tx.list_products().await?;
                    if products.is_empty() {
                        return Err(AppError::NotFound("no products".into()));
                    }
                    Ok(products)
                })
            })
            .await
    }

    pub async fn get(&self, cancel: &Cancellation, id: Uuid) -> Result<Product, AppError> {
        self.gateway
            .run_in_transaction(cancel, move |tx| {
                Box::pin(async move {
                    tx.find_product(id)
                        .await?
                        .ok_or_else(|| AppError::NotFound(format!("product {}", id)))
                })
            })
            .await
    }

    /// The client id is only used for the collision check; the stored row gets a fresh one.
    pub async fn create(
        &self,
        cancel: &Cancellation,
        payload: Product,
    ) -> Result<Product, AppError> {
        let created = self
            .gateway
            .run_in_transaction(cancel, move |tx| {
                let mut product = payload.clone();
                Box::pin(async move {
                    require_non_blank(&[
                        ("name", product.name.as_str()),
                        ("description", product.description.as_str()),
                        ("adjective", product.adjective.as_str()),
                        ("material", product.material.as_str()),
                    ])?;
                    if tx.find_product(product.id).await?.is_some() {
                        let message = format!("product {} already exists", product.id);
                        return Err(AppError::Conflict(message));
                    }
                    product.id = Uuid::new_v4();
                    tx.insert_product(&product).await
                })
            })
            .await?;
        tracing::info!(id = %created.id, name = %created.name, "product created");
        Ok(created)
    }

    pub async fn update(&self, cancel: &Cancellation, payload: Product) -> Result<(), AppError> {
        self.gateway
            .run_in_transaction(cancel, move |tx| {
                let payload = payload.clone();
                Box::pin(async move {
                    let mut found = tx
                        .find_product(payload.id)
                        .await?
                        .ok_or_else(|| AppError::NotFound(format!("product {}", payload.id)))?;
                    found.name = payload.name;
                    found.description = payload.description;
                    found.price = payload.price;
                    found.adjective = payload.adjective;
                    found.material = payload.material;
                    tx.update_product(&found)
                        .await?
                        .ok_or_else(|| AppError::NotFound(format!("product {}", found.id)))?;
                    Ok(())
                })
            })
            .await
    }

    pub async fn delete(&self, cancel: &Cancellation, id: Uuid) -> Result<(), AppError> {
        self.gateway
            .run_in_transaction(cancel, move |tx| {
                Box::pin(async move {
                    if tx.find_product(id).await?.is_none() {
                        return Err(AppError::NotFound(format!("product {}", id)));
                    }
                    tx.delete_product(id).await?;
                    Ok(())
                })
            })
            .await?;
        tracing::info!(%id, "product deleted");
        Ok(())
    }
}
