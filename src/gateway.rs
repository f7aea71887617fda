//! Transactional execution over a [`Store`] with bounded retry on transient failures.

use crate::cancel::Cancellation;
use crate::error::AppError;
use crate::models::EntityKind;
use crate::seed::{SeedProvider, SEED_PRODUCT_COUNT, SEED_USER_COUNT};
use crate::store::{Store, StoreTx};
use futures_util::future::BoxFuture;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Exponential backoff for re-running a whole transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub const fn none() -> Self {
        RetryPolicy {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (0-based): base * 2^retry, capped.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 6,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(30),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub products: usize,
}

#[derive(Clone)]
pub struct DataGateway {
    store: Arc<dyn Store>,
    retry: RetryPolicy,
}

impl DataGateway {
    pub fn new(store: Arc<dyn Store>, retry: RetryPolicy) -> Self {
        DataGateway { store, retry }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Run `op` in a fresh transaction: commit on `Ok`, roll back on `Err` or
    /// cancellation. Transient failures re-run `op` from the start in a new
    /// transaction, so `op` must be safe to call more than once.
    pub async fn run_in_transaction<T, F>(
        &self,
        cancel: &Cancellation,
        mut op: F,
    ) -> Result<T, AppError>
    where
        T: Send,
        F: for<'t> FnMut(&'t mut dyn StoreTx) -> BoxFuture<'t, Result<T, AppError>> + Send,
    {
        let mut retry = 0u32;
        loop {
            match self.attempt(cancel, &mut op).await {
                Err(err) if err.is_transient() && retry < self.retry.max_retries => {
                    let delay = self.retry.delay_for(retry);
                    retry += 1;
                    tracing::warn!(
                        retry,
                        max_retries = self.retry.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient store failure, retrying transaction"
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancel.cancelled() => return Err(AppError::Cancelled),
                    }
                }
                outcome => return outcome,
            }
        }
    }

    async fn attempt<T, F>(&self, cancel: &Cancellation, op: &mut F) -> Result<T, AppError>
    where
        T: Send,
        F: for<'t> FnMut(&'t mut dyn StoreTx) -> BoxFuture<'t, Result<T, AppError>> + Send,
    {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        let mut tx = tokio::select! {
            tx = self.store.begin() => tx?,
            _ = cancel.cancelled() => return Err(AppError::Cancelled),
        };
        let outcome = tokio::select! {
            result = op(&mut *tx) => result,
            _ = cancel.cancelled() => Err(AppError::Cancelled),
        };
        match outcome {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }

    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        self.store.ensure_schema().await
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.store.ping().await
    }

    /// Fill each empty table with synthetic rows, all in one transaction.
    pub async fn seed_if_empty(
        &self,
        cancel: &Cancellation,
        seeds: Arc<dyn SeedProvider>,
    ) -> Result<SeedReport, AppError> {
        let report = self
            .run_in_transaction(cancel, move |tx| {
                let seeds = Arc::clone(&seeds);
                Box::pin(async move {
                    let mut report = SeedReport::default();
                    if tx.count(EntityKind::User).await? == 0 {
                        // Generated logins can repeat; the unique constraint must hold.
                        let mut logins = HashSet::new();
                        let mut attempts = 0;
                        while logins.len() < SEED_USER_COUNT && attempts < SEED_USER_COUNT * 10 {
                            attempts += 1;
                            let user = seeds.generate_user();
                            if logins.insert(user.login.clone()) {
                                tx.insert_user(&user).await?;
                            }
                        }
                        report.users = logins.len();
                    }
                    if tx.count(EntityKind::Product).await? == 0 {
                        for _ in 0..SEED_PRODUCT_COUNT {
                            tx.insert_product(&seeds.generate_product()).await?;
                        }
                        report.products = SEED_PRODUCT_COUNT;
                    }
                    Ok(report)
                })
            })
            .await?;
        if report != SeedReport::default() {
            tracing::info!(users = report.users, products = report.products, "seeded empty tables");
        }
        Ok(report)
    }
}
