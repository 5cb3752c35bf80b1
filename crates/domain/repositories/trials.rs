use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::value_objects::trials::ExpiredTrial;

#[automock]
#[async_trait]
pub trait TrialRepository {
    async fn list_expired_trials(&self, now: DateTime<Utc>) -> Result<Vec<ExpiredTrial>>;

    /// Cancels every listed trial in one statement. Returns rows updated.
    async fn cancel_trials(&self, service_ids: Vec<Uuid>) -> Result<usize>;
}
