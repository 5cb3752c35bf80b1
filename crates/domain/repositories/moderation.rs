use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::{owner_bans::InsertOwnerBanEntity, services::ServiceEntity},
    value_objects::moderation::BanOutcome,
};

#[automock]
#[async_trait]
pub trait ModerationRepository {
    /// Clears the report count, restores `active` and drops the listing's reports.
    /// Returns `false` when the listing does not exist.
    async fn approve_service(&self, service_id: Uuid) -> Result<bool>;

    async fn suspend_service(&self, service_id: Uuid) -> Result<bool>;

    async fn delete_service(&self, service_id: Uuid) -> Result<bool>;

    async fn ban_owner(&self, ban: InsertOwnerBanEntity) -> Result<BanOutcome>;

    /// Listings with at least `min_reports` reports plus every suspended
    /// listing, whatever its count.
    async fn list_review_queue(&self, min_reports: i32) -> Result<Vec<ServiceEntity>>;
}
