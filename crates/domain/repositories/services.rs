use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::services::{InsertServiceEntity, ServiceEntity},
    value_objects::services::DirectoryFilter,
};

#[automock]
#[async_trait]
pub trait ServiceRepository {
    async fn register(&self, service: InsertServiceEntity) -> Result<ServiceEntity>;

    async fn find_by_id(&self, service_id: Uuid) -> Result<Option<ServiceEntity>>;

    /// Listings that are neither suspended nor cancelled.
    async fn list_visible(&self, filter: DirectoryFilter) -> Result<Vec<ServiceEntity>>;

    /// Removes the listing and its reports when `owner_user_id` owns it.
    async fn delete_owned(&self, service_id: Uuid, owner_user_id: Uuid) -> Result<bool>;

    async fn is_owner_banned(&self, user_id: Uuid) -> Result<bool>;
}
