use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::user_lists::{
    InsertUserListEntity, InsertUserListItemEntity, UpdateUserListEntity,
    UpdateUserListItemEntity, UserListEntity, UserListItemEntity,
};

/// Every call is scoped by `user_id`; lists owned by someone else read as missing.
#[automock]
#[async_trait]
pub trait ListRepository {
    async fn list_for_user(
        &self,
        user_id: Uuid,
        include_archived: bool,
    ) -> Result<Vec<UserListEntity>>;

    async fn find_with_items(
        &self,
        user_id: Uuid,
        list_id: Uuid,
    ) -> Result<Option<(UserListEntity, Vec<UserListItemEntity>)>>;

    async fn create_list(&self, list: InsertUserListEntity) -> Result<UserListEntity>;

    async fn update_list(
        &self,
        user_id: Uuid,
        list_id: Uuid,
        changes: UpdateUserListEntity,
    ) -> Result<Option<UserListEntity>>;

    async fn delete_list(&self, user_id: Uuid, list_id: Uuid) -> Result<bool>;

    /// Inserts the item and persists the recomputed progress. `None` when the
    /// list is not the user's.
    async fn add_item(
        &self,
        user_id: Uuid,
        item: InsertUserListItemEntity,
    ) -> Result<Option<(UserListItemEntity, i32)>>;

    async fn update_item(
        &self,
        user_id: Uuid,
        list_id: Uuid,
        item_id: Uuid,
        changes: UpdateUserListItemEntity,
    ) -> Result<Option<(UserListItemEntity, i32)>>;

    async fn delete_item(
        &self,
        user_id: Uuid,
        list_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<i32>>;
}
