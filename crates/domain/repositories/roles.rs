use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::value_objects::enums::app_roles::AppRole;

#[automock]
#[async_trait]
pub trait RoleRepository {
    async fn has_role(&self, user_id: Uuid, role: AppRole) -> Result<bool>;
}
