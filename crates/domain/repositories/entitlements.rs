use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::value_objects::entitlements::{EntitlementUpdate, UserEntitlements};

#[automock]
#[async_trait]
pub trait EntitlementRepository {
    /// Upserts the user's entitlement row and mirrors the ads flag onto the
    /// profile in the same transaction. Returns the stored state afterwards.
    async fn apply_update(&self, update: EntitlementUpdate) -> Result<UserEntitlements>;

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<UserEntitlements>>;

    /// Moves trial advertisements past their end date to `expired` for users
    /// without an active ads entitlement. Returns the number of rows touched.
    async fn expire_trial_ads(&self) -> Result<usize>;
}
