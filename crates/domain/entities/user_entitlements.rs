use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::{
        entitlements::{EntitlementChange, EntitlementState, EntitlementUpdate, UserEntitlements},
        enums::entitlement_kinds::EntitlementKind,
    },
    infra::db::postgres::schema::user_entitlements,
};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = user_entitlements, primary_key(user_id))]
pub struct UserEntitlementEntity {
    pub user_id: Uuid,
    pub ads_active: bool,
    pub ads_expires_at: Option<DateTime<Utc>>,
    pub top_service_active: bool,
    pub top_service_expires_at: Option<DateTime<Utc>>,
    pub premium_active: bool,
    pub premium_expires_at: Option<DateTime<Utc>>,
    pub revenuecat_customer_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntitlementEntity> for UserEntitlements {
    fn from(value: UserEntitlementEntity) -> Self {
        Self {
            ads: EntitlementState {
                active: value.ads_active,
                expires_at: value.ads_expires_at,
            },
            top_service: EntitlementState {
                active: value.top_service_active,
                expires_at: value.top_service_expires_at,
            },
            premium: EntitlementState {
                active: value.premium_active,
                expires_at: value.premium_expires_at,
            },
        }
    }
}

/// Row written when the user has no entitlement record yet.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_entitlements)]
pub struct InsertUserEntitlementEntity {
    pub user_id: Uuid,
    pub ads_active: bool,
    pub ads_expires_at: Option<DateTime<Utc>>,
    pub top_service_active: bool,
    pub top_service_expires_at: Option<DateTime<Utc>>,
    pub premium_active: bool,
    pub premium_expires_at: Option<DateTime<Utc>>,
    pub revenuecat_customer_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl InsertUserEntitlementEntity {
    pub fn from_update(update: &EntitlementUpdate, now: DateTime<Utc>) -> Self {
        let mut initial = UserEntitlements::inactive();
        initial.apply(update);

        Self {
            user_id: update.user_id,
            ads_active: initial.ads.active,
            ads_expires_at: initial.ads.expires_at,
            top_service_active: initial.top_service.active,
            top_service_expires_at: initial.top_service.expires_at,
            premium_active: initial.premium.active,
            premium_expires_at: initial.premium.expires_at,
            revenuecat_customer_id: update.customer_id.clone(),
            updated_at: now,
        }
    }
}

/// Columns touched on conflict. `None` leaves the column as stored, so a
/// deactivation never rewrites the expiry and untouched products stay as they are.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = user_entitlements)]
pub struct UserEntitlementChangeset {
    pub ads_active: Option<bool>,
    pub ads_expires_at: Option<Option<DateTime<Utc>>>,
    pub top_service_active: Option<bool>,
    pub top_service_expires_at: Option<Option<DateTime<Utc>>>,
    pub premium_active: Option<bool>,
    pub premium_expires_at: Option<Option<DateTime<Utc>>>,
    pub revenuecat_customer_id: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserEntitlementChangeset {
    pub fn from_update(update: &EntitlementUpdate, now: DateTime<Utc>) -> Self {
        let mut changeset = Self {
            revenuecat_customer_id: update.customer_id.clone(),
            updated_at: Some(now),
            ..Default::default()
        };

        for (kind, change) in &update.changes {
            let (active, expires_at) = match change {
                EntitlementChange::Activate { expires_at } => (true, Some(Some(*expires_at))),
                EntitlementChange::Deactivate => (false, None),
            };

            match kind {
                EntitlementKind::Ads => {
                    changeset.ads_active = Some(active);
                    changeset.ads_expires_at = expires_at;
                }
                EntitlementKind::TopService => {
                    changeset.top_service_active = Some(active);
                    changeset.top_service_expires_at = expires_at;
                }
                EntitlementKind::Premium => {
                    changeset.premium_active = Some(active);
                    changeset.premium_expires_at = expires_at;
                }
            }
        }

        changeset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn deactivation_changeset_leaves_expiry_untouched() {
        let now = Utc::now();
        let update = EntitlementUpdate {
            user_id: Uuid::new_v4(),
            customer_id: None,
            changes: vec![
                (EntitlementKind::Premium, EntitlementChange::Deactivate),
                (
                    EntitlementKind::Ads,
                    EntitlementChange::Activate {
                        expires_at: now + Duration::days(30),
                    },
                ),
            ],
        };

        let changeset = UserEntitlementChangeset::from_update(&update, now);
        assert_eq!(changeset.premium_active, Some(false));
        assert_eq!(changeset.premium_expires_at, None);
        assert_eq!(changeset.ads_active, Some(true));
        assert_eq!(changeset.ads_expires_at, Some(Some(now + Duration::days(30))));
        assert_eq!(changeset.top_service_active, None);

        let insert = InsertUserEntitlementEntity::from_update(&update, now);
        assert!(!insert.premium_active);
        assert!(insert.ads_active);
        assert!(!insert.top_service_active);
    }
}
