use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{advertisements, profiles, user_entitlements},
    },
};
use domain::{
    entities::user_entitlements::{
        InsertUserEntitlementEntity, UserEntitlementChangeset, UserEntitlementEntity,
    },
    repositories::entitlements::EntitlementRepository,
    value_objects::{
        entitlements::{EntitlementUpdate, UserEntitlements},
        enums::advertisement_statuses::AdvertisementStatus,
    },
};

pub struct EntitlementPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl EntitlementPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl EntitlementRepository for EntitlementPostgres {
    async fn apply_update(&self, entitlement_update: EntitlementUpdate) -> Result<UserEntitlements> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let insert_entity = InsertUserEntitlementEntity::from_update(&entitlement_update, now);
        let changeset = UserEntitlementChangeset::from_update(&entitlement_update, now);
        let legacy_ads_flag = entitlement_update.legacy_ads_flag();

        let stored = conn.transaction::<UserEntitlementEntity, diesel::result::Error, _>(|tx| {
            let row = insert_into(user_entitlements::table)
                .values(&insert_entity)
                .on_conflict(user_entitlements::user_id)
                .do_update()
                .set(&changeset)
                .returning(UserEntitlementEntity::as_select())
                .get_result::<UserEntitlementEntity>(tx)?;

            if legacy_ads_flag.is_some() {
                update(profiles::table.find(entitlement_update.user_id))
                    .set((
                        profiles::has_ads_entitlement.eq(row.ads_active),
                        profiles::updated_at.eq(now),
                    ))
                    .execute(tx)?;
            }

            Ok(row)
        })?;

        Ok(UserEntitlements::from(stored))
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<UserEntitlements>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = user_entitlements::table
            .find(user_id)
            .select(UserEntitlementEntity::as_select())
            .first::<UserEntitlementEntity>(&mut conn)
            .optional()?;

        Ok(row.map(UserEntitlements::from))
    }

    async fn expire_trial_ads(&self) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let entitled_users = user_entitlements::table
            .filter(user_entitlements::ads_active.eq(true))
            .select(user_entitlements::user_id);

        let expired = update(
            advertisements::table
                .filter(advertisements::status.eq(AdvertisementStatus::Trial.to_string()))
                .filter(advertisements::trial_end.lt(Utc::now()))
                .filter(diesel::dsl::not(advertisements::user_id.eq_any(entitled_users))),
        )
        .set(advertisements::status.eq(AdvertisementStatus::Expired.to_string()))
        .execute(&mut conn)?;

        Ok(expired)
    }
}
