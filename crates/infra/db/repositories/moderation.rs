use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{owner_bans, service_reports, services},
    },
};
use domain::{
    entities::{owner_bans::InsertOwnerBanEntity, services::ServiceEntity},
    repositories::moderation::ModerationRepository,
    value_objects::{enums::moderation_statuses::ModerationStatus, moderation::BanOutcome},
};

pub struct ModerationPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ModerationPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ModerationRepository for ModerationPostgres {
    async fn approve_service(&self, service_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let found = conn.transaction::<bool, diesel::result::Error, _>(|tx| {
            let updated = update(services::table.find(service_id))
                .set((
                    services::reports_count.eq(0),
                    services::moderation_status.eq(ModerationStatus::Active.to_string()),
                    services::updated_at.eq(Utc::now()),
                ))
                .execute(tx)?;

            if updated == 0 {
                return Ok(false);
            }

            delete(service_reports::table.filter(service_reports::service_id.eq(service_id)))
                .execute(tx)?;

            Ok(true)
        })?;

        Ok(found)
    }

    async fn suspend_service(&self, service_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(services::table.find(service_id))
            .set((
                services::moderation_status.eq(ModerationStatus::Suspended.to_string()),
                services::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(updated > 0)
    }

    async fn delete_service(&self, service_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let found = conn.transaction::<bool, diesel::result::Error, _>(|tx| {
            delete(service_reports::table.filter(service_reports::service_id.eq(service_id)))
                .execute(tx)?;

            let deleted = delete(services::table.find(service_id)).execute(tx)?;

            Ok(deleted > 0)
        })?;

        Ok(found)
    }

    async fn ban_owner(&self, ban: InsertOwnerBanEntity) -> Result<BanOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let outcome = conn.transaction::<BanOutcome, diesel::result::Error, _>(|tx| {
            let inserted = insert_into(owner_bans::table)
                .values(&ban)
                .on_conflict(owner_bans::user_id)
                .do_nothing()
                .execute(tx)?;

            if inserted == 0 {
                return Ok(BanOutcome::AlreadyBanned);
            }

            let suspended_services = update(
                services::table.filter(services::owner_user_id.eq(ban.user_id)),
            )
            .set((
                services::moderation_status.eq(ModerationStatus::Suspended.to_string()),
                services::updated_at.eq(Utc::now()),
            ))
            .execute(tx)?;

            Ok(BanOutcome::Banned { suspended_services })
        })?;

        Ok(outcome)
    }

    async fn list_review_queue(&self, min_reports: i32) -> Result<Vec<ServiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = services::table
            .filter(
                services::reports_count
                    .ge(min_reports)
                    .or(services::moderation_status.eq(ModerationStatus::Suspended.to_string())),
            )
            .order((services::reports_count.desc(), services::updated_at.desc()))
            .select(ServiceEntity::as_select())
            .load::<ServiceEntity>(&mut conn)?;

        Ok(results)
    }
}
