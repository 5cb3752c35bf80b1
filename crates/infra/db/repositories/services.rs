use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, dsl::exists, insert_into, prelude::*, select};
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
    entities::services::{InsertServiceEntity, ServiceEntity},
    repositories::services::ServiceRepository,
    value_objects::{
        enums::{moderation_statuses::ModerationStatus, service_statuses::ServiceStatus},
        services::DirectoryFilter,
    },
};

pub struct ServicePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ServicePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ServiceRepository for ServicePostgres {
    async fn register(&self, service: InsertServiceEntity) -> Result<ServiceEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(services::table)
            .values(&service)
            .returning(ServiceEntity::as_returning())
            .get_result::<ServiceEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_id(&self, service_id: Uuid) -> Result<Option<ServiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = services::table
            .find(service_id)
            .select(ServiceEntity::as_select())
            .first::<ServiceEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_visible(&self, filter: DirectoryFilter) -> Result<Vec<ServiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = services::table
            .filter(services::moderation_status.ne(ModerationStatus::Suspended.to_string()))
            .filter(services::status.ne(ServiceStatus::Cancelled.as_str()))
            .select(ServiceEntity::as_select())
            .into_boxed();

        if let Some(category) = filter.category {
            query = query.filter(services::category.eq(category));
        }

        if let Some(city) = filter.city {
            query = query.filter(services::city.eq(city));
        }

        let results = query
            .order(services::created_at.desc())
            .load::<ServiceEntity>(&mut conn)?;

        Ok(results)
    }

    async fn delete_owned(&self, service_id: Uuid, owner_user_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = conn.transaction::<bool, diesel::result::Error, _>(|tx| {
            let owned = select(exists(
                services::table
                    .filter(services::id.eq(service_id))
                    .filter(services::owner_user_id.eq(owner_user_id)),
            ))
            .get_result::<bool>(tx)?;

            if !owned {
                return Ok(false);
            }

            delete(service_reports::table.filter(service_reports::service_id.eq(service_id)))
                .execute(tx)?;
            delete(services::table.find(service_id)).execute(tx)?;

            Ok(true)
        })?;

        Ok(deleted)
    }

    async fn is_owner_banned(&self, user_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let banned = select(exists(
            owner_bans::table.filter(owner_bans::user_id.eq(user_id)),
        ))
        .get_result::<bool>(&mut conn)?;

        Ok(banned)
    }
}
