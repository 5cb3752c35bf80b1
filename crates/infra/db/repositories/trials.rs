use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        repositories::trials::TrialRepository,
        value_objects::{enums::service_statuses::ServiceStatus, trials::ExpiredTrial},
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::services},
};

pub struct TrialPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl TrialPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl TrialRepository for TrialPostgres {
    async fn list_expired_trials(&self, now: DateTime<Utc>) -> Result<Vec<ExpiredTrial>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = services::table
            .filter(services::status.eq(ServiceStatus::Trial.as_str()))
            .filter(services::trial_end.lt(now))
            .select((
                services::id,
                services::trial_end,
                services::stripe_subscription_id,
            ))
            .load::<(Uuid, Option<DateTime<Utc>>, Option<String>)>(&mut conn)?;

        let trials = rows
            .into_iter()
            .filter_map(|(service_id, trial_end, stripe_subscription_id)| {
                trial_end.map(|trial_end| ExpiredTrial {
                    service_id,
                    trial_end,
                    stripe_subscription_id,
                })
            })
            .collect();

        Ok(trials)
    }

    async fn cancel_trials(&self, service_ids: Vec<Uuid>) -> Result<usize> {
        if service_ids.is_empty() {
            return Ok(0);
        }

        let mut conn = Arc::clone(&self.db_pool).get()?;

        // One statement: the whole batch is cancelled or none of it is.
        let cancelled = update(
            services::table
                .filter(services::id.eq_any(service_ids))
                .filter(services::status.eq(ServiceStatus::Trial.as_str())),
        )
        .set((
            services::status.eq(ServiceStatus::Cancelled.as_str()),
            services::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(cancelled)
    }
}
