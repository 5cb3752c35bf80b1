use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{service_reports, services},
    },
};
use domain::{
    entities::service_reports::InsertServiceReportEntity,
    repositories::reports::ReportRepository,
    value_objects::{
        enums::moderation_statuses::ModerationStatus,
        moderation::{ReportSubmission, apply_report},
    },
};

pub struct ReportPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ReportPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ReportRepository for ReportPostgres {
    async fn submit_report(&self, report: InsertServiceReportEntity) -> Result<ReportSubmission> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let submission = conn.transaction::<ReportSubmission, diesel::result::Error, _>(|tx| {
            // Row lock serialises concurrent reports on the same listing.
            let current = services::table
                .find(report.service_id)
                .select((services::reports_count, services::moderation_status))
                .for_update()
                .first::<(i32, String)>(tx)
                .optional()?;

            let Some((reports_count, moderation_status)) = current else {
                return Ok(ReportSubmission::ServiceNotFound);
            };

            let inserted = insert_into(service_reports::table)
                .values(&report)
                .on_conflict((service_reports::service_id, service_reports::reporter_user_id))
                .do_nothing()
                .execute(tx)?;

            if inserted == 0 {
                return Ok(ReportSubmission::Duplicate);
            }

            let tally = apply_report(reports_count, ModerationStatus::from_str(&moderation_status));

            update(services::table.find(report.service_id))
                .set((
                    services::reports_count.eq(tally.reports_count),
                    services::moderation_status.eq(tally.moderation_status.to_string()),
                    services::updated_at.eq(Utc::now()),
                ))
                .execute(tx)?;

            Ok(ReportSubmission::Recorded(tally))
        })?;

        Ok(submission)
    }
}
