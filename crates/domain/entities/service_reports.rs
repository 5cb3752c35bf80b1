use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::service_reports;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = service_reports)]
pub struct ServiceReportEntity {
    pub id: Uuid,
    pub service_id: Uuid,
    pub reporter_user_id: Uuid,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = service_reports)]
pub struct InsertServiceReportEntity {
    pub service_id: Uuid,
    pub reporter_user_id: Uuid,
    pub reason: String,
}
