use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::{
    entities::service_reports::InsertServiceReportEntity,
    value_objects::moderation::ReportSubmission,
};

#[automock]
#[async_trait]
pub trait ReportRepository {
    /// Records the report and advances the listing's moderation state as one
    /// unit. A second report from the same reporter leaves the listing untouched.
    async fn submit_report(&self, report: InsertServiceReportEntity) -> Result<ReportSubmission>;
}
