use std::sync::Arc;

use axum::http::StatusCode;
use crates::domain::{
    entities::service_reports::InsertServiceReportEntity,
    repositories::reports::ReportRepository,
    value_objects::moderation::{ReportSubmission, ReportSubmissionDto, SubmitReportModel},
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::axum_http::error_responses::ApiError;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{0}")]
    Validation(String),
    #[error("You have already reported this service")]
    DuplicateReport,
    #[error("Service not found")]
    ServiceNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError for ReportError {
    fn status_code(&self) -> StatusCode {
        match self {
            ReportError::Validation(_) => StatusCode::BAD_REQUEST,
            ReportError::DuplicateReport => StatusCode::CONFLICT,
            ReportError::ServiceNotFound => StatusCode::NOT_FOUND,
            ReportError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ReportError::Validation(_) => "VALIDATION_ERROR",
            ReportError::DuplicateReport => "DUPLICATE_REPORT",
            ReportError::ServiceNotFound => "SERVICE_NOT_FOUND",
            ReportError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ReportError>;

pub struct ReportUseCase<R>
where
    R: ReportRepository + Send + Sync + 'static,
{
    report_repo: Arc<R>,
}

impl<R> ReportUseCase<R>
where
    R: ReportRepository + Send + Sync + 'static,
{
    pub fn new(report_repo: Arc<R>) -> Self {
        Self { report_repo }
    }

    pub async fn submit_report(
        &self,
        reporter_user_id: Uuid,
        model: SubmitReportModel,
    ) -> UseCaseResult<ReportSubmissionDto> {
        let service_id = model
            .service_id
            .ok_or_else(|| ReportError::Validation("serviceId is required".to_string()))?;

        let reason = model
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| ReportError::Validation("reason is required".to_string()))?
            .to_string();

        let submission = self
            .report_repo
            .submit_report(InsertServiceReportEntity {
                service_id,
                reporter_user_id,
                reason,
            })
            .await
            .map_err(|err| {
                error!(
                    %service_id,
                    %reporter_user_id,
                    db_error = ?err,
                    "reports: failed to record report"
                );
                ReportError::Internal(err)
            })?;

        match submission {
            ReportSubmission::Recorded(tally) => {
                info!(
                    %service_id,
                    %reporter_user_id,
                    reports_count = tally.reports_count,
                    moderation_status = %tally.moderation_status,
                    flagged_for_review = tally.flagged_for_review,
                    "reports: report recorded"
                );
                Ok(ReportSubmissionDto::from(tally))
            }
            ReportSubmission::Duplicate => {
                warn!(%service_id, %reporter_user_id, "reports: duplicate report rejected");
                Err(ReportError::DuplicateReport)
            }
            ReportSubmission::ServiceNotFound => {
                warn!(%service_id, "reports: report for unknown service");
                Err(ReportError::ServiceNotFound)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::{
        repositories::reports::MockReportRepository,
        value_objects::{
            enums::moderation_statuses::ModerationStatus,
            moderation::apply_report,
        },
    };
    use std::{
        collections::{HashMap, HashSet},
        sync::Mutex,
    };

    #[derive(Default)]
    struct Ledger {
        reporters: HashSet<(Uuid, Uuid)>,
        listings: HashMap<Uuid, (i32, ModerationStatus)>,
    }

    /// Mock backed by an in-memory ledger that enforces one report per
    /// (listing, reporter) the way the unique index does.
    fn ledger_repo(ledger: Arc<Mutex<Ledger>>) -> MockReportRepository {
        let mut repo = MockReportRepository::new();
        repo.expect_submit_report().returning(move |report| {
            let mut ledger = ledger.lock().unwrap();
            if !ledger.listings.contains_key(&report.service_id) {
                return Ok(ReportSubmission::ServiceNotFound);
            }
            if !ledger
                .reporters
                .insert((report.service_id, report.reporter_user_id))
            {
                return Ok(ReportSubmission::Duplicate);
            }
            let (count, status) = ledger.listings[&report.service_id];
            let tally = apply_report(count, status);
            ledger
                .listings
                .insert(report.service_id, (tally.reports_count, tally.moderation_status));
            Ok(ReportSubmission::Recorded(tally))
        });
        repo
    }

    fn ledger_with_listing(service_id: Uuid) -> Arc<Mutex<Ledger>> {
        let mut ledger = Ledger::default();
        ledger
            .listings
            .insert(service_id, (0, ModerationStatus::Active));
        Arc::new(Mutex::new(ledger))
    }

    fn report(service_id: Uuid) -> SubmitReportModel {
        SubmitReportModel {
            service_id: Some(service_id),
            reason: Some("Fake business".to_string()),
        }
    }

    #[tokio::test]
    async fn duplicate_report_is_rejected_and_count_stays() {
        let service_id = Uuid::new_v4();
        let reporter = Uuid::new_v4();
        let ledger = ledger_with_listing(service_id);
        let usecase = ReportUseCase::new(Arc::new(ledger_repo(Arc::clone(&ledger))));

        let first = usecase.submit_report(reporter, report(service_id)).await.unwrap();
        assert_eq!(first.reports_count, 1);

        let second = usecase.submit_report(reporter, report(service_id)).await;
        let err = second.unwrap_err();
        assert!(matches!(err, ReportError::DuplicateReport));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        assert_eq!(ledger.lock().unwrap().listings[&service_id].0, 1);
    }

    #[tokio::test]
    async fn four_distinct_reporters_flag_without_changing_status() {
        let service_id = Uuid::new_v4();
        let usecase = ReportUseCase::new(Arc::new(ledger_repo(ledger_with_listing(service_id))));

        let mut last = None;
        for _ in 0..4 {
            last = Some(
                usecase
                    .submit_report(Uuid::new_v4(), report(service_id))
                    .await
                    .unwrap(),
            );
        }

        let last = last.unwrap();
        assert_eq!(last.reports_count, 4);
        assert_eq!(last.moderation_status, ModerationStatus::Active);
        assert!(last.flagged_for_review);
    }

    #[tokio::test]
    async fn eighth_reporter_suspends() {
        let service_id = Uuid::new_v4();
        let usecase = ReportUseCase::new(Arc::new(ledger_repo(ledger_with_listing(service_id))));

        for n in 1..=8 {
            let dto = usecase
                .submit_report(Uuid::new_v4(), report(service_id))
                .await
                .unwrap();
            let expected = if n >= 8 {
                ModerationStatus::Suspended
            } else {
                ModerationStatus::Active
            };
            assert_eq!(dto.moderation_status, expected, "after report {n}");
        }
    }

    #[tokio::test]
    async fn blank_reason_never_reaches_the_ledger() {
        let mut repo = MockReportRepository::new();
        repo.expect_submit_report().never();
        let usecase = ReportUseCase::new(Arc::new(repo));

        let err = usecase
            .submit_report(
                Uuid::new_v4(),
                SubmitReportModel {
                    service_id: Some(Uuid::new_v4()),
                    reason: Some("   ".to_string()),
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_service_is_not_found() {
        let usecase = ReportUseCase::new(Arc::new(ledger_repo(Arc::new(Mutex::new(
            Ledger::default(),
        )))));

        let err = usecase
            .submit_report(Uuid::new_v4(), report(Uuid::new_v4()))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
