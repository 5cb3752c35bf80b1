use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use crates::{
    domain::{
        repositories::reports::ReportRepository,
        value_objects::moderation::SubmitReportModel,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::reports::ReportPostgres,
    },
};
use tracing::info;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::{ApiError, ErrorResponse},
    usecases::reports::ReportUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let report_repository = ReportPostgres::new(Arc::clone(&db_pool));
    let report_usecase = ReportUseCase::new(Arc::new(report_repository));

    Router::new()
        .route("/", post(submit_report))
        .with_state(Arc::new(report_usecase))
}

pub async fn submit_report<R>(
    State(report_usecase): State<Arc<ReportUseCase<R>>>,
    AuthUser { user_id, .. }: AuthUser,
    payload: Result<Json<SubmitReportModel>, JsonRejection>,
) -> impl IntoResponse
where
    R: ReportRepository + Send + Sync + 'static,
{
    let Json(model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return ErrorResponse::from(rejection).into_response(),
    };
    info!(%user_id, service_id = ?model.service_id, "reports: submit request received");

    match report_usecase.submit_report(user_id, model).await {
        Ok(dto) => (StatusCode::OK, Json(dto)).into_response(),
        Err(err) => err.into_error_response().into_response(),
    }
}
