use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::{moderation::ModerationRepository, roles::RoleRepository},
        value_objects::moderation::ModeratorActionModel,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{moderation::ModerationPostgres, roles::RolePostgres},
    },
};
use tracing::info;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::{ApiError, ErrorResponse},
    usecases::moderation::ModerationUseCase,
};

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let moderation_repository = ModerationPostgres::new(Arc::clone(&db_pool));
    let role_repository = RolePostgres::new(Arc::clone(&db_pool));
    let moderation_usecase =
        ModerationUseCase::new(Arc::new(moderation_repository), Arc::new(role_repository));

    Router::new()
        .route("/actions", post(moderator_action))
        .route("/queue", get(review_queue))
        .with_state(Arc::new(moderation_usecase))
}

pub async fn moderator_action<M, R>(
    State(moderation_usecase): State<Arc<ModerationUseCase<M, R>>>,
    AuthUser { user_id, .. }: AuthUser,
    payload: Result<Json<ModeratorActionModel>, JsonRejection>,
) -> impl IntoResponse
where
    M: ModerationRepository + Send + Sync + 'static,
    R: RoleRepository + Send + Sync + 'static,
{
    let Json(model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return ErrorResponse::from(rejection).into_response(),
    };
    info!(%user_id, action = ?model.action, "moderation: action request received");

    match moderation_usecase.execute(user_id, model).await {
        Ok(dto) => (StatusCode::OK, Json(dto)).into_response(),
        Err(err) => err.into_error_response().into_response(),
    }
}

pub async fn review_queue<M, R>(
    State(moderation_usecase): State<Arc<ModerationUseCase<M, R>>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse
where
    M: ModerationRepository + Send + Sync + 'static,
    R: RoleRepository + Send + Sync + 'static,
{
    match moderation_usecase.review_queue(user_id).await {
        Ok(queue) => (StatusCode::OK, Json(queue)).into_response(),
        Err(err) => err.into_error_response().into_response(),
    }
}
