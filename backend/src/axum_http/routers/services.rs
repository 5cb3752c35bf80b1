use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Duration;
use crates::{
    domain::{
        repositories::services::ServiceRepository,
        value_objects::{
            clock::SystemClock,
            services::{DirectoryFilter, RegisterServiceModel},
        },
    },
    infra::{
        cache::{TtlCache, in_memory::InMemoryCacheStore},
        db::{
            postgres::postgres_connection::PgPoolSquad,
            repositories::services::ServicePostgres,
        },
    },
};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::{ApiError, ErrorResponse},
    config::config_model::DotEnvyConfig,
    usecases::directory::DirectoryUseCase,
};

/// One order seed per active viewer.
const DIRECTORY_CACHE_MAX_ENTRIES: u64 = 50_000;

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let clock = Arc::new(SystemClock);
    let service_repository = ServicePostgres::new(Arc::clone(&db_pool));
    let cache_store = InMemoryCacheStore::new(DIRECTORY_CACHE_MAX_ENTRIES, clock.clone());
    let cache = TtlCache::new(Arc::new(cache_store), clock.clone());
    let directory_usecase = DirectoryUseCase::new(
        Arc::new(service_repository),
        cache,
        clock,
        config.directory.trial_days,
        Duration::hours(config.directory.order_seed_ttl_hours),
    );

    Router::new()
        .route("/", get(list_services).post(register_service))
        .route("/:id", get(get_service).delete(delete_service))
        .with_state(Arc::new(directory_usecase))
}

pub async fn register_service<S>(
    State(directory_usecase): State<Arc<DirectoryUseCase<S>>>,
    AuthUser { user_id, .. }: AuthUser,
    payload: Result<Json<RegisterServiceModel>, JsonRejection>,
) -> impl IntoResponse
where
    S: ServiceRepository + Send + Sync + 'static,
{
    let Json(model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return ErrorResponse::from(rejection).into_response(),
    };

    match directory_usecase.register(user_id, model).await {
        Ok(service) => (StatusCode::CREATED, Json(service)).into_response(),
        Err(err) => err.into_error_response().into_response(),
    }
}

pub async fn list_services<S>(
    State(directory_usecase): State<Arc<DirectoryUseCase<S>>>,
    AuthUser { user_id, .. }: AuthUser,
    Query(filter): Query<DirectoryFilter>,
) -> impl IntoResponse
where
    S: ServiceRepository + Send + Sync + 'static,
{
    match directory_usecase.list(user_id, filter).await {
        Ok(services) => (StatusCode::OK, Json(services)).into_response(),
        Err(err) => err.into_error_response().into_response(),
    }
}

pub async fn get_service<S>(
    State(directory_usecase): State<Arc<DirectoryUseCase<S>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(service_id): Path<Uuid>,
) -> impl IntoResponse
where
    S: ServiceRepository + Send + Sync + 'static,
{
    match directory_usecase.get(user_id, service_id).await {
        Ok(service) => (StatusCode::OK, Json(service)).into_response(),
        Err(err) => err.into_error_response().into_response(),
    }
}

pub async fn delete_service<S>(
    State(directory_usecase): State<Arc<DirectoryUseCase<S>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(service_id): Path<Uuid>,
) -> impl IntoResponse
where
    S: ServiceRepository + Send + Sync + 'static,
{
    match directory_usecase.delete(user_id, service_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_error_response().into_response(),
    }
}
