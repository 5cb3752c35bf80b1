use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use crates::{
    domain::{
        repositories::lists::ListRepository,
        value_objects::{
            clock::SystemClock,
            lists::{CreateListItemModel, CreateListModel, UpdateListItemModel, UpdateListModel},
        },
    },
    infra::db::{postgres::postgres_connection::PgPoolSquad, repositories::lists::ListPostgres},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::error_responses::{ApiError, ErrorResponse},
    usecases::lists::ListUseCase,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub include_archived: bool,
}

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let list_repository = ListPostgres::new(Arc::clone(&db_pool));
    let list_usecase = ListUseCase::new(Arc::new(list_repository), Arc::new(SystemClock));

    Router::new()
        .route("/", get(list_lists).post(create_list))
        .route("/:id", get(get_list).patch(update_list).delete(delete_list))
        .route("/:id/items", post(add_item))
        .route("/:id/items/:item_id", patch(update_item).delete(delete_item))
        .with_state(Arc::new(list_usecase))
}

pub async fn list_lists<L>(
    State(list_usecase): State<Arc<ListUseCase<L>>>,
    AuthUser { user_id, .. }: AuthUser,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse
where
    L: ListRepository + Send + Sync + 'static,
{
    match list_usecase.list(user_id, query.include_archived).await {
        Ok(lists) => (StatusCode::OK, Json(lists)).into_response(),
        Err(err) => err.into_error_response().into_response(),
    }
}

pub async fn get_list<L>(
    State(list_usecase): State<Arc<ListUseCase<L>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(list_id): Path<Uuid>,
) -> impl IntoResponse
where
    L: ListRepository + Send + Sync + 'static,
{
    match list_usecase.get(user_id, list_id).await {
        Ok(list) => (StatusCode::OK, Json(list)).into_response(),
        Err(err) => err.into_error_response().into_response(),
    }
}

pub async fn create_list<L>(
    State(list_usecase): State<Arc<ListUseCase<L>>>,
    AuthUser { user_id, .. }: AuthUser,
    payload: Result<Json<CreateListModel>, JsonRejection>,
) -> impl IntoResponse
where
    L: ListRepository + Send + Sync + 'static,
{
    let Json(model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return ErrorResponse::from(rejection).into_response(),
    };

    match list_usecase.create(user_id, model).await {
        Ok(list) => (StatusCode::CREATED, Json(list)).into_response(),
        Err(err) => err.into_error_response().into_response(),
    }
}

pub async fn update_list<L>(
    State(list_usecase): State<Arc<ListUseCase<L>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(list_id): Path<Uuid>,
    payload: Result<Json<UpdateListModel>, JsonRejection>,
) -> impl IntoResponse
where
    L: ListRepository + Send + Sync + 'static,
{
    let Json(model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return ErrorResponse::from(rejection).into_response(),
    };

    match list_usecase.update(user_id, list_id, model).await {
        Ok(list) => (StatusCode::OK, Json(list)).into_response(),
        Err(err) => err.into_error_response().into_response(),
    }
}

pub async fn delete_list<L>(
    State(list_usecase): State<Arc<ListUseCase<L>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(list_id): Path<Uuid>,
) -> impl IntoResponse
where
    L: ListRepository + Send + Sync + 'static,
{
    match list_usecase.delete(user_id, list_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_error_response().into_response(),
    }
}

pub async fn add_item<L>(
    State(list_usecase): State<Arc<ListUseCase<L>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path(list_id): Path<Uuid>,
    payload: Result<Json<CreateListItemModel>, JsonRejection>,
) -> impl IntoResponse
where
    L: ListRepository + Send + Sync + 'static,
{
    let Json(model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return ErrorResponse::from(rejection).into_response(),
    };

    match list_usecase.add_item(user_id, list_id, model).await {
        Ok(mutation) => (StatusCode::CREATED, Json(mutation)).into_response(),
        Err(err) => err.into_error_response().into_response(),
    }
}

pub async fn update_item<L>(
    State(list_usecase): State<Arc<ListUseCase<L>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path((list_id, item_id)): Path<(Uuid, Uuid)>,
    payload: Result<Json<UpdateListItemModel>, JsonRejection>,
) -> impl IntoResponse
where
    L: ListRepository + Send + Sync + 'static,
{
    let Json(model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return ErrorResponse::from(rejection).into_response(),
    };

    match list_usecase.update_item(user_id, list_id, item_id, model).await {
        Ok(mutation) => (StatusCode::OK, Json(mutation)).into_response(),
        Err(err) => err.into_error_response().into_response(),
    }
}

pub async fn delete_item<L>(
    State(list_usecase): State<Arc<ListUseCase<L>>>,
    AuthUser { user_id, .. }: AuthUser,
    Path((list_id, item_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse
where
    L: ListRepository + Send + Sync + 'static,
{
    match list_usecase.delete_item(user_id, list_id, item_id).await {
        Ok(mutation) => (StatusCode::OK, Json(mutation)).into_response(),
        Err(err) => err.into_error_response().into_response(),
    }
}
