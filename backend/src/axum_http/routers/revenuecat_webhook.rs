use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::IntoResponse,
    routing::post,
};
use crates::{
    domain::{
        repositories::entitlements::EntitlementRepository,
        value_objects::clock::SystemClock,
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::entitlements::EntitlementPostgres,
    },
};

use crate::{
    axum_http::error_responses::ApiError, config::config_model::DotEnvyConfig,
    usecases::revenuecat_webhook::RevenueCatWebhookUseCase,
};

// Run example
//   curl -X POST "http://localhost:$SERVER_PORT_BACKEND/api/v1/webhooks/revenuecat" \
//     -H "Authorization: Bearer $REVENUECAT_WEBHOOK_SECRET" \
//     -H "Content-Type: application/json" \
//     -d '{"event":{"type":"RENEWAL","app_user_id":"<uuid>","entitlement_ids":["premium"]}}'

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let entitlement_repository = EntitlementPostgres::new(Arc::clone(&db_pool));
    let webhook_usecase = RevenueCatWebhookUseCase::new(
        Arc::new(entitlement_repository),
        Arc::new(SystemClock),
        config.revenuecat.webhook_secret.clone(),
    );

    Router::new()
        .route("/revenuecat", post(revenuecat_webhook))
        .with_state(Arc::new(webhook_usecase))
}

pub async fn revenuecat_webhook<E>(
    State(webhook_usecase): State<Arc<RevenueCatWebhookUseCase<E>>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse
where
    E: EntitlementRepository + Send + Sync + 'static,
{
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match webhook_usecase.handle(authorization, &body).await {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(err) => err.into_error_response().into_response(),
    }
}
