use std::sync::Arc;

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get,
};
use crates::{
    domain::value_objects::clock::SystemClock,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::entitlements::EntitlementPostgres,
    },
    payments::revenuecat_client::RevenueCatClient,
};
use tracing::info;

use crate::{
    auth::AuthUser,
    config::config_model::DotEnvyConfig,
    usecases::entitlement_resolver::{
        EntitlementResolver, EntitlementResolverUseCase, NativeBillingResolver,
        PlatformCapabilities, ServerEntitlementResolver,
    },
};

pub fn routes(db_pool: Arc<PgPoolSquad>, config: Arc<DotEnvyConfig>) -> Router {
    let entitlement_repository = EntitlementPostgres::new(Arc::clone(&db_pool));
    let server: Arc<dyn EntitlementResolver> =
        Arc::new(ServerEntitlementResolver::new(Arc::new(entitlement_repository)));

    let native = config.revenuecat.secret_api_key.clone().map(|secret_api_key| {
        let client = RevenueCatClient::new(secret_api_key, config.revenuecat.api_base_url.clone());
        Arc::new(NativeBillingResolver::new(Arc::new(client), Arc::new(SystemClock)))
            as Arc<dyn EntitlementResolver>
    });

    let capabilities = PlatformCapabilities {
        native_billing: native.is_some(),
    };
    info!(
        native_billing = capabilities.native_billing,
        "entitlements: resolver chain configured"
    );

    let resolver_usecase = EntitlementResolverUseCase::new(capabilities, native, server);

    Router::new()
        .route("/me", get(my_entitlements))
        .with_state(Arc::new(resolver_usecase))
}

pub async fn my_entitlements(
    State(resolver_usecase): State<Arc<EntitlementResolverUseCase>>,
    AuthUser { user_id, .. }: AuthUser,
) -> impl IntoResponse {
    let resolved = resolver_usecase.resolve(user_id).await;
    (StatusCode::OK, Json(resolved)).into_response()
}
