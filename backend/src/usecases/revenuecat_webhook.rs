use std::sync::Arc;

use axum::http::StatusCode;
use crates::domain::{
    repositories::entitlements::EntitlementRepository,
    value_objects::{
        clock::Clock,
        revenuecat_webhook::{EntitlementEffect, RevenueCatWebhookPayload, WebhookReceiptDto},
    },
};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::axum_http::error_responses::ApiError;

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Invalid webhook authorization")]
    Unauthorized,
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
    #[error("Event does not identify an app user")]
    MissingUser,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError for WebhookError {
    fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::Unauthorized => StatusCode::UNAUTHORIZED,
            WebhookError::InvalidPayload(_) | WebhookError::MissingUser => StatusCode::BAD_REQUEST,
            WebhookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            WebhookError::Unauthorized => "UNAUTHORIZED",
            WebhookError::InvalidPayload(_) => "INVALID_PAYLOAD",
            WebhookError::MissingUser => "MISSING_APP_USER_ID",
            WebhookError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, WebhookError>;

pub struct RevenueCatWebhookUseCase<E>
where
    E: EntitlementRepository + Send + Sync + 'static,
{
    entitlement_repo: Arc<E>,
    clock: Arc<dyn Clock>,
    webhook_secret: Option<String>,
}

impl<E> RevenueCatWebhookUseCase<E>
where
    E: EntitlementRepository + Send + Sync + 'static,
{
    pub fn new(
        entitlement_repo: Arc<E>,
        clock: Arc<dyn Clock>,
        webhook_secret: Option<String>,
    ) -> Self {
        if webhook_secret.is_none() {
            warn!("revenuecat_webhook: REVENUECAT_WEBHOOK_SECRET is not set; accepting unauthenticated webhooks");
        }

        Self {
            entitlement_repo,
            clock,
            webhook_secret,
        }
    }

    /// Accepts the raw secret or `Bearer <secret>`. Digests are compared so the
    /// comparison does not depend on where the inputs first differ.
    fn authorize(&self, authorization: Option<&str>) -> UseCaseResult<()> {
        let Some(secret) = self.webhook_secret.as_deref() else {
            return Ok(());
        };

        let provided = authorization
            .map(str::trim)
            .map(|value| value.strip_prefix("Bearer ").unwrap_or(value))
            .ok_or(WebhookError::Unauthorized)?;

        if Sha256::digest(provided.as_bytes()) == Sha256::digest(secret.as_bytes()) {
            Ok(())
        } else {
            Err(WebhookError::Unauthorized)
        }
    }

    pub async fn handle(
        &self,
        authorization: Option<&str>,
        body: &[u8],
    ) -> UseCaseResult<WebhookReceiptDto> {
        if let Err(err) = self.authorize(authorization) {
            warn!("revenuecat_webhook: rejected request with bad authorization");
            return Err(err);
        }

        let payload: RevenueCatWebhookPayload = serde_json::from_slice(body).map_err(|err| {
            warn!(error = %err, "revenuecat_webhook: unparseable payload");
            WebhookError::InvalidPayload(err.to_string())
        })?;
        let event = payload.event;
        let event_type = event.type_.clone();
        let effect = event.effect();

        if effect == EntitlementEffect::Ignore {
            info!(event_type = %event_type, "revenuecat_webhook: event type skipped");
            return Ok(WebhookReceiptDto {
                received: true,
                event_type,
                skipped: true,
                entitlements_updated: Vec::new(),
            });
        }

        let user_id = event.subscriber_id().ok_or_else(|| {
            warn!(
                event_type = %event_type,
                app_user_id = ?event.app_user_id,
                "revenuecat_webhook: no usable app user id"
            );
            WebhookError::MissingUser
        })?;

        let mut entitlements_updated = Vec::new();
        if let Some(update) = event.to_update(user_id, self.clock.now()) {
            if update.changes.is_empty() {
                info!(
                    %user_id,
                    event_type = %event_type,
                    entitlement_ids = ?event.entitlement_ids,
                    "revenuecat_webhook: no known entitlements in event"
                );
            } else {
                entitlements_updated = update.identifiers();
                let stored = self
                    .entitlement_repo
                    .apply_update(update)
                    .await
                    .map_err(|err| {
                        error!(
                            %user_id,
                            event_type = %event_type,
                            db_error = ?err,
                            "revenuecat_webhook: failed to apply entitlement update"
                        );
                        WebhookError::Internal(err)
                    })?;
                info!(
                    %user_id,
                    event_type = %event_type,
                    ads_active = stored.ads.active,
                    top_service_active = stored.top_service.active,
                    premium_active = stored.premium.active,
                    "revenuecat_webhook: entitlements reconciled"
                );
            }
        }

        if effect == EntitlementEffect::Deactivate {
            let expired = self.entitlement_repo.expire_trial_ads().await.map_err(|err| {
                error!(db_error = ?err, "revenuecat_webhook: failed to expire trial ads");
                WebhookError::Internal(err)
            })?;
            info!(expired, "revenuecat_webhook: trial ads expired");
        }

        Ok(WebhookReceiptDto {
            received: true,
            event_type,
            skipped: false,
            entitlements_updated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use crates::domain::{
        repositories::entitlements::MockEntitlementRepository,
        value_objects::{
            clock::FixedClock,
            entitlements::{EntitlementChange, EntitlementState, UserEntitlements},
            enums::entitlement_kinds::EntitlementKind,
        },
    };
    use std::sync::Mutex;

    const USER: &str = "4b7c8f0e-3c39-4f0f-8a43-8c5d7f8e3b21";

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap(),
        ))
    }

    fn body(event_type: &str, entitlement_ids: &[&str]) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "event": {
                "type": event_type,
                "app_user_id": USER,
                "original_app_user_id": USER,
                "entitlement_ids": entitlement_ids,
                "event_timestamp_ms": 1_748_736_000_000_i64,
                "product_id": "easyuk_premium_monthly"
            }
        }))
        .unwrap()
    }

    /// Mock store that applies updates to one in-memory row.
    fn stateful_repo(state: Arc<Mutex<UserEntitlements>>) -> MockEntitlementRepository {
        let mut repo = MockEntitlementRepository::new();
        repo.expect_apply_update().returning(move |update| {
            let mut row = state.lock().unwrap();
            row.apply(&update);
            Ok(*row)
        });
        repo
    }

    #[tokio::test]
    async fn cancellation_deactivates_keeps_expiry_and_expires_trial_ads_once() {
        let expiry = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        let state = Arc::new(Mutex::new(UserEntitlements {
            premium: EntitlementState::active_until(Some(expiry)),
            ..UserEntitlements::inactive()
        }));

        let mut repo = stateful_repo(Arc::clone(&state));
        repo.expect_expire_trial_ads().times(1).returning(|| Ok(2));

        let usecase = RevenueCatWebhookUseCase::new(Arc::new(repo), clock(), None);
        let receipt = usecase
            .handle(None, &body("CANCELLATION", &["premium"]))
            .await
            .unwrap();

        assert_eq!(receipt.entitlements_updated, vec!["premium".to_string()]);
        let row = *state.lock().unwrap();
        assert!(!row.premium.active);
        assert_eq!(row.premium.expires_at, Some(expiry));
    }

    #[tokio::test]
    async fn replaying_an_event_leaves_the_same_state() {
        let state = Arc::new(Mutex::new(UserEntitlements::inactive()));
        let clock = clock();

        let repo = stateful_repo(Arc::clone(&state));
        let usecase = RevenueCatWebhookUseCase::new(Arc::new(repo), clock.clone(), None);
        let event = body("INITIAL_PURCHASE", &["ads", "top_service"]);

        usecase.handle(None, &event).await.unwrap();
        let first = *state.lock().unwrap();

        clock.advance(Duration::hours(6));
        usecase.handle(None, &event).await.unwrap();
        let second = *state.lock().unwrap();

        assert_eq!(first, second);
        assert!(second.ads.active);
        assert_eq!(
            second.ads.expires_at,
            Some(Utc.timestamp_millis_opt(1_748_736_000_000).unwrap() + Duration::days(30))
        );
        assert!(!second.premium.active);
    }

    #[tokio::test]
    async fn activation_never_touches_trial_ads() {
        let mut repo = MockEntitlementRepository::new();
        repo.expect_apply_update()
            .withf(|update| {
                matches!(
                    update.change_for(EntitlementKind::Premium),
                    Some(EntitlementChange::Activate { .. })
                )
            })
            .returning(|_| Ok(UserEntitlements::inactive()));
        repo.expect_expire_trial_ads().never();

        let usecase = RevenueCatWebhookUseCase::new(Arc::new(repo), clock(), None);
        let receipt = usecase
            .handle(None, &body("RENEWAL", &["premium"]))
            .await
            .unwrap();
        assert!(!receipt.skipped);
    }

    #[tokio::test]
    async fn unhandled_event_type_is_skipped() {
        let mut repo = MockEntitlementRepository::new();
        repo.expect_apply_update().never();
        repo.expect_expire_trial_ads().never();

        let usecase = RevenueCatWebhookUseCase::new(Arc::new(repo), clock(), None);
        let receipt = usecase
            .handle(None, &body("TRANSFER", &["premium"]))
            .await
            .unwrap();

        assert!(receipt.skipped);
        assert_eq!(receipt.event_type, "TRANSFER");
    }

    #[tokio::test]
    async fn configured_secret_is_enforced() {
        let mut repo = MockEntitlementRepository::new();
        repo.expect_apply_update()
            .times(1)
            .returning(|_| Ok(UserEntitlements::inactive()));

        let usecase = RevenueCatWebhookUseCase::new(
            Arc::new(repo),
            clock(),
            Some("whsec_test".to_string()),
        );
        let event = body("RENEWAL", &["ads"]);

        let missing = usecase.handle(None, &event).await.unwrap_err();
        assert_eq!(missing.status_code(), StatusCode::UNAUTHORIZED);

        let wrong = usecase.handle(Some("Bearer nope"), &event).await.unwrap_err();
        assert!(matches!(wrong, WebhookError::Unauthorized));

        assert!(usecase.handle(Some("Bearer whsec_test"), &event).await.is_ok());
    }

    #[tokio::test]
    async fn malformed_body_and_missing_user_are_bad_requests() {
        let usecase =
            RevenueCatWebhookUseCase::new(Arc::new(MockEntitlementRepository::new()), clock(), None);

        let malformed = usecase.handle(None, b"{not json").await.unwrap_err();
        assert_eq!(malformed.code(), "INVALID_PAYLOAD");

        let anonymous = serde_json::to_vec(&serde_json::json!({
            "event": {
                "type": "RENEWAL",
                "app_user_id": "$RCAnonymousID:123",
                "entitlement_ids": ["ads"]
            }
        }))
        .unwrap();
        let missing = usecase.handle(None, &anonymous).await.unwrap_err();
        assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
    }
}
