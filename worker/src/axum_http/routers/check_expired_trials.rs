use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::post,
};
use crates::domain::repositories::trials::TrialRepository;
use serde::Serialize;
use tracing::{error, warn};

use crate::{
    config::config_model::DotEnvyConfig,
    usecases::check_expired_trials::CheckExpiredTrialsUseCase,
};

// Run example
//   curl -X POST "http://localhost:$SERVER_PORT_WORKER/internal/v1/trials/check-expired" \
//     -H "Authorization: Bearer $INTERNAL_CRON_TOKEN"

/// Same `{error, code}` body the public API returns.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

fn error_response(status: StatusCode, code: &'static str, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
            code,
        }),
    )
        .into_response()
}

pub struct TrialSweepRouteState<T>
where
    T: TrialRepository + Send + Sync,
{
    config: Arc<DotEnvyConfig>,
    usecase: Arc<CheckExpiredTrialsUseCase<T>>,
}

impl<T> Clone for TrialSweepRouteState<T>
where
    T: TrialRepository + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            usecase: Arc::clone(&self.usecase),
        }
    }
}

pub fn routes<T>(config: Arc<DotEnvyConfig>, usecase: Arc<CheckExpiredTrialsUseCase<T>>) -> Router
where
    T: TrialRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/check-expired", post(check_expired_trials))
        .with_state(TrialSweepRouteState { config, usecase })
}

pub async fn check_expired_trials<T>(
    State(state): State<TrialSweepRouteState<T>>,
    headers: HeaderMap,
) -> Response
where
    T: TrialRepository + Send + Sync + 'static,
{
    let expected_token = match state.config.trial_sweep.internal_token.as_deref() {
        Some(token) => token,
        None => {
            return error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "CRON_DISABLED",
                "cron token is not configured",
            );
        }
    };

    if let Err(status) = authorize_bearer(&headers, expected_token) {
        warn!("check_expired_trials: rejected request with a bad bearer token");
        return error_response(status, "UNAUTHORIZED", "unauthorized");
    }

    match state.usecase.run().await {
        Ok(result) => Json(result).into_response(),
        Err(err) => {
            error!(error = ?err, "check_expired_trials: usecase failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "trial sweep failed",
            )
        }
    }
}

fn authorize_bearer(headers: &HeaderMap, expected_token: &str) -> Result<(), StatusCode> {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if token == expected_token {
        Ok(())
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::HeaderValue};
    use serde_json::{Value, json};

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_must_match() {
        assert!(authorize_bearer(&headers_with("Bearer cron-secret"), "cron-secret").is_ok());
        assert_eq!(
            authorize_bearer(&headers_with("Bearer nope"), "cron-secret"),
            Err(StatusCode::UNAUTHORIZED)
        );
        assert_eq!(
            authorize_bearer(&headers_with("cron-secret"), "cron-secret"),
            Err(StatusCode::UNAUTHORIZED)
        );
        assert_eq!(
            authorize_bearer(&HeaderMap::new(), "cron-secret"),
            Err(StatusCode::UNAUTHORIZED)
        );
    }

    #[tokio::test]
    async fn failure_body_uses_error_code_shape() {
        let response = error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "trial sweep failed",
        );
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({"error": "trial sweep failed", "code": "INTERNAL_ERROR"})
        );
    }
}
