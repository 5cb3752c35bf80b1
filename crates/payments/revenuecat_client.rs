use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::error;

use crate::domain::value_objects::{
    entitlements::{EntitlementState, UserEntitlements},
    enums::entitlement_kinds::EntitlementKind,
};

pub const DEFAULT_REVENUECAT_API_BASE_URL: &str = "https://api.revenuecat.com";

/// Minimal RevenueCat REST client built on reqwest.
pub struct RevenueCatClient {
    http: reqwest::Client,
    secret_api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct SubscriberEnvelope {
    pub subscriber: RevenueCatSubscriber,
}

#[derive(Debug, Deserialize)]
pub struct RevenueCatSubscriber {
    pub original_app_user_id: Option<String>,
    #[serde(default)]
    pub entitlements: HashMap<String, RevenueCatEntitlement>,
}

#[derive(Debug, Deserialize)]
pub struct RevenueCatEntitlement {
    /// `None` for lifetime purchases.
    pub expires_date: Option<DateTime<Utc>>,
    pub product_identifier: Option<String>,
    pub purchase_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct RevenueCatErrorBody {
    code: Option<i64>,
    message: Option<String>,
}

impl RevenueCatSubscriber {
    /// Entitlements the subscriber holds at `now`. Identifiers the app does
    /// not know are ignored.
    pub fn to_user_entitlements(&self, now: DateTime<Utc>) -> UserEntitlements {
        let mut entitlements = UserEntitlements::inactive();

        for kind in EntitlementKind::ALL {
            if let Some(entitlement) = self.entitlements.get(kind.identifier()) {
                let active = entitlement.expires_date.is_none_or(|expires| expires > now);
                *entitlements.get_mut(kind) = EntitlementState {
                    active,
                    expires_at: entitlement.expires_date,
                };
            }
        }

        entitlements
    }
}

impl RevenueCatClient {
    pub fn new(secret_api_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let (revenuecat_code, revenuecat_message) =
            match serde_json::from_str::<RevenueCatErrorBody>(&body) {
                Ok(parsed) => (parsed.code, parsed.message),
                Err(_) => (None, None),
            };

        error!(
            status = %status,
            revenuecat_code = ?revenuecat_code,
            revenuecat_message = ?revenuecat_message,
            response_body = %body,
            context = %context,
            "revenuecat api request failed"
        );

        anyhow::bail!(
            "RevenueCat API request failed: {} (status {})",
            context,
            status
        );
    }

    /// https://www.revenuecat.com/docs/api-v1#tag/customers
    pub async fn get_subscriber(&self, app_user_id: &str) -> Result<RevenueCatSubscriber> {
        let resp = self
            .http
            .get(format!("{}/v1/subscribers/{}", self.base_url, app_user_id))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_api_key))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "get subscriber").await?;

        let envelope: SubscriberEnvelope = resp.json().await?;
        Ok(envelope.subscriber)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn subscriber_entitlements_follow_expiry() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let body = serde_json::json!({
            "subscriber": {
                "original_app_user_id": "3f1d6a7e-0000-4000-8000-000000000001",
                "entitlements": {
                    "ads": {
                        "expires_date": (now + Duration::days(3)).to_rfc3339(),
                        "product_identifier": "ads_monthly",
                        "purchase_date": (now - Duration::days(27)).to_rfc3339()
                    },
                    "premium": {
                        "expires_date": (now - Duration::days(1)).to_rfc3339(),
                        "product_identifier": "premium_monthly",
                        "purchase_date": null
                    },
                    "top_service": {
                        "expires_date": null,
                        "product_identifier": "top_lifetime",
                        "purchase_date": null
                    },
                    "legacy_pro": {
                        "expires_date": null,
                        "product_identifier": "pro",
                        "purchase_date": null
                    }
                }
            }
        });

        let envelope: SubscriberEnvelope = serde_json::from_value(body).unwrap();
        let entitlements = envelope.subscriber.to_user_entitlements(now);

        assert!(entitlements.ads.active);
        assert_eq!(entitlements.ads.expires_at, Some(now + Duration::days(3)));
        assert!(!entitlements.premium.active);
        assert!(entitlements.top_service.active);
        assert_eq!(entitlements.top_service.expires_at, None);
    }
}
