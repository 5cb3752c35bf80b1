use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::{
    entitlements::{EntitlementChange, EntitlementUpdate},
    enums::entitlement_kinds::EntitlementKind,
};

/// Expiry granted to an activating event that carries no expiration of its own.
/// Kept at 30 days pending product confirmation.
pub const DEFAULT_ENTITLEMENT_DAYS: i64 = 30;

const ACTIVATING_EVENTS: [&str; 6] = [
    "INITIAL_PURCHASE",
    "RENEWAL",
    "PRODUCT_CHANGE",
    "UNCANCELLATION",
    "SUBSCRIPTION_EXTENDED",
    "NON_RENEWING_PURCHASE",
];

const DEACTIVATING_EVENTS: [&str; 4] = [
    "CANCELLATION",
    "EXPIRATION",
    "BILLING_ISSUE",
    "SUBSCRIPTION_PAUSED",
];

#[derive(Debug, Clone, Deserialize)]
pub struct RevenueCatWebhookPayload {
    pub event: RevenueCatEvent,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RevenueCatEvent {
    #[serde(rename = "type")]
    pub type_: String,
    pub app_user_id: Option<String>,
    pub original_app_user_id: Option<String>,
    #[serde(default)]
    pub entitlement_ids: Option<Vec<String>>,
    /// Older payloads carry a single id instead of the list.
    pub entitlement_id: Option<String>,
    pub expiration_at_ms: Option<i64>,
    pub period_end_ms: Option<i64>,
    pub event_timestamp_ms: Option<i64>,
    pub product_id: Option<String>,
    pub subscriber_attributes: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitlementEffect {
    Activate,
    Deactivate,
    Ignore,
}

pub fn classify_event_type(event_type: &str) -> EntitlementEffect {
    let event_type = event_type.trim();
    if ACTIVATING_EVENTS.contains(&event_type) {
        EntitlementEffect::Activate
    } else if DEACTIVATING_EVENTS.contains(&event_type) {
        EntitlementEffect::Deactivate
    } else {
        EntitlementEffect::Ignore
    }
}

impl RevenueCatEvent {
    pub fn effect(&self) -> EntitlementEffect {
        classify_event_type(&self.type_)
    }

    /// Known entitlements named by the event, in order, without duplicates.
    pub fn entitlement_kinds(&self) -> Vec<EntitlementKind> {
        let mut kinds = Vec::new();
        let ids = self
            .entitlement_ids
            .iter()
            .flatten()
            .chain(self.entitlement_id.iter());

        for id in ids {
            if let Ok(kind) = EntitlementKind::from_str(id) {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
        }
        kinds
    }

    /// App user ids are Supabase user ids; anonymous RevenueCat ids fall back
    /// to the original (aliased) id.
    pub fn subscriber_id(&self) -> Option<Uuid> {
        [&self.app_user_id, &self.original_app_user_id]
            .into_iter()
            .flatten()
            .find_map(|raw| Uuid::parse_str(raw.trim()).ok())
    }

    pub fn customer_id(&self) -> Option<String> {
        self.original_app_user_id
            .clone()
            .or_else(|| self.app_user_id.clone())
            .filter(|id| !id.trim().is_empty())
    }

    pub fn explicit_expiry(&self) -> Option<DateTime<Utc>> {
        self.expiration_at_ms
            .or(self.period_end_ms)
            .and_then(ms_to_datetime)
    }

    /// Expiry for an activating event. The fallback is anchored on the event
    /// timestamp so replaying the same event lands on the same value.
    pub fn activation_expiry(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.explicit_expiry().unwrap_or_else(|| {
            let anchor = self
                .event_timestamp_ms
                .and_then(ms_to_datetime)
                .unwrap_or(now);
            anchor + Duration::days(DEFAULT_ENTITLEMENT_DAYS)
        })
    }

    /// Builds the reconciliation for this event, or `None` when the event type
    /// is not one we act on.
    pub fn to_update(&self, user_id: Uuid, now: DateTime<Utc>) -> Option<EntitlementUpdate> {
        let change = match self.effect() {
            EntitlementEffect::Activate => EntitlementChange::Activate {
                expires_at: self.activation_expiry(now),
            },
            EntitlementEffect::Deactivate => EntitlementChange::Deactivate,
            EntitlementEffect::Ignore => return None,
        };

        Some(EntitlementUpdate {
            user_id,
            customer_id: self.customer_id(),
            changes: self
                .entitlement_kinds()
                .into_iter()
                .map(|kind| (kind, change))
                .collect(),
        })
    }
}

fn ms_to_datetime(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WebhookReceiptDto {
    pub received: bool,
    pub event_type: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
    pub entitlements_updated: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(type_: &str, ids: &[&str]) -> RevenueCatEvent {
        RevenueCatEvent {
            type_: type_.to_string(),
            app_user_id: Some("$RCAnonymousID:abc".to_string()),
            original_app_user_id: Some("4b7c8f0e-3c39-4f0f-8a43-8c5d7f8e3b21".to_string()),
            entitlement_ids: Some(ids.iter().map(|s| s.to_string()).collect()),
            entitlement_id: None,
            expiration_at_ms: None,
            period_end_ms: None,
            event_timestamp_ms: Some(1_735_689_600_000),
            product_id: Some("easyuk_premium_monthly".to_string()),
            subscriber_attributes: None,
        }
    }

    #[test]
    fn event_types_are_partitioned() {
        for t in ACTIVATING_EVENTS {
            assert_eq!(classify_event_type(t), EntitlementEffect::Activate);
        }
        for t in DEACTIVATING_EVENTS {
            assert_eq!(classify_event_type(t), EntitlementEffect::Deactivate);
        }
        assert_eq!(classify_event_type("TRANSFER"), EntitlementEffect::Ignore);
        assert_eq!(classify_event_type("TEST"), EntitlementEffect::Ignore);
    }

    #[test]
    fn unknown_and_duplicate_entitlement_ids_are_dropped() {
        let mut e = event("RENEWAL", &["premium", "gold", "premium"]);
        e.entitlement_id = Some("ads".to_string());
        assert_eq!(
            e.entitlement_kinds(),
            vec![EntitlementKind::Premium, EntitlementKind::Ads]
        );
    }

    #[test]
    fn subscriber_id_falls_back_to_original_app_user_id() {
        let e = event("RENEWAL", &["premium"]);
        assert_eq!(
            e.subscriber_id(),
            Some(Uuid::parse_str("4b7c8f0e-3c39-4f0f-8a43-8c5d7f8e3b21").unwrap())
        );
    }

    #[test]
    fn activation_expiry_prefers_event_values_then_thirty_days() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();

        let mut e = event("INITIAL_PURCHASE", &["ads"]);
        e.period_end_ms = Some(1_740_000_000_000);
        assert_eq!(
            e.activation_expiry(now),
            Utc.timestamp_millis_opt(1_740_000_000_000).unwrap()
        );

        e.expiration_at_ms = Some(1_750_000_000_000);
        assert_eq!(
            e.activation_expiry(now),
            Utc.timestamp_millis_opt(1_750_000_000_000).unwrap()
        );

        let fallback = event("INITIAL_PURCHASE", &["ads"]);
        assert_eq!(
            fallback.activation_expiry(now),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(30)
        );

        let mut no_timestamp = event("INITIAL_PURCHASE", &["ads"]);
        no_timestamp.event_timestamp_ms = None;
        assert_eq!(no_timestamp.activation_expiry(now), now + Duration::days(30));
    }

    #[test]
    fn ignored_event_produces_no_update() {
        let e = event("TRANSFER", &["premium"]);
        assert!(e.to_update(Uuid::new_v4(), Utc::now()).is_none());
    }

    #[test]
    fn payload_parses_provider_envelope() {
        let raw = r#"{
            "api_version": "1.0",
            "event": {
                "type": "CANCELLATION",
                "app_user_id": "4b7c8f0e-3c39-4f0f-8a43-8c5d7f8e3b21",
                "original_app_user_id": "4b7c8f0e-3c39-4f0f-8a43-8c5d7f8e3b21",
                "entitlement_ids": ["premium"],
                "product_id": "easyuk_premium_monthly",
                "expiration_at_ms": 1735689600000,
                "subscriber_attributes": {"$email": {"value": "a@b.c"}}
            }
        }"#;
        let payload: RevenueCatWebhookPayload = serde_json::from_str(raw).unwrap();
        assert_eq!(payload.event.effect(), EntitlementEffect::Deactivate);
        assert_eq!(payload.event.entitlement_kinds(), vec![EntitlementKind::Premium]);
    }
}
