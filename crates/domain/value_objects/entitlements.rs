use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::enums::entitlement_kinds::EntitlementKind;

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementState {
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl EntitlementState {
    pub fn active_until(expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            active: true,
            expires_at,
        }
    }
}

/// The three independent product entitlements of one user.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserEntitlements {
    pub ads: EntitlementState,
    pub top_service: EntitlementState,
    pub premium: EntitlementState,
}

impl UserEntitlements {
    pub fn inactive() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: EntitlementKind) -> &EntitlementState {
        match kind {
            EntitlementKind::Ads => &self.ads,
            EntitlementKind::TopService => &self.top_service,
            EntitlementKind::Premium => &self.premium,
        }
    }

    pub fn get_mut(&mut self, kind: EntitlementKind) -> &mut EntitlementState {
        match kind {
            EntitlementKind::Ads => &mut self.ads,
            EntitlementKind::TopService => &mut self.top_service,
            EntitlementKind::Premium => &mut self.premium,
        }
    }

    /// Deactivation keeps the previous expiry so the last paid-through date
    /// stays visible.
    pub fn apply(&mut self, update: &EntitlementUpdate) {
        for (kind, change) in &update.changes {
            let state = self.get_mut(*kind);
            match change {
                EntitlementChange::Activate { expires_at } => {
                    state.active = true;
                    state.expires_at = Some(*expires_at);
                }
                EntitlementChange::Deactivate => {
                    state.active = false;
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitlementChange {
    Activate { expires_at: DateTime<Utc> },
    Deactivate,
}

/// A reconciliation request for one user, derived from a billing event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementUpdate {
    pub user_id: Uuid,
    pub customer_id: Option<String>,
    pub changes: Vec<(EntitlementKind, EntitlementChange)>,
}

impl EntitlementUpdate {
    pub fn change_for(&self, kind: EntitlementKind) -> Option<EntitlementChange> {
        self.changes
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, change)| *change)
    }

    /// Value for the legacy single-flag `profiles.has_ads_entitlement`, when
    /// this update touches the ads entitlement at all.
    pub fn legacy_ads_flag(&self) -> Option<bool> {
        self.change_for(EntitlementKind::Ads)
            .map(|change| matches!(change, EntitlementChange::Activate { .. }))
    }

    pub fn identifiers(&self) -> Vec<String> {
        self.changes
            .iter()
            .map(|(kind, _)| kind.identifier().to_string())
            .collect()
    }
}
