use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Products gated by a RevenueCat entitlement. The identifiers match the
/// entitlement ids configured in the RevenueCat dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementKind {
    Ads,
    TopService,
    Premium,
}

impl EntitlementKind {
    pub const ALL: [EntitlementKind; 3] = [
        EntitlementKind::Ads,
        EntitlementKind::TopService,
        EntitlementKind::Premium,
    ];

    pub fn identifier(&self) -> &'static str {
        match self {
            EntitlementKind::Ads => "ads",
            EntitlementKind::TopService => "top_service",
            EntitlementKind::Premium => "premium",
        }
    }
}

impl Display for EntitlementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for EntitlementKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "ads" => Ok(EntitlementKind::Ads),
            "top_service" => Ok(EntitlementKind::TopService),
            "premium" => Ok(EntitlementKind::Premium),
            other => Err(format!("Unknown entitlement: {}", other)),
        }
    }
}
