use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    #[default]
    Standard,
    Top,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Standard => "standard",
            SubscriptionTier::Top => "top",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "top" => SubscriptionTier::Top,
            _ => SubscriptionTier::Standard,
        }
    }
}

impl Display for SubscriptionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
