use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    #[default]
    Active,
    UnderReview,
    Suspended,
}

impl Display for ModerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            ModerationStatus::Active => "active",
            ModerationStatus::UnderReview => "under_review",
            ModerationStatus::Suspended => "suspended",
        };
        write!(f, "{}", status)
    }
}

impl ModerationStatus {
    /// Unknown column values are read as `under_review` so they surface in the
    /// moderation queue instead of silently staying public.
    pub fn from_str(value: &str) -> Self {
        match value {
            "active" => ModerationStatus::Active,
            "under_review" => ModerationStatus::UnderReview,
            "suspended" => ModerationStatus::Suspended,
            _ => ModerationStatus::UnderReview,
        }
    }
}
