use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppRole {
    Admin,
    Moderator,
    User,
}

impl AppRole {
    /// Roles allowed to run moderator actions.
    pub const MODERATION: [AppRole; 2] = [AppRole::Moderator, AppRole::Admin];
}

impl Display for AppRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let role = match self {
            AppRole::Admin => "admin",
            AppRole::Moderator => "moderator",
            AppRole::User => "user",
        };
        write!(f, "{}", role)
    }
}

impl FromStr for AppRole {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "admin" => Ok(AppRole::Admin),
            "moderator" => Ok(AppRole::Moderator),
            "user" => Ok(AppRole::User),
            other => Err(format!("Unsupported role: {}", other)),
        }
    }
}
