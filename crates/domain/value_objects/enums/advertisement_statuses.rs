use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdvertisementStatus {
    Trial,
    Active,
    Expired,
}

impl Display for AdvertisementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            AdvertisementStatus::Trial => "trial",
            AdvertisementStatus::Active => "active",
            AdvertisementStatus::Expired => "expired",
        };
        write!(f, "{}", status)
    }
}
