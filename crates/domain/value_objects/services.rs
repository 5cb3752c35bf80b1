use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::services::{InsertServiceEntity, ServiceEntity},
    value_objects::enums::{
        moderation_statuses::ModerationStatus, service_statuses::ServiceStatus,
        subscription_tiers::SubscriptionTier,
    },
};

pub const DEFAULT_TRIAL_DAYS: i64 = 30;

/// Longest trial window a deployment may configure.
pub const MAX_TRIAL_DAYS: i64 = 365;

/// End of a trial that starts at `start`. `None` unless `trial_days` is in
/// `1..=MAX_TRIAL_DAYS`.
pub fn trial_end_after(start: DateTime<Utc>, trial_days: i64) -> Option<DateTime<Utc>> {
    if !(1..=MAX_TRIAL_DAYS).contains(&trial_days) {
        return None;
    }
    Duration::try_days(trial_days).and_then(|window| start.checked_add_signed(window))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterServiceModel {
    pub name: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

impl RegisterServiceModel {
    /// New listings start on a free trial, unmoderated and on the standard tier.
    pub fn to_entity(
        &self,
        owner_user_id: Uuid,
        now: DateTime<Utc>,
        trial_days: i64,
    ) -> Result<InsertServiceEntity, String> {
        let name = required(&self.name, "name")?;
        let category = required(&self.category, "category")?;
        let trial_end = trial_end_after(now, trial_days)
            .ok_or_else(|| format!("trial length of {trial_days} days is out of range"))?;

        Ok(InsertServiceEntity {
            owner_user_id,
            name,
            category,
            city: optional(&self.city),
            description: optional(&self.description),
            phone: optional(&self.phone),
            website: optional(&self.website),
            reports_count: 0,
            moderation_status: ModerationStatus::Active.to_string(),
            subscription_tier: SubscriptionTier::Standard.to_string(),
            status: ServiceStatus::Trial.as_str().to_string(),
            trial_start: Some(now),
            trial_end: Some(trial_end),
        })
    }
}

fn required(value: &Option<String>, field: &str) -> Result<String, String> {
    optional(value).ok_or_else(|| format!("{field} is required"))
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryFilter {
    pub category: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDto {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub name: String,
    pub category: String,
    pub city: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub subscription_tier: SubscriptionTier,
    pub moderation_status: ModerationStatus,
    pub status: String,
    pub trial_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<ServiceEntity> for ServiceDto {
    fn from(value: ServiceEntity) -> Self {
        Self {
            id: value.id,
            owner_user_id: value.owner_user_id,
            name: value.name,
            category: value.category,
            city: value.city,
            description: value.description,
            phone: value.phone,
            website: value.website,
            subscription_tier: SubscriptionTier::from_str(&value.subscription_tier),
            moderation_status: ModerationStatus::from_str(&value.moderation_status),
            status: value.status,
            trial_end: value.trial_end,
            created_at: value.created_at,
        }
    }
}
