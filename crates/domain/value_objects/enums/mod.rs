pub mod advertisement_statuses;
pub mod app_roles;
pub mod entitlement_kinds;
pub mod moderation_statuses;
pub mod service_statuses;
pub mod subscription_tiers;
