pub mod entitlements;
pub mod lists;
pub mod moderation;
pub mod reports;
pub mod revenuecat_webhook;
pub mod services;
