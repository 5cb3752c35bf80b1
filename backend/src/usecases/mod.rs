pub mod directory;
pub mod entitlement_resolver;
pub mod lists;
pub mod moderation;
pub mod reports;
pub mod revenuecat_webhook;
