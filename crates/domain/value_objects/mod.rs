pub mod clock;
pub mod entitlements;
pub mod enums;
pub mod lists;
pub mod moderation;
pub mod revenuecat_webhook;
pub mod services;
pub mod trials;
