pub mod entitlements;
pub mod lists;
pub mod moderation;
pub mod reports;
pub mod roles;
pub mod services;
pub mod trials;
