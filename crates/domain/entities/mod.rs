pub mod owner_bans;
pub mod service_reports;
pub mod services;
pub mod user_entitlements;
pub mod user_lists;
