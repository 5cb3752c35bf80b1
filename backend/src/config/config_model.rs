use super::stage::Stage;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub stage: Stage,
    pub backend_server: BackendServer,
    pub database: Database,
    pub supabase: Supabase,
    pub revenuecat: RevenueCat,
    pub directory: Directory,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Supabase {
    pub jwt_secret: String,
}

#[derive(Debug, Clone)]
pub struct RevenueCat {
    /// Shared secret RevenueCat sends in `Authorization`. Unset disables the check.
    pub webhook_secret: Option<String>,
    /// Server-side REST key. Unset disables live subscriber lookups.
    pub secret_api_key: Option<String>,
    pub api_base_url: String,
}

#[derive(Debug, Clone)]
pub struct Directory {
    pub trial_days: i64,
    pub order_seed_ttl_hours: i64,
}
