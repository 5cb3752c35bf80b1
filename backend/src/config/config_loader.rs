use anyhow::{Context, Result, bail};
use crates::{
    domain::value_objects::services::{DEFAULT_TRIAL_DAYS, MAX_TRIAL_DAYS},
    payments::revenuecat_client::DEFAULT_REVENUECAT_API_BASE_URL,
};

use super::{
    config_model::{BackendServer, Database, Directory, DotEnvyConfig, RevenueCat, Supabase},
    stage::Stage,
};

const DEFAULT_ORDER_SEED_TTL_HOURS: i64 = 24;
const MAX_ORDER_SEED_TTL_HOURS: i64 = 24 * 30;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required("SERVER_PORT_BACKEND")?
            .parse()
            .context("SERVER_PORT_BACKEND is invalid")?,
        body_limit: required("SERVER_BODY_LIMIT")?
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: required("SERVER_TIMEOUT")?
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let supabase = Supabase {
        jwt_secret: required("SUPABASE_JWT_SECRET")?,
    };

    let revenuecat = RevenueCat {
        webhook_secret: optional("REVENUECAT_WEBHOOK_SECRET"),
        secret_api_key: optional("REVENUECAT_SECRET_API_KEY"),
        api_base_url: optional("REVENUECAT_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_REVENUECAT_API_BASE_URL.to_string()),
    };

    let directory = Directory {
        trial_days: bounded(
            "TRIAL_DAYS",
            optional("TRIAL_DAYS"),
            DEFAULT_TRIAL_DAYS,
            MAX_TRIAL_DAYS,
        )?,
        order_seed_ttl_hours: bounded(
            "DIRECTORY_ORDER_SEED_TTL_HOURS",
            optional("DIRECTORY_ORDER_SEED_TTL_HOURS"),
            DEFAULT_ORDER_SEED_TTL_HOURS,
            MAX_ORDER_SEED_TTL_HOURS,
        )?,
    };

    Ok(DotEnvyConfig {
        stage: get_stage(),
        backend_server,
        database,
        supabase,
        revenuecat,
        directory,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or_default();
    Stage::try_from(&stage_str).unwrap_or_default()
}

pub fn get_supabase_secret() -> Result<String> {
    dotenvy::dotenv().ok();

    required("SUPABASE_JWT_SECRET")
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is invalid"))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parses an optional integer setting that must fall in `1..=max`.
fn bounded(key: &str, raw: Option<String>, default: i64, max: i64) -> Result<i64> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    let value: i64 = raw
        .parse()
        .with_context(|| format!("{key} is invalid"))?;
    if !(1..=max).contains(&value) {
        bail!("{key} must be between 1 and {max}, got {value}");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_value_falls_back_to_default() {
        assert_eq!(
            bounded("TRIAL_DAYS", None, DEFAULT_TRIAL_DAYS, MAX_TRIAL_DAYS).unwrap(),
            DEFAULT_TRIAL_DAYS
        );
    }

    #[test]
    fn value_in_range_is_accepted() {
        assert_eq!(
            bounded("TRIAL_DAYS", Some("14".to_string()), DEFAULT_TRIAL_DAYS, MAX_TRIAL_DAYS)
                .unwrap(),
            14
        );
    }

    #[test]
    fn non_positive_value_is_rejected() {
        for raw in ["0", "-5"] {
            let err = bounded("TRIAL_DAYS", Some(raw.to_string()), DEFAULT_TRIAL_DAYS, MAX_TRIAL_DAYS)
                .unwrap_err();
            assert!(err.to_string().contains("TRIAL_DAYS"));
        }
    }

    #[test]
    fn oversized_value_is_rejected() {
        assert!(
            bounded(
                "TRIAL_DAYS",
                Some("200000000000000".to_string()),
                DEFAULT_TRIAL_DAYS,
                MAX_TRIAL_DAYS,
            )
            .is_err()
        );
        assert!(
            bounded(
                "DIRECTORY_ORDER_SEED_TTL_HOURS",
                Some((MAX_ORDER_SEED_TTL_HOURS + 1).to_string()),
                DEFAULT_ORDER_SEED_TTL_HOURS,
                MAX_ORDER_SEED_TTL_HOURS,
            )
            .is_err()
        );
    }

    #[test]
    fn garbage_value_is_rejected() {
        assert!(
            bounded("TRIAL_DAYS", Some("thirty".to_string()), DEFAULT_TRIAL_DAYS, MAX_TRIAL_DAYS)
                .is_err()
        );
    }
}
