use super::config_model::{Database, DotEnvyConfig, TrialSweep, WorkerServer};
use anyhow::{Context, Result};

const DEFAULT_TRIAL_SWEEP_INTERVAL_SECS: u64 = 3600;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let worker_server = WorkerServer {
        port: required("SERVER_PORT_WORKER")?
            .parse()
            .context("SERVER_PORT_WORKER is invalid")?,
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

    let trial_sweep = TrialSweep {
        internal_token: std::env::var("INTERNAL_CRON_TOKEN").ok().and_then(|v| {
            let trimmed = v.trim().to_string();
            (!trimmed.is_empty()).then_some(trimmed)
        }),
        interval_secs: std::env::var("TRIAL_SWEEP_INTERVAL_SECS")
            .ok()
            .map(|v| v.trim().parse::<u64>())
            .transpose()
            .context("TRIAL_SWEEP_INTERVAL_SECS is invalid")?
            .unwrap_or(DEFAULT_TRIAL_SWEEP_INTERVAL_SECS),
    };

    Ok(DotEnvyConfig {
        worker_server,
        database,
        trial_sweep,
    })
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is invalid"))
}
