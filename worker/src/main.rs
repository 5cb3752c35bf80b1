use anyhow::Result;
use crates::{
    domain::value_objects::clock::SystemClock,
    infra::db::{postgres::postgres_connection, repositories::trials::TrialPostgres},
};
use std::sync::Arc;
use tracing::{error, info};
use worker::{
    axum_http, config, services::trial_sweep_loop,
    usecases::check_expired_trials::CheckExpiredTrialsUseCase,
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Worker exited with error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("worker")?;

    let dotenvy_env = Arc::new(config::config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let db_pool_arc = Arc::new(postgres_pool);

    let trial_repository = Arc::new(TrialPostgres::new(Arc::clone(&db_pool_arc)));
    let trial_sweep_usecase = Arc::new(CheckExpiredTrialsUseCase::new(
        trial_repository,
        Arc::new(SystemClock),
    ));

    if dotenvy_env.trial_sweep.internal_token.is_none() {
        info!("INTERNAL_CRON_TOKEN is not set; the cron endpoint answers 503");
    }

    let sweep_loop = tokio::spawn(trial_sweep_loop::run_trial_sweep_loop(
        Arc::clone(&trial_sweep_usecase),
        dotenvy_env.trial_sweep.interval_secs,
    ));

    let server_config = Arc::clone(&dotenvy_env);
    let http_server = tokio::spawn(async move {
        axum_http::http_serve::start(server_config, trial_sweep_usecase).await
    });

    tokio::select! {
        result = sweep_loop => result??,
        result = http_server => result??,
    };
    Ok(())
}
