use crate::usecases::check_expired_trials::CheckExpiredTrialsUseCase;
use anyhow::Result;
use crates::domain::repositories::trials::TrialRepository;
use std::{sync::Arc, time::Duration};
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

pub async fn run_trial_sweep_loop<T>(
    usecase: Arc<CheckExpiredTrialsUseCase<T>>,
    interval_secs: u64,
) -> Result<()>
where
    T: TrialRepository + Send + Sync,
{
    if interval_secs == 0 {
        info!("trial_sweep_loop: disabled, relying on the cron endpoint");
        return std::future::pending().await;
    }

    info!(interval_secs, "trial_sweep_loop: started");
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        if let Err(e) = usecase.run().await {
            error!("trial_sweep_loop: sweep failed: {}", e);
        }
    }
}
