use anyhow::Result;
use crates::domain::{
    repositories::trials::TrialRepository,
    value_objects::{
        clock::Clock,
        trials::{TrialSweepResult, unconverted_trial_ids},
    },
};
use std::sync::Arc;
use tracing::{error, info};

pub struct CheckExpiredTrialsUseCase<T>
where
    T: TrialRepository + Send + Sync,
{
    trial_repo: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<T> CheckExpiredTrialsUseCase<T>
where
    T: TrialRepository + Send + Sync,
{
    pub fn new(trial_repo: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self { trial_repo, clock }
    }

    /// Cancels every listing whose trial ended before now without a billing
    /// subscription attached. Converted listings are left alone.
    pub async fn run(&self) -> Result<TrialSweepResult> {
        let now = self.clock.now();

        let expired = self
            .trial_repo
            .list_expired_trials(now)
            .await
            .inspect_err(|err| {
                error!(db_error = ?err, "check_expired_trials: failed to list expired trials");
            })?;

        let to_cancel = unconverted_trial_ids(&expired);
        let cancelled = if to_cancel.is_empty() {
            0
        } else {
            let batch_size = to_cancel.len();
            self.trial_repo
                .cancel_trials(to_cancel)
                .await
                .inspect_err(|err| {
                    error!(
                        batch_size,
                        db_error = ?err,
                        "check_expired_trials: batch cancel failed; nothing was changed"
                    );
                })?
        };

        info!(
            checked = expired.len(),
            cancelled,
            now = %now,
            "check_expired_trials: sweep finished"
        );

        Ok(TrialSweepResult {
            success: true,
            checked: expired.len(),
            cancelled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use crates::domain::{
        repositories::trials::MockTrialRepository,
        value_objects::{clock::FixedClock, trials::ExpiredTrial},
    };
    use mockall::predicate::eq;
    use uuid::Uuid;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn trial(trial_end: DateTime<Utc>, subscription: Option<&str>) -> ExpiredTrial {
        ExpiredTrial {
            service_id: Uuid::new_v4(),
            trial_end,
            stripe_subscription_id: subscription.map(str::to_string),
        }
    }

    /// Mirrors the `status = trial AND trial_end < now` filter of the store.
    fn repo_over(listings: Vec<ExpiredTrial>) -> MockTrialRepository {
        let mut repo = MockTrialRepository::new();
        repo.expect_list_expired_trials().returning(move |now| {
            Ok(listings
                .iter()
                .filter(|listing| listing.trial_end < now)
                .cloned()
                .collect())
        });
        repo
    }

    #[tokio::test]
    async fn cancels_yesterdays_trial_and_leaves_tomorrows() {
        let now = fixed_now();
        let yesterday = trial(now - Duration::days(1), None);
        let tomorrow = trial(now + Duration::days(1), None);

        let mut repo = repo_over(vec![yesterday.clone(), tomorrow]);
        repo.expect_cancel_trials()
            .with(eq(vec![yesterday.service_id]))
            .times(1)
            .returning(|ids| Ok(ids.len()));

        let usecase =
            CheckExpiredTrialsUseCase::new(Arc::new(repo), Arc::new(FixedClock::new(now)));
        let result = usecase.run().await.unwrap();

        assert_eq!(
            result,
            TrialSweepResult {
                success: true,
                checked: 1,
                cancelled: 1,
            }
        );
    }

    #[tokio::test]
    async fn converted_trial_is_not_cancelled() {
        let now = fixed_now();
        let converted = trial(now - Duration::days(2), Some("sub_123"));

        let mut repo = repo_over(vec![converted]);
        repo.expect_cancel_trials().never();

        let usecase =
            CheckExpiredTrialsUseCase::new(Arc::new(repo), Arc::new(FixedClock::new(now)));
        let result = usecase.run().await.unwrap();

        assert_eq!(result.checked, 1);
        assert_eq!(result.cancelled, 0);
    }

    #[tokio::test]
    async fn trial_becomes_due_once_the_clock_passes_its_end() {
        let now = fixed_now();
        let listing = trial(now + Duration::hours(1), None);
        let listing_id = listing.service_id;

        let mut repo = repo_over(vec![listing]);
        repo.expect_cancel_trials()
            .with(eq(vec![listing_id]))
            .times(1)
            .returning(|ids| Ok(ids.len()));

        let clock = Arc::new(FixedClock::new(now));
        let usecase = CheckExpiredTrialsUseCase::new(Arc::new(repo), clock.clone());

        let before = usecase.run().await.unwrap();
        assert_eq!(before.cancelled, 0);

        clock.advance(Duration::hours(2));
        let after = usecase.run().await.unwrap();
        assert_eq!(after.cancelled, 1);
    }

    #[tokio::test]
    async fn batch_failure_propagates() {
        let now = fixed_now();
        let mut repo = repo_over(vec![trial(now - Duration::days(1), None)]);
        repo.expect_cancel_trials()
            .returning(|_| Err(anyhow::anyhow!("connection reset")));

        let usecase =
            CheckExpiredTrialsUseCase::new(Arc::new(repo), Arc::new(FixedClock::new(now)));

        assert!(usecase.run().await.is_err());
    }
}
