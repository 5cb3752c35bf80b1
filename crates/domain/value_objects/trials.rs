use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A listing whose trial window has elapsed, as read by the sweeper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredTrial {
    pub service_id: Uuid,
    pub trial_end: DateTime<Utc>,
    pub stripe_subscription_id: Option<String>,
}

impl ExpiredTrial {
    pub fn has_converted(&self) -> bool {
        self.stripe_subscription_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty())
    }
}

/// Ids of expired trials that never picked up a billing subscription.
pub fn unconverted_trial_ids(trials: &[ExpiredTrial]) -> Vec<Uuid> {
    trials
        .iter()
        .filter(|trial| !trial.has_converted())
        .map(|trial| trial.service_id)
        .collect()
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct TrialSweepResult {
    pub success: bool,
    pub checked: usize,
    pub cancelled: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial(subscription: Option<&str>) -> ExpiredTrial {
        ExpiredTrial {
            service_id: Uuid::new_v4(),
            trial_end: Utc::now(),
            stripe_subscription_id: subscription.map(str::to_string),
        }
    }

    #[test]
    fn only_unconverted_trials_are_selected() {
        let plain = trial(None);
        let blank = trial(Some(" "));
        let converted = trial(Some("sub_123"));

        let ids = unconverted_trial_ids(&[plain.clone(), converted, blank.clone()]);
        assert_eq!(ids, vec![plain.service_id, blank.service_id]);
    }
}
