pub mod check_expired_trials;
