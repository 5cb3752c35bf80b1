#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub worker_server: WorkerServer,
    pub database: Database,
    pub trial_sweep: TrialSweep,
}

#[derive(Debug, Clone)]
pub struct WorkerServer {
    pub port: u16,
    pub timeout: u64,
    pub body_limit: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct TrialSweep {
    /// Bearer token for the cron endpoint. Unset disables the endpoint.
    pub internal_token: Option<String>,
    /// Zero disables the in-process loop.
    pub interval_secs: u64,
}
