// Services shared by every view for the lifetime of the client session

use std::sync::Arc;
use std::time::Duration;

use crate::api::Catalog;
use crate::config::AppConfig;

use super::actions::EnrichActions;
use super::broadcast::ScanEvents;

/// Tunables passed down to views
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Deadline for a whole hierarchical load; `None` waits forever
    pub load_timeout: Option<Duration>,
    /// Wait for scan jobs to finish before announcing the scan
    pub wait_for_scan_jobs: bool,
    pub scan_poll_interval: Duration,
    pub scan_job_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            load_timeout: Some(Duration::from_secs(60)),
            wait_for_scan_jobs: false,
            scan_poll_interval: Duration::from_millis(1000),
            scan_job_timeout: Duration::from_secs(600),
        }
    }
}

impl From<&AppConfig> for ClientOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            load_timeout: config.load_timeout,
            wait_for_scan_jobs: config.scan.wait_for_jobs,
            scan_poll_interval: Duration::from_millis(config.scan.poll_interval_ms),
            scan_job_timeout: Duration::from_secs(config.scan.job_timeout_secs),
        }
    }
}

/// One per running client. Cloning shares the same bus, registry and catalog.
#[derive(Clone)]
pub struct ClientContext {
    pub catalog: Arc<dyn Catalog>,
    pub scan_events: ScanEvents,
    pub enrich_actions: EnrichActions,
    pub options: ClientOptions,
}

impl ClientContext {
    pub fn new(catalog: Arc<dyn Catalog>, options: ClientOptions) -> Self {
        Self {
            catalog,
            scan_events: ScanEvents::new(),
            enrich_actions: EnrichActions::new(),
            options,
        }
    }
}
