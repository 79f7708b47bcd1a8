// Toolbar scan actions: scan every library, then announce it on the bus

use std::time::Duration;

use crate::api::{ApiError, Catalog};
use crate::error::ClientError;
use crate::models::{Library, ScanJob, ScanJobStatus, ScanMode};

use super::context::ClientContext;

/// Outcome of one scan action
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub libraries: usize,
    /// Jobs that reported `failed` while being waited on
    pub failed_jobs: Vec<ScanJob>,
    /// Jobs still running when the wait deadline hit
    pub unfinished_jobs: Vec<String>,
}

pub struct ScanActions {
    ctx: ClientContext,
}

impl ScanActions {
    pub fn new(ctx: &ClientContext) -> Self {
        Self { ctx: ctx.clone() }
    }

    /// Rescan every library
    pub async fn full_scan(&self) -> Result<ScanReport, ClientError> {
        self.run(ScanMode::Rescan).await
    }

    /// Scan every library for new files only
    pub async fn incremental_scan(&self) -> Result<ScanReport, ClientError> {
        self.run(ScanMode::Scan).await
    }

    async fn run(&self, mode: ScanMode) -> Result<ScanReport, ClientError> {
        let catalog = self.ctx.catalog.as_ref();
        let libraries = catalog.list_libraries().await?;

        let mut started = Vec::with_capacity(libraries.len());
        for library in &libraries {
            let job = catalog.trigger_scan(library.id, mode).await?;
            tracing::info!(
                "Started {} of library '{}' (job {}, {:?})",
                mode.as_str(),
                library.name,
                job.job_id,
                job.status
            );
            started.push((library, job.job_id));
        }

        let mut report = ScanReport {
            libraries: libraries.len(),
            ..Default::default()
        };

        if self.ctx.options.wait_for_scan_jobs {
            for (library, job_id) in started {
                self.wait_for_job(library, &job_id, &mut report).await?;
            }
        }

        let notified = self.ctx.scan_events.publish();
        tracing::info!(
            "{} finished for {} libraries, notified {} views",
            mode.as_str(),
            report.libraries,
            notified
        );
        Ok(report)
    }

    async fn wait_for_job(
        &self,
        library: &Library,
        job_id: &str,
        report: &mut ScanReport,
    ) -> Result<(), ClientError> {
        let options = &self.ctx.options;
        let polled = tokio::time::timeout(
            options.scan_job_timeout,
            poll_job(self.ctx.catalog.as_ref(), job_id, options.scan_poll_interval),
        )
        .await;

        match polled {
            Ok(Ok(job)) if job.status == ScanJobStatus::Failed => {
                tracing::warn!(
                    "Scan job {} for '{}' failed: {}",
                    job.id,
                    library.name,
                    job.error.as_deref().unwrap_or("unknown error")
                );
                report.failed_jobs.push(job);
            }
            Ok(Ok(job)) => {
                tracing::debug!("Scan job {} for '{}' done", job.id, library.name);
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                tracing::warn!(
                    "Scan job {} for '{}' still running after {:?}",
                    job_id,
                    library.name,
                    options.scan_job_timeout
                );
                report.unfinished_jobs.push(job_id.to_string());
            }
        }
        Ok(())
    }
}

async fn poll_job(
    catalog: &dyn Catalog,
    job_id: &str,
    interval: Duration,
) -> Result<ScanJob, ApiError> {
    loop {
        let job = catalog.get_scan_job(job_id).await?;
        if job.status != ScanJobStatus::Running {
            return Ok(job);
        }
        tokio::time::sleep(interval).await;
    }
}
