//! Background job scheduler for `serve`.
//!
//! Registers the daily generation job and the hourly send job on local
//! time. Each job is single-flight: a trigger that fires while the previous
//! run of the same job is still going is skipped.

use std::sync::Arc;

use dealhour_core::{load_queue, AppConfig, DocumentStore};
use dealhour_pipeline::{DailyGenerator, QueueSender};
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

pub(crate) struct Jobs {
    pub generator: DailyGenerator,
    pub sender: QueueSender,
    pub store: Arc<dyn DocumentStore>,
    pub generate_lock: Mutex<()>,
    pub send_lock: Mutex<()>,
}

/// Builds and starts the scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if a cron expression is invalid, a job
/// cannot be registered, or the scheduler fails to start.
pub(crate) async fn build_scheduler(
    jobs: Arc<Jobs>,
    config: &AppConfig,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_generate_job(&scheduler, Arc::clone(&jobs), &config.generate_cron).await?;
    register_send_job(&scheduler, jobs, &config.send_cron).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_generate_job(
    scheduler: &JobScheduler,
    jobs: Arc<Jobs>,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async_tz(cron, chrono::Local, move |_uuid, _lock| {
        let jobs = Arc::clone(&jobs);
        Box::pin(async move {
            tracing::info!("scheduler: starting daily generation run");
            run_generate(&jobs).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered generate job");
    Ok(())
}

async fn register_send_job(
    scheduler: &JobScheduler,
    jobs: Arc<Jobs>,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async_tz(cron, chrono::Local, move |_uuid, _lock| {
        let jobs = Arc::clone(&jobs);
        Box::pin(async move {
            tracing::info!("scheduler: starting send run");
            run_send(&jobs).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered send job");
    Ok(())
}

async fn run_generate(jobs: &Jobs) {
    let Ok(_guard) = jobs.generate_lock.try_lock() else {
        tracing::warn!("scheduler: previous generation run still in flight; skipping trigger");
        return;
    };
    if jobs.generator.run().await {
        tracing::info!("scheduler: generation run complete");
    } else {
        tracing::error!("scheduler: generation run produced no deals");
    }
}

async fn run_send(jobs: &Jobs) {
    let Ok(_guard) = jobs.send_lock.try_lock() else {
        tracing::warn!("scheduler: previous send run still in flight; skipping trigger");
        return;
    };
    let posted = jobs.sender.drain().await;
    tracing::info!(posted, "scheduler: send run complete");
}

/// Whether startup must generate before anything can be sent.
fn queue_needs_generation(store: &dyn DocumentStore) -> bool {
    match load_queue(store) {
        Ok(Some(queue)) if !queue.is_empty() => {
            tracing::info!(queued = queue.len(), "existing deal queue found");
            false
        }
        Ok(_) => {
            tracing::info!("deal queue absent or empty");
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "deal queue unreadable; regenerating");
            true
        }
    }
}

/// Generates immediately if the queue is absent, empty or unreadable, then
/// runs one send pass (which itself honors the send window).
pub(crate) async fn startup_check(jobs: &Jobs) {
    if queue_needs_generation(jobs.store.as_ref()) {
        tracing::info!("scheduler: running initial generation");
        run_generate(jobs).await;
    }
    run_send(jobs).await;
}
