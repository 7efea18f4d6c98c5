//! Cron-based poll scheduler driving the decision cycle

use crate::core::cycle::DecisionCycle;
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("scheduler disabled: interval_seconds is 0")]
    Disabled,

    #[error("interval of {0}s has no even cron cadence")]
    UnevenInterval(u64),

    #[error("invalid cron expression '{expr}': {reason}")]
    InvalidCron { expr: String, reason: String },
}

/// Cron expression (with seconds field) firing every `interval_seconds`.
///
/// Only intervals that tile the minute or the hour evenly are accepted:
/// a divisor of 60 seconds, or a whole number of minutes dividing 60.
pub fn interval_to_cron(interval_seconds: u64) -> Result<String, SchedulerError> {
    match interval_seconds {
        0 => Err(SchedulerError::Disabled),
        s if s < 60 && 60 % s == 0 => Ok(format!("*/{} * * * * *", s)),
        3600 => Ok("0 0 * * * *".to_string()),
        s if s % 60 == 0 && 60 % (s / 60) == 0 => Ok(format!("0 */{} * * * *", s / 60)),
        s => Err(SchedulerError::UnevenInterval(s)),
    }
}

/// Runs a decision tick on every cron fire.
pub struct PollScheduler {
    cycle: Arc<Mutex<DecisionCycle>>,
    schedule: Schedule,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl PollScheduler {
    pub fn new(
        cycle: Arc<Mutex<DecisionCycle>>,
        interval_seconds: u64,
    ) -> Result<Self, SchedulerError> {
        let cron_expr = interval_to_cron(interval_seconds)?;
        let schedule = Schedule::from_str(&cron_expr).map_err(|e| SchedulerError::InvalidCron {
            expr: cron_expr.clone(),
            reason: e.to_string(),
        })?;

        info!(
            interval = interval_seconds,
            cron = %cron_expr,
            "PollScheduler: created with interval {}s (cron: {})",
            interval_seconds,
            cron_expr
        );

        Ok(Self {
            cycle,
            schedule,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    /// Spawn the polling loop. A tick that overruns delays the next fire.
    pub async fn start(&self) {
        let cycle = self.cycle.clone();
        let schedule = self.schedule.clone();

        let handle = tokio::spawn(async move {
            info!("PollScheduler: started, waiting for cron schedule...");

            loop {
                let Some(next_tick) = schedule.upcoming(chrono::Utc).next() else {
                    tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                    continue;
                };
                let now = chrono::Utc::now();
                if next_tick > now {
                    let duration = (next_tick - now).to_std().unwrap_or_default();
                    tokio::time::sleep(duration).await;
                }

                let mut cycle = cycle.lock().await;
                let reports = cycle.run_tick().await;
                debug!(reports = ?reports, "PollScheduler: tick finished");
            }
        });

        let mut h = self.handle.write().await;
        if let Some(previous) = h.replace(handle) {
            previous.abort();
        }
        info!("PollScheduler: started successfully");
    }

    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("PollScheduler: stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle.read().await.is_some()
    }
}
