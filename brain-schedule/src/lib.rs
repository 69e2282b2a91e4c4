#![deny(missing_docs)]
//! Schedule manager for the Brain (SPEC_FULL.md §4.6).
//!
//! On [`ScheduleManager::start`], loads every enabled schedule row and
//! registers a timer task per row. `create`/`update` re-evaluate timers
//! atomically with the store write; `delete` cancels the timer before
//! deleting the row. Missed fires (process down) are never back-filled:
//! a restarted manager computes the next fire strictly after "now," so a
//! fire time that elapsed while the process was down is simply skipped.

mod error;
mod timing;

pub use error::ScheduleError;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use brain_bus::BusClient;
use brain_dispatch::DispatchRequest;
use brain_proto::bus::JobType;
use brain_store::{Schedule, Store, WorkType};
use chrono::Utc;
use tokio::task::JoinHandle;

fn to_job_type(work_type: WorkType) -> JobType {
    match work_type {
        WorkType::Agent => JobType::Agent,
        WorkType::Command => JobType::Command,
        WorkType::Http => JobType::Http,
    }
}

/// Translate a schedule's `(job_type, config)` into a dispatch request.
/// Config field conventions: command-mode reads `config.command`;
/// http-mode reads `config.{url,method,headers}`; agent-mode passes
/// `config` through unchanged as the job payload.
fn build_request(job_type: WorkType, config: &serde_json::Value, source: &str) -> DispatchRequest {
    let mut request = match job_type {
        WorkType::Agent => DispatchRequest {
            job_type: to_job_type(job_type),
            job: Some(config.clone()),
            command: None,
            url: None,
            method: None,
            headers: None,
            vars: None,
            source: None,
        },
        WorkType::Command => DispatchRequest {
            job_type: to_job_type(job_type),
            job: None,
            command: config.get("command").and_then(|v| v.as_str()).map(String::from),
            url: None,
            method: None,
            headers: None,
            vars: config.get("vars").cloned(),
            source: None,
        },
        WorkType::Http => DispatchRequest {
            job_type: to_job_type(job_type),
            job: None,
            command: None,
            url: config.get("url").and_then(|v| v.as_str()).map(String::from),
            method: config.get("method").and_then(|v| v.as_str()).map(String::from),
            headers: config.get("headers").cloned(),
            vars: config.get("vars").cloned(),
            source: None,
        },
    };
    request = request.with_source(source);
    request
}

/// Cron-driven schedule manager. One timer task per enabled schedule.
pub struct ScheduleManager {
    store: Store,
    bus: BusClient,
    timers: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
}

impl ScheduleManager {
    /// Build a schedule manager. Call [`Self::start`] to register timers
    /// for every currently-enabled schedule.
    pub fn new(store: Store, bus: BusClient) -> Self {
        Self {
            store,
            bus,
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Load all enabled schedules and register a timer per row.
    pub async fn start(&self) -> Result<(), ScheduleError> {
        for schedule in self.store.list_schedules().await? {
            if schedule.enabled {
                self.register_timer(&schedule);
            }
        }
        Ok(())
    }

    fn register_timer(&self, schedule: &Schedule) {
        self.cancel_timer(&schedule.id);

        let store = self.store.clone();
        let bus = self.bus.clone();
        let timers = self.timers.clone();
        let id = schedule.id.clone();
        let cron_expr = schedule.cron_expr.clone();

        let handle = tokio::spawn(async move {
            loop {
                let now = Utc::now();
                let fire_at = match timing::next_fire(&cron_expr, now) {
                    Ok(t) => t,
                    Err(err) => {
                        tracing::error!(schedule_id = %id, error = %err, "schedule: cannot compute next fire, stopping timer");
                        timers.lock().unwrap_or_else(|p| p.into_inner()).remove(&id);
                        return;
                    }
                };
                let delay = (fire_at - Utc::now()).to_std().unwrap_or(std::time::Duration::ZERO);
                tokio::time::sleep(delay).await;

                if let Err(err) = trigger_inner(&store, &bus, &id).await {
                    tracing::error!(schedule_id = %id, error = %err, "schedule: trigger failed");
                }
            }
        });

        self.timers
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(schedule.id.clone(), handle);
    }

    fn cancel_timer(&self, id: &str) {
        if let Some(handle) = self.timers.lock().unwrap_or_else(|p| p.into_inner()).remove(id) {
            handle.abort();
        }
    }

    /// Manually fire a schedule, regardless of its timer state. Always
    /// honoured, even outside the schedule's cron window.
    pub async fn trigger(&self, schedule_id: &str) -> Result<String, ScheduleError> {
        trigger_inner(&self.store, &self.bus, schedule_id).await
    }

    /// Create a schedule and atomically register its timer.
    pub async fn create(
        &self,
        name: &str,
        cron_expr: &str,
        job_type: WorkType,
        config: serde_json::Value,
    ) -> Result<Schedule, ScheduleError> {
        timing::validate(cron_expr)?;
        let schedule = self.store.create_schedule(name, cron_expr, job_type, config).await?;
        self.register_timer(&schedule);
        Ok(schedule)
    }

    /// Replace a schedule's definition and atomically re-register its
    /// timer (or cancel it, if no longer enabled).
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: &str,
        name: &str,
        cron_expr: &str,
        job_type: WorkType,
        config: &serde_json::Value,
        enabled: bool,
    ) -> Result<Schedule, ScheduleError> {
        timing::validate(cron_expr)?;
        let schedule = self
            .store
            .update_schedule(id, name, cron_expr, job_type, config, enabled)
            .await?
            .ok_or_else(|| ScheduleError::UnknownSchedule(id.to_string()))?;

        if enabled {
            self.register_timer(&schedule);
        } else {
            self.cancel_timer(id);
        }
        Ok(schedule)
    }

    /// Cancel the timer, then delete the row. Returns `true` iff a row
    /// was deleted.
    pub async fn delete(&self, id: &str) -> Result<bool, ScheduleError> {
        self.cancel_timer(id);
        self.store.delete_schedule(id).await.map_err(Into::into)
    }
}

async fn trigger_inner(store: &Store, bus: &BusClient, schedule_id: &str) -> Result<String, ScheduleError> {
    let schedule = store
        .get_schedule(schedule_id)
        .await?
        .ok_or_else(|| ScheduleError::UnknownSchedule(schedule_id.to_string()))?;
    if !schedule.enabled {
        return Err(ScheduleError::Disabled(schedule_id.to_string()));
    }

    let request = build_request(schedule.job_type, &schedule.config, "schedule");
    let job_id = brain_dispatch::dispatch(bus, store, request).await?;
    store.record_schedule_fired(schedule_id, "dispatched", None).await?;
    Ok(job_id)
}
