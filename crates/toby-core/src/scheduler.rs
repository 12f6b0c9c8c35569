//! Reminder scheduler.
//!
//! - A periodic check (every `check_interval`) sends a "needs walk" reminder to
//!   the group when the last walk is too old, outside quiet hours, and the
//!   throttle allows it
//! - One daily job per configured synthetic walker records a walk at `hour:00`
//!   local time
//!
//! The decision logic lives in [`ReminderScheduler::tick_at`], which takes the
//! current time explicitly and knows nothing about timers.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{DateTime, Local, TimeZone, Timelike, Utc};
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{sleep, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    config::{Config, DailyWalker},
    domain::WalkerId,
    formatting::format_needs_walk,
    messaging::port::MessagingPort,
    store::EventStore,
    throttle::NotificationThrottle,
    Result,
};

/// What a single periodic check decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    QuietHours,
    WalkedRecently,
    Throttled,
    Notified,
}

#[derive(Clone)]
pub struct ReminderScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    cfg: Arc<Config>,
    store: Arc<EventStore>,
    throttle: Arc<Mutex<NotificationThrottle>>,
    messenger: Arc<dyn MessagingPort>,
    // Held for the whole tick so a slow send cannot overlap the next check.
    tick_lock: Mutex<()>,
    state: Mutex<SchedulerState>,
}

#[derive(Default)]
struct SchedulerState {
    cancel: Option<CancellationToken>,
    tasks: Vec<JoinHandle<()>>,
}

impl ReminderScheduler {
    pub fn new(
        cfg: Arc<Config>,
        store: Arc<EventStore>,
        throttle: Arc<Mutex<NotificationThrottle>>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                cfg,
                store,
                throttle,
                messenger,
                tick_lock: Mutex::new(()),
                state: Mutex::new(SchedulerState::default()),
            }),
        }
    }

    /// Spawn the periodic check and the daily walker jobs. Returns how many
    /// tasks were started. Calling it again restarts everything.
    pub async fn start(&self) -> usize {
        self.stop().await;

        let cancel = CancellationToken::new();
        let mut tasks = Vec::with_capacity(1 + self.inner.cfg.daily_walkers.len());

        let scheduler = self.clone();
        let tok = cancel.clone();
        tasks.push(tokio::spawn(async move {
            scheduler.check_loop(tok).await;
        }));

        for walker in self.inner.cfg.daily_walkers.iter().cloned() {
            info!(
                walker = %walker.display_name,
                hour = walker.hour,
                "scheduling daily walk"
            );
            let scheduler = self.clone();
            let tok = cancel.clone();
            tasks.push(tokio::spawn(async move {
                scheduler.daily_loop(walker, tok).await;
            }));
        }

        let started = tasks.len();
        info!(
            check_every = ?self.inner.cfg.check_interval,
            daily_walkers = started - 1,
            "reminder scheduler started"
        );

        let mut st = self.inner.state.lock().await;
        st.cancel = Some(cancel);
        st.tasks = tasks;
        started
    }

    pub async fn stop(&self) {
        let mut st = self.inner.state.lock().await;
        if let Some(tok) = st.cancel.take() {
            tok.cancel();
        }
        for task in st.tasks.drain(..) {
            task.abort(); // best-effort; an in-flight send may be abandoned
        }
    }

    pub async fn tick(&self) -> Result<TickOutcome> {
        self.tick_at(Local::now(), Instant::now()).await
    }

    /// One periodic check.
    ///
    /// The throttle is only marked after the reminder was delivered; a failed
    /// send returns the error and leaves the throttle idle for the next tick.
    pub async fn tick_at(&self, local_now: DateTime<Local>, now: Instant) -> Result<TickOutcome> {
        let _serial = self.inner.tick_lock.lock().await;
        let cfg = &self.inner.cfg;

        if cfg.quiet_hours.contains(local_now.hour()) {
            return Ok(TickOutcome::QuietHours);
        }

        let elapsed = self
            .inner
            .store
            .elapsed_hours_since_last_walk_at(local_now.with_timezone(&Utc))?;
        if elapsed <= cfg.desired_walk_interval_hours {
            return Ok(TickOutcome::WalkedRecently);
        }

        let mut throttle = self.inner.throttle.lock().await;
        if !throttle.should_notify_at(now) {
            return Ok(TickOutcome::Throttled);
        }

        let message = format_needs_walk(elapsed)?;
        self.inner
            .messenger
            .send_text(cfg.broadcast_chat_id, &message)
            .await?;
        throttle.mark_notified_at(now)?;

        info!(elapsed_hours = elapsed, "walk reminder sent");
        Ok(TickOutcome::Notified)
    }

    async fn check_loop(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.inner.cfg.check_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
              _ = cancel.cancelled() => break,
              _ = interval.tick() => {
                match self.tick().await {
                  Ok(outcome) => debug!(?outcome, "reminder check"),
                  Err(e) => warn!("reminder check failed: {e}"),
                }
              }
            }
        }
    }

    async fn daily_loop(&self, walker: DailyWalker, cancel: CancellationToken) {
        let walker_id = WalkerId(walker.id.clone());
        let mut last_run: Option<DateTime<Local>> = None;

        loop {
            // Never schedule at or before the previous run, even if the wall
            // clock stepped back after waking up.
            let now = Local::now();
            let from = match last_run {
                Some(prev) if prev > now => prev,
                _ => now,
            };
            let Some(next) = next_daily_run(&from, walker.hour) else {
                error!(
                    walker = %walker.display_name,
                    "daily walk has no next run (stopping)"
                );
                break;
            };

            let dur = (next - Local::now()).to_std().unwrap_or(Duration::ZERO);

            tokio::select! {
              _ = cancel.cancelled() => break,
              _ = sleep(dur) => {
                last_run = Some(next);
                match self.inner.store.record_walk(&walker_id, &walker.display_name) {
                  Ok(()) => info!(walker = %walker.display_name, "recorded daily walk"),
                  Err(e) => error!(walker = %walker.display_name, "failed to record daily walk: {e}"),
                }
              }
            }
        }
    }
}

/// Next `hour:00` strictly after `now`, in `now`'s time zone.
///
/// A local time that does not exist (DST gap) moves on to the following day;
/// an ambiguous one resolves to the earlier instant.
pub fn next_daily_run<Tz: TimeZone>(now: &DateTime<Tz>, hour: u32) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let mut day = now.date_naive();

    for _ in 0..3 {
        let naive = day.and_hms_opt(hour, 0, 0)?;
        if let Some(candidate) = tz.from_local_datetime(&naive).earliest() {
            if candidate > *now {
                return Some(candidate);
            }
        }
        day = day.succ_opt()?;
    }
    None
}
