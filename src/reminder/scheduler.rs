use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{Notifier, Permission, ReminderEvaluator};
use crate::config::TrackerConfig;
use crate::entity::{DoseTime, MedicationRecord};
use crate::storage::{KeyValueStore, MedicationStore};

type Clock = Arc<dyn Fn() -> DateTime<Local> + Send + Sync>;

/// Medications already reminded during the current minute.
#[derive(Debug, Default)]
struct FiredReminders {
    minute: Option<(NaiveDate, DoseTime)>,
    ids: HashSet<Uuid>,
}

impl FiredReminders {
    /// Move to `minute`, forgetting what fired in any earlier one.
    fn enter(&mut self, minute: (NaiveDate, DoseTime)) {
        if self.minute != Some(minute) {
            self.minute = Some(minute);
            self.ids.clear();
        }
    }
}

/// Runs the reminder check on a fixed period until stopped.
#[derive(Clone)]
pub struct ReminderScheduler {
    period: Duration,
    evaluator: ReminderEvaluator,
    clock: Clock,
}

impl ReminderScheduler {
    pub fn new(period: Duration, dismiss_after: Duration) -> Self {
        Self {
            period,
            evaluator: ReminderEvaluator::new(dismiss_after),
            clock: Arc::new(Local::now),
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.reminder_interval(), config.dismiss_after())
    }

    /// Replace the wall clock, e.g. to pin the time in tests.
    pub fn with_clock(
        mut self,
        clock: impl Fn() -> DateTime<Local> + Send + Sync + 'static,
    ) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Ask the notifier for permission once, then start ticking.
    ///
    /// The first check happens one period after start. The store lock is
    /// held only while copying the list. A medication is reminded at most
    /// once per matching minute, however short the period.
    pub async fn start<S, N>(
        &self,
        store: Arc<Mutex<MedicationStore<S>>>,
        notifier: Arc<N>,
    ) -> ReminderHandle
    where
        S: KeyValueStore + Send + 'static,
        N: Notifier + ?Sized + 'static,
    {
        let permission = notifier.request_permission().await;
        if permission == Permission::Granted {
            info!("Notifications enabled, reminders every {:?}", self.period);
        } else {
            info!(%permission, "Notifications not granted, reminders will be skipped");
        }

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let scheduler = self.clone();

        let task = tokio::spawn(async move {
            let mut fired = FiredReminders::default();
            let mut ticker = tokio::time::interval(scheduler.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        scheduler.run_tick(&*store, &*notifier, &mut fired).await;
                    }
                }
            }
            debug!("Reminder loop stopped");
        });

        ReminderHandle { token, task }
    }

    async fn run_tick<S, N>(
        &self,
        store: &Mutex<MedicationStore<S>>,
        notifier: &N,
        fired: &mut FiredReminders,
    ) where
        S: KeyValueStore,
        N: Notifier + ?Sized,
    {
        let now = (self.clock)();
        fired.enter((now.date_naive(), DoseTime::of(&now)));

        let records: Vec<MedicationRecord> = {
            let store = store.lock().await;
            store
                .list()
                .iter()
                .filter(|r| !fired.ids.contains(&r.id))
                .cloned()
                .collect()
        };

        let events = self.evaluator.tick(&records, notifier, &now).await;
        debug!(time = %now.format("%H:%M"), due = events.len(), "Reminder tick");
        fired.ids.extend(events.iter().map(|e| e.medication_id));
    }
}

/// Handle to a running reminder loop.
pub struct ReminderHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl ReminderHandle {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Cancel the loop and wait for it to finish.
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Reminder loop ended abnormally");
        }
    }
}
