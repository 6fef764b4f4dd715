//! Daily dose reminders.
//!
//! Every tick compares each medication's scheduled `HH:MM` with the minute
//! the clock currently reads, and notifies for every match not yet taken
//! today. A tick that misses its minute is not made up later.

mod notifier;
mod scheduler;

pub use notifier::{ConsoleNotifier, MemoryNotifier, Notifier, Permission};
pub use scheduler::{ReminderHandle, ReminderScheduler};

use std::time::Duration;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::{info, trace, warn};
use uuid::Uuid;

use crate::entity::{DoseTime, MedicationRecord};

pub const REMINDER_TITLE: &str = "💊 Medication Reminder";
pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_secs(10);

/// A medication that is due right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderEvent {
    pub medication_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub scheduled: DoseTime,
}

impl ReminderEvent {
    fn for_record(record: &MedicationRecord) -> Self {
        Self {
            medication_id: record.id,
            name: record.name.clone(),
            dosage: record.dosage.clone(),
            scheduled: record.time,
        }
    }

    pub fn body(&self) -> String {
        format!("Time to take {} ({})", self.name, self.dosage)
    }
}

/// What gets shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Suggested time before the notification closes itself.
    pub dismiss_after: Duration,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            dismiss_after: DEFAULT_DISMISS_AFTER,
        }
    }
}

/// Medications scheduled for `now`'s minute and not taken today, in list order.
pub fn due_reminders<Tz: TimeZone>(
    records: &[MedicationRecord],
    now: &DateTime<Tz>,
) -> Vec<ReminderEvent> {
    records
        .iter()
        .filter(|r| r.is_due(now))
        .map(ReminderEvent::for_record)
        .collect()
}

#[derive(Debug, Clone)]
pub struct ReminderEvaluator {
    dismiss_after: Duration,
}

impl Default for ReminderEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_DISMISS_AFTER)
    }
}

impl ReminderEvaluator {
    pub fn new(dismiss_after: Duration) -> Self {
        Self { dismiss_after }
    }

    pub fn notification(&self, event: &ReminderEvent) -> Notification {
        Notification {
            dismiss_after: self.dismiss_after,
            ..Notification::new(REMINDER_TITLE, event.body())
        }
    }

    /// Send one notification per event. Returns how many were delivered.
    ///
    /// A failed delivery is logged and does not stop the rest.
    pub async fn dispatch<N: Notifier + ?Sized>(
        &self,
        events: &[ReminderEvent],
        notifier: &N,
    ) -> usize {
        let mut delivered = 0;
        for event in events {
            match notifier.notify(&self.notification(event)).await {
                Ok(()) => {
                    info!(medication = %event.name, time = %event.scheduled, "Reminder sent");
                    delivered += 1;
                }
                Err(e) => {
                    warn!(medication = %event.name, error = %e, "Failed to send reminder");
                }
            }
        }
        delivered
    }

    /// Evaluate one tick. Without permission this does nothing.
    pub async fn tick<N, Tz>(
        &self,
        records: &[MedicationRecord],
        notifier: &N,
        now: &DateTime<Tz>,
    ) -> Vec<ReminderEvent>
    where
        N: Notifier + ?Sized,
        Tz: TimeZone,
    {
        if notifier.permission() != Permission::Granted {
            trace!("Notification permission not granted, skipping tick");
            return Vec::new();
        }

        let events = due_reminders(records, now);
        self.dispatch(&events, notifier).await;
        events
    }
}
