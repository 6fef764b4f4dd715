use chrono::{DateTime, TimeZone, Utc};

use crate::entity::{DailyProgress, DoseTime, MedicationRecord};

pub fn status_label<Tz: TimeZone>(record: &MedicationRecord, now: &DateTime<Tz>) -> &'static str {
    if record.is_taken_today(now) {
        "Taken Today"
    } else {
        "Pending"
    }
}

/// "Today at 8:05 AM", or "2024-03-09 at 8:05 AM" for other days.
pub fn format_taken_at<Tz: TimeZone>(taken_at: &DateTime<Utc>, now: &DateTime<Tz>) -> String {
    let local = taken_at.with_timezone(&now.timezone());
    let time = DoseTime::of(&local).to_12_hour();

    if local.date_naive() == now.date_naive() {
        format!("Today at {}", time)
    } else {
        format!("{} at {}", local.date_naive().format("%Y-%m-%d"), time)
    }
}

pub fn format_progress(progress: &DailyProgress) -> String {
    format!(
        "Today: {}/{} taken ({}%)",
        progress.taken, progress.total, progress.percent
    )
}

/// Multi-line listing entry for a medication at `position` (1-based).
pub fn format_record<Tz: TimeZone>(
    position: usize,
    record: &MedicationRecord,
    now: &DateTime<Tz>,
) -> String {
    let mut out = format!(
        "  {:>3}. ({}) [{}] {} - {} at {} ({})",
        position,
        record.short_id(),
        status_label(record, now),
        record.name,
        record.dosage,
        record.time.to_12_hour(),
        record.frequency,
    );
    if let Some(taken_at) = &record.taken_at {
        out.push_str(&format!("\n        Last taken: {}", format_taken_at(taken_at, now)));
    }
    out
}
