use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use super::KeyValueStore;
use crate::entity::{DailyProgress, MedicationFields, MedicationRecord};
use crate::error::{Result, TrackerError};

/// Storage key the record list lives under unless configured otherwise.
pub const MEDICATIONS_KEY: &str = "medtracker-medications";

/// Serialize the full record list as stored.
pub fn encode_records(records: &[MedicationRecord]) -> Result<String> {
    serde_json::to_string(records)
        .map_err(|e| TrackerError::Persistence(format!("failed to encode medications: {}", e)))
}

/// Parse a stored record list.
pub fn decode_records(text: &str) -> Result<Vec<MedicationRecord>> {
    Ok(serde_json::from_str(text)?)
}

/// Give every record after the first holder of an id a fresh one.
fn reassign_duplicate_ids(records: &mut [MedicationRecord]) {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records.iter_mut() {
        while !seen.insert(record.id) {
            let fresh = Uuid::new_v4();
            warn!(
                old = %record.id,
                new = %fresh,
                name = %record.name,
                "Duplicate medication id, reassigned"
            );
            record.id = fresh;
        }
    }
}

/// Reject a taken moment later than the wall clock.
fn taken_moment<Tz: TimeZone>(now: &DateTime<Tz>) -> Result<DateTime<Utc>> {
    let moment = now.with_timezone(&Utc);
    if moment > Utc::now() {
        return Err(TrackerError::Validation(format!(
            "cannot mark a dose taken in the future ({})",
            moment.to_rfc3339()
        )));
    }
    Ok(moment)
}

/// Owns the medication list and rewrites it to the backend after every change.
///
/// A failed write leaves memory ahead of durable state; the mutation is not
/// rolled back and the error is returned to the caller.
pub struct MedicationStore<S> {
    backend: S,
    key: String,
    records: Vec<MedicationRecord>,
}

impl<S: KeyValueStore> MedicationStore<S> {
    /// Load the list stored under the default key.
    pub fn load(backend: S) -> Result<Self> {
        Self::load_with_key(backend, MEDICATIONS_KEY)
    }

    /// Load the list stored under `key`. An absent key is an empty list.
    pub fn load_with_key(backend: S, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let mut records = match backend.get(&key)? {
            Some(text) => decode_records(&text)?,
            None => Vec::new(),
        };
        reassign_duplicate_ids(&mut records);
        debug!(key = %key, count = records.len(), "Loaded medications");

        Ok(Self {
            backend,
            key,
            records,
        })
    }

    /// Write the full list to the backend and return the text written.
    pub fn save(&mut self) -> Result<String> {
        let text = encode_records(&self.records)?;
        self.backend.set(&self.key, &text)?;
        debug!(key = %self.key, count = self.records.len(), "Persisted medications");
        Ok(text)
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn list(&self) -> &[MedicationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &Uuid) -> Option<&MedicationRecord> {
        self.records.iter().find(|r| r.id == *id)
    }

    fn position(&self, id: &Uuid) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.id == *id)
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))
    }

    /// Add a medication created now.
    pub fn add(&mut self, fields: &MedicationFields) -> Result<MedicationRecord> {
        self.add_at(fields, &Utc::now())
    }

    pub fn add_at<Tz: TimeZone>(
        &mut self,
        fields: &MedicationFields,
        now: &DateTime<Tz>,
    ) -> Result<MedicationRecord> {
        let validated = fields.validate()?;
        let mut record = MedicationRecord::new(validated, now.with_timezone(&Utc));
        while self.get(&record.id).is_some() {
            record.id = Uuid::new_v4();
        }

        self.records.push(record.clone());
        self.save()?;
        Ok(record)
    }

    /// Replace name, dosage, time and frequency. Taken state is kept.
    pub fn update(&mut self, id: &Uuid, fields: &MedicationFields) -> Result<MedicationRecord> {
        let index = self.position(id)?;
        let validated = fields.validate()?;

        self.records[index].apply(validated);
        let record = self.records[index].clone();
        self.save()?;
        Ok(record)
    }

    pub fn remove(&mut self, id: &Uuid) -> Result<MedicationRecord> {
        let index = self.position(id)?;
        let record = self.records.remove(index);
        self.save()?;
        Ok(record)
    }

    /// Clear a dose taken today, otherwise mark it taken at `now`.
    ///
    /// Marking fails with `Validation` when `now` is ahead of the wall clock.
    pub fn toggle_taken<Tz: TimeZone>(
        &mut self,
        id: &Uuid,
        now: &DateTime<Tz>,
    ) -> Result<MedicationRecord> {
        let index = self.position(id)?;
        let record = &mut self.records[index];
        record.taken_at = if record.is_taken_today(now) {
            None
        } else {
            Some(taken_moment(now)?)
        };

        let record = record.clone();
        self.save()?;
        Ok(record)
    }

    pub fn mark_taken<Tz: TimeZone>(
        &mut self,
        id: &Uuid,
        now: &DateTime<Tz>,
    ) -> Result<MedicationRecord> {
        let index = self.position(id)?;
        self.records[index].taken_at = Some(taken_moment(now)?);
        let record = self.records[index].clone();
        self.save()?;
        Ok(record)
    }

    /// Clears `taken_at` whatever day it was set on.
    pub fn mark_not_taken(&mut self, id: &Uuid) -> Result<MedicationRecord> {
        let index = self.position(id)?;
        self.records[index].taken_at = None;
        let record = self.records[index].clone();
        self.save()?;
        Ok(record)
    }

    pub fn taken_today_count<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> usize {
        self.records.iter().filter(|r| r.is_taken_today(now)).count()
    }

    /// Share of medications taken today; 0 for an empty store.
    pub fn completion_ratio<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> f64 {
        self.progress(now).ratio
    }

    pub fn progress<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DailyProgress {
        DailyProgress::new(self.taken_today_count(now), self.records.len())
    }

    /// Resolve a 1-based list position or a unique UUID prefix.
    ///
    /// An all-digit reference within `1..=len()` is always a position, even
    /// when it is also the prefix of some id. Pass more characters of the
    /// id (or the full id) to select by prefix instead.
    pub fn resolve(&self, reference: &str) -> Result<Uuid> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(TrackerError::NotFound(String::new()));
        }

        let prefix = reference.to_lowercase();
        if let Some(exact) = self.records.iter().find(|r| r.id.to_string() == prefix) {
            return Ok(exact.id);
        }

        if let Ok(position) = reference.parse::<usize>() {
            if position >= 1 && position <= self.records.len() {
                return Ok(self.records[position - 1].id);
            }
        }

        let matches: Vec<&MedicationRecord> = self
            .records
            .iter()
            .filter(|r| r.id.to_string().starts_with(&prefix))
            .collect();

        match matches.as_slice() {
            [only] => Ok(only.id),
            [] => Err(TrackerError::NotFound(reference.to_string())),
            many => Err(TrackerError::NotFound(format!(
                "{} (ambiguous, matches {} medications)",
                reference,
                many.len()
            ))),
        }
    }
}
