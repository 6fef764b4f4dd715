// src/entity/medication.rs
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::DoseTime;
use crate::error::{Result, TrackerError};

/// The user-editable part of a medication, as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationFields {
    pub name: String,
    pub dosage: String,
    pub time: String,
    pub frequency: String,
}

/// Fields that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFields {
    pub name: String,
    pub dosage: String,
    pub time: DoseTime,
    pub frequency: String,
}

impl MedicationFields {
    pub fn new(
        name: impl Into<String>,
        dosage: impl Into<String>,
        time: impl Into<String>,
        frequency: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            dosage: dosage.into(),
            time: time.into(),
            frequency: frequency.into(),
        }
    }

    /// Check that every field is present and the time parses.
    pub fn validate(&self) -> Result<ValidatedFields> {
        let required = [
            ("name", &self.name),
            ("dosage", &self.dosage),
            ("time", &self.time),
            ("frequency", &self.frequency),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(TrackerError::Validation(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )));
        }

        let time = self.time.parse::<DoseTime>().map_err(TrackerError::Validation)?;

        Ok(ValidatedFields {
            name: self.name.trim().to_string(),
            dosage: self.dosage.trim().to_string(),
            time,
            frequency: self.frequency.trim().to_string(),
        })
    }
}

/// One tracked medication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRecord {
    /// Older exports used a millisecond timestamp as the id.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: Uuid,
    pub name: String,
    pub dosage: String,
    pub time: DoseTime,
    pub frequency: String,
    /// When the dose was last marked taken. Older exports call this `lastTaken`.
    #[serde(default, alias = "lastTaken")]
    pub taken_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Map a numeric id from an older export onto a UUID.
///
/// Distinct numbers map to distinct UUIDs and never collide with v4 ids,
/// whose version nibble is always set.
pub fn legacy_id(millis: u64) -> Uuid {
    Uuid::from_u128(u128::from(millis))
}

fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<Uuid, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Uuid(Uuid),
        Legacy(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Uuid(id) => id,
        RawId::Legacy(millis) => legacy_id(millis),
    })
}

impl MedicationRecord {
    pub fn new(fields: ValidatedFields, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: fields.name,
            dosage: fields.dosage,
            time: fields.time,
            frequency: fields.frequency,
            taken_at: None,
            created_at,
        }
    }

    /// Replace the mutable fields, leaving identity and taken state alone.
    pub fn apply(&mut self, fields: ValidatedFields) {
        self.name = fields.name;
        self.dosage = fields.dosage;
        self.time = fields.time;
        self.frequency = fields.frequency;
    }

    /// True when `taken_at` falls on `now`'s calendar date, in `now`'s zone.
    pub fn is_taken_today<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        match self.taken_at {
            Some(taken) => taken.with_timezone(&now.timezone()).date_naive() == now.date_naive(),
            None => false,
        }
    }

    /// Scheduled for the minute `now` falls in and not yet taken today.
    pub fn is_due<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        self.time == DoseTime::of(now) && !self.is_taken_today(now)
    }

    pub fn short_id(&self) -> String {
        self.id.to_string()[..7].to_string()
    }

    pub fn fields(&self) -> MedicationFields {
        MedicationFields::new(
            self.name.clone(),
            self.dosage.clone(),
            self.time.to_string(),
            self.frequency.clone(),
        )
    }
}
