// src/entity/dose_time.rs
use chrono::{DateTime, NaiveTime, TimeZone, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Local wall-clock time of day at minute resolution, stored as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DoseTime(NaiveTime);

impl DoseTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// The minute `now` falls in, in `now`'s own time zone.
    pub fn of<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        Self(NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(NaiveTime::MIN))
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// 12-hour clock rendering, e.g. `8:00 AM`.
    pub fn to_12_hour(&self) -> String {
        self.0.format("%-I:%M %p").to_string()
    }
}

impl std::fmt::Display for DoseTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl std::str::FromStr for DoseTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || format!("Invalid time '{}': expected HH:MM (24h)", s);

        let parts: Vec<&str> = trimmed.split(':').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(invalid());
        }

        let (hour, minute) = (parts[0], parts[1]);
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        if !hour.chars().chain(minute.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        // Seconds are accepted (some time pickers emit them) but dropped.
        if let Some(seconds) = parts.get(2) {
            if seconds.len() != 2 || !seconds.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
        }

        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;
        DoseTime::new(hour, minute).ok_or_else(invalid)
    }
}

impl Serialize for DoseTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DoseTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
