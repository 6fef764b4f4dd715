pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod reminder;
pub mod storage;

pub use config::TrackerConfig;
pub use error::{Result, TrackerError};
pub use reminder::{ReminderEvaluator, ReminderScheduler};
pub use storage::{FileStore, MedicationStore, MemoryStore};
