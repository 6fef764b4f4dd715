mod backend;
mod medication_store;

pub use backend::{check_key, FileStore, KeyValueStore, MemoryStore, TRACKER_DIR};
pub use medication_store::{decode_records, encode_records, MedicationStore, MEDICATIONS_KEY};
