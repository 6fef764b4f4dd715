use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Not in a medtracker project. Run 'medtracker init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .medtracker/ to reinitialize.")]
    AlreadyInitialized,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Medication not found: {0}")]
    NotFound(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
