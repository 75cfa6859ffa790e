use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RotaError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Person '{person_id}' not found")]
    UnknownPerson { person_id: String },

    #[error("Duty slot '{slot_id}' not found")]
    UnknownSlot { slot_id: String },

    #[error("Duty slot '{slot_id}' ends before it starts")]
    InvalidSlotWindow { slot_id: String },

    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Trial pool error: {0}")]
    TrialPool(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type RotaResult<T> = Result<T, RotaError>;
