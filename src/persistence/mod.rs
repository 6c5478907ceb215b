use crate::batch::Batch;
use crate::calendar::CalendarError;
use crate::register::{BatchError, BatchRegister};
use crate::validation;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid calendar: {0}")]
    Calendar(#[from] CalendarError),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl From<BatchError> for PersistenceError {
    fn from(value: BatchError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait ScheduleStore {
    fn save_register(&self, register: &BatchRegister) -> PersistenceResult<()>;
    fn load_register(&self) -> PersistenceResult<Option<BatchRegister>>;
}

pub fn validate_batches(batches: &[Batch]) -> PersistenceResult<()> {
    validation::validate_batch_collection(batches)
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

pub fn validate_register(register: &BatchRegister) -> PersistenceResult<()> {
    let batches: Vec<Batch> = register.batches().cloned().collect();
    validate_batches(&batches)
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_calendar_config, load_holidays_from_csv, load_register_from_csv,
    load_register_from_json, save_calendar_config, save_register_to_csv, save_register_to_json,
};
