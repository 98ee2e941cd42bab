//! Records of key-value pairs for logging.
//!
//! ```rust
//! use rollout_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("num_epi", 2.0);
//! record.insert("epi_lens", RecordValue::Array1(vec![3.0, 1.0]));
//! assert_eq!(record.get_scalar("num_epi").unwrap(), 2.0);
//! assert!(record.get_scalar("epi_lens").is_err());
//! ```
use std::collections::HashMap;
use thiserror::Error;

/// Errors in accessing a [`Record`].
#[derive(Error, Debug)]
pub enum RecordError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}

/// Value stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single value.
    Scalar(f32),

    /// One value per episode.
    Array1(Vec<f32>),
}

/// A map from names to [`RecordValue`]s.
#[derive(Debug, Clone, Default)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates a record with a single scalar.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        let mut record = Self::default();
        record.insert(name, RecordValue::Scalar(value));
        record
    }

    /// Inserts a key-value pair.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Gets the value of the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Gets a scalar value.
    pub fn get_scalar(&self, k: &str) -> Result<f32, RecordError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(RecordError::RecordValueTypeError("Scalar".to_string())),
            None => Err(RecordError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a one-dimensional array.
    pub fn get_array1(&self, k: &str) -> Result<&[f32], RecordError> {
        match self.0.get(k) {
            Some(RecordValue::Array1(v)) => Ok(v),
            Some(_) => Err(RecordError::RecordValueTypeError("Array1".to_string())),
            None => Err(RecordError::RecordKeyError(k.to_string())),
        }
    }
}
