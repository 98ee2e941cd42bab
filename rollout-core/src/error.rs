//! Errors in the library.
use crate::FieldKey;
use thiserror::Error;

/// Errors raised by episodes, trajectories and transforms.
///
/// All of them are raised synchronously at the call violating a precondition.
/// A transform returning one of these errors has not mutated any episode.
#[derive(Error, Debug)]
pub enum TrajError {
    /// Length or per-step shape of a field does not match.
    #[error("Shape error in field {field}: expected {expected}, got {actual}")]
    Shape {
        /// The offending field.
        field: FieldKey,

        /// Expected length or shape.
        expected: String,

        /// Actual length or shape.
        actual: String,
    },

    /// Episodes of a trajectory disagree on which fields exist.
    #[error("Field mismatch in episode {episode}: expected {expected:?}, got {actual:?}")]
    FieldMismatch {
        /// Index of the first disagreeing episode.
        episode: usize,

        /// Fields of the first episode.
        expected: Vec<FieldKey>,

        /// Fields of the disagreeing episode.
        actual: Vec<FieldKey>,
    },

    /// A field required by an operation is absent.
    #[error("Missing field {field} in episode {episode}")]
    MissingField {
        /// The missing field.
        field: FieldKey,

        /// Index of the episode in its trajectory, 0 for a standalone episode.
        episode: usize,
    },

    /// Batches were requested without a valid flat view.
    #[error("Trajectory is not registered; call register() after the last mutation")]
    NotRegistered,

    /// An argument is out of its domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A model consumed by a transform failed.
    #[error(transparent)]
    Model(#[from] anyhow::Error),
}

impl TrajError {
    pub(crate) fn shape(
        field: &FieldKey,
        expected: impl std::fmt::Debug,
        actual: impl std::fmt::Debug,
    ) -> Self {
        Self::Shape {
            field: field.clone(),
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        }
    }

    pub(crate) fn missing(field: &FieldKey, episode: usize) -> Self {
        Self::MissingField {
            field: field.clone(),
            episode,
        }
    }
}

/// Result type of data-level operations.
pub type Result<T> = std::result::Result<T, TrajError>;
