//! Trajectories and batch iteration.
//!
//! A [`Trajectory`] owns episodes. After [`Trajectory::register`], its
//! [`FlatView`] serves batches to training loops:
//!
//! - [`Trajectory::iterate`] and [`Trajectory::minibatches`]: shuffled
//!   minibatches, without replacement within an epoch,
//! - [`Trajectory::random_batch`]: uniform sampling with replacement,
//! - [`Trajectory::full_batch`]: all steps in order,
//! - [`Trajectory::iterate_rnn`]: whole episodes, padded, for recurrent models.
mod base;
mod batch;
mod config;
mod flat;
pub use base::{TrajState, Trajectory};
pub use batch::{Batch, MinibatchIter, SeqBatch, SeqBatchIter};
pub use config::BatchConfig;
pub use flat::FlatView;
