#![warn(missing_docs)]
//! Trajectory pipeline for reinforcement learning.
//!
//! The crate holds rollouts collected from environments and prepares them for
//! training loops:
//!
//! * An [`Episode`] is a set of time-aligned fields of a single rollout.
//! * A [`Trajectory`] owns episodes and, once registered, serves batches from
//!   a flat view concatenating every field across episodes.
//! * [`functional`] has the transforms adding derived fields to episodes,
//!   such as returns, advantages and recurrent masks.
//! * [`sampler`] is the contract of episode producers, and [`dataset`] loads
//!   and saves episode lists such as expert demonstrations.
//! * [`pipeline`] chains the transforms used by on-policy algorithms.
//!
//! Neural networks are out of scope. Transforms query models through the
//! [`ValueFunction`] and [`RewardGiver`] traits.
pub mod dataset;
pub mod error;
pub mod functional;
pub mod model;
pub mod pipeline;
pub mod record;
pub mod sampler;
pub mod stats;
pub mod util;

mod device;
pub use device::Device;

mod episode;
pub use episode::{Episode, FieldKey};

mod trajectory;
pub use trajectory::{
    Batch, BatchConfig, FlatView, MinibatchIter, SeqBatch, SeqBatchIter, TrajState, Trajectory,
};

pub use error::TrajError;
pub use model::{RecurrentInput, RewardGiver, ValueFunction};
