//! Sampling episodes by running a policy in an environment.
//!
//! Samplers are the producers of a [`Trajectory`](crate::Trajectory). Whatever
//! they do internally, they hand over completed episodes in order:
//!
//! ```
//! use anyhow::Result;
//! use ndarray::{arr1, ArrayD};
//! use rollout_core::{
//!     sampler::{Env, EpisodeSampler, Policy, SampleLimit, Step, SyncSampler},
//!     Trajectory,
//! };
//!
//! /// Counts up to three.
//! struct Counter(f32);
//!
//! impl Env for Counter {
//!     fn reset(&mut self) -> Result<ArrayD<f32>> {
//!         self.0 = 0.0;
//!         Ok(arr1(&[self.0]).into_dyn())
//!     }
//!
//!     fn step(&mut self, _act: &ArrayD<f32>) -> Result<Step> {
//!         self.0 += 1.0;
//!         Ok(Step::new(arr1(&[self.0]).into_dyn(), 1.0, self.0 >= 3.0))
//!     }
//! }
//!
//! struct Zero;
//!
//! impl Policy for Zero {
//!     fn sample(&mut self, _obs: &ArrayD<f32>) -> Result<ArrayD<f32>> {
//!         Ok(arr1(&[0.0]).into_dyn())
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let mut sampler = SyncSampler::new(Counter(0.0));
//! let epis = sampler.sample(&mut Zero, SampleLimit::MaxEpisodes(2))?;
//! let traj = Trajectory::from_episodes(epis);
//! assert_eq!(traj.num_step(), 6);
//! # Ok(())
//! # }
//! ```
mod collector;
mod sync;
use crate::Episode;
use anyhow::Result;
pub use collector::EpisodeCollector;
use ndarray::ArrayD;
pub use sync::SyncSampler;

/// The result of a step of an environment.
#[derive(Debug, Clone)]
pub struct Step {
    /// Observation after the step.
    pub obs: ArrayD<f32>,

    /// Reward of the step.
    pub reward: f32,

    /// `true` if the episode has terminated.
    pub is_done: bool,
}

impl Step {
    /// Constructs a step.
    pub fn new(obs: ArrayD<f32>, reward: f32, is_done: bool) -> Self {
        Self {
            obs,
            reward,
            is_done,
        }
    }
}

/// An environment, typically an MDP.
pub trait Env {
    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<ArrayD<f32>>;

    /// Applies an action.
    fn step(&mut self, act: &ArrayD<f32>) -> Result<Step>;
}

/// A mapping from observations to actions.
pub trait Policy {
    /// Called at the start of every episode.
    fn reset(&mut self) {}

    /// Samples an action given an observation.
    fn sample(&mut self, obs: &ArrayD<f32>) -> Result<ArrayD<f32>>;

    /// Hidden state the next action is sampled with, if the policy is recurrent.
    ///
    /// When this returns `Some`, samplers record it as [`FieldKey::Hs`](crate::FieldKey::Hs).
    fn hidden_state(&self) -> Option<ArrayD<f32>> {
        None
    }
}

/// When a sampler stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleLimit {
    /// Stops once the total number of steps reaches the limit.
    ///
    /// The episode in progress is finished, so the result can hold more steps.
    MaxSteps(usize),

    /// Stops after the given number of episodes.
    MaxEpisodes(usize),
}

impl SampleLimit {
    pub(crate) fn is_reached(&self, num_epi: usize, num_step: usize) -> bool {
        match self {
            Self::MaxSteps(n) => num_step >= *n,
            Self::MaxEpisodes(n) => num_epi >= *n,
        }
    }
}

/// Produces completed episodes.
pub trait EpisodeSampler {
    /// Runs `policy` until `limit` is reached and returns the episodes in the
    /// order they were completed.
    fn sample<P: Policy + ?Sized>(
        &mut self,
        policy: &mut P,
        limit: SampleLimit,
    ) -> Result<Vec<Episode>>;
}
