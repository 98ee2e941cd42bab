//! Trajectory, an ordered collection of episodes.
use super::{Batch, BatchConfig, FlatView, MinibatchIter, SeqBatchIter};
use crate::{
    error::{Result, TrajError},
    record::{Record, RecordValue},
    Episode,
};
use log::debug;
use rand::{Rng, RngCore};
use std::sync::Arc;

/// Lifecycle state of a [`Trajectory`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TrajState {
    /// No episodes.
    Empty,

    /// Episodes were added since the last registration.
    Populated,

    /// Episodes were modified since the last registration.
    Augmented,

    /// The flat view reflects the current episodes.
    Registered,
}

impl Default for TrajState {
    fn default() -> Self {
        Self::Empty
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// An ordered collection of episodes with a derived flat view.
///
/// Episodes are moved in with [`Trajectory::add_episodes`] or
/// [`Trajectory::add_trajectory`], augmented by the transforms in
/// [`functional`](crate::functional), and finally registered with
/// [`Trajectory::register`], which concatenates every field across episodes.
/// Training loops read batches from the registered view only.
///
/// ```mermaid
/// stateDiagram-v2
///     [*] --> Empty
///     Empty --> Populated: add_episodes
///     Empty --> Registered: register
///     Populated --> Augmented: transform
///     Augmented --> Augmented: transform
///     Populated --> Registered: register
///     Augmented --> Registered: register
///     Registered --> Populated: add_episodes
///     Registered --> Augmented: transform
/// ```
///
/// Any mutation drops the view held by the trajectory, and batch requests
/// fail with [`TrajError::NotRegistered`] until the next registration.
/// A [`FlatView`] handle obtained earlier stays valid and keeps reflecting
/// the episodes present when it was built.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    epis: Vec<Episode>,
    flat: Option<Arc<FlatView>>,
    state: TrajState,
}

impl Trajectory {
    /// Creates an empty trajectory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a trajectory holding the given episodes.
    pub fn from_episodes(epis: Vec<Episode>) -> Self {
        let mut traj = Self::new();
        traj.add_episodes(epis);
        traj
    }

    /// Appends episodes and invalidates the flat view.
    pub fn add_episodes(&mut self, epis: Vec<Episode>) {
        if epis.is_empty() {
            return;
        }
        self.epis.extend(epis);
        self.flat = None;
        self.state = TrajState::Populated;
    }

    /// Appends all episodes of `other` after the episodes of `self`.
    ///
    /// `other` is consumed, so no episode is ever shared between trajectories.
    /// Clone it first to keep a copy.
    pub fn add_trajectory(&mut self, other: Trajectory) {
        self.add_episodes(other.epis);
    }

    /// Builds the flat view of the current episodes.
    ///
    /// An empty trajectory registers to an empty view, which serves empty
    /// full batches and rejects random batches.
    pub fn register(&mut self) -> Result<Arc<FlatView>> {
        let flat = Arc::new(FlatView::build(&self.epis)?);
        debug!(
            "Registered {} episodes, {} steps",
            flat.num_epi(),
            flat.num_step()
        );
        self.flat = Some(flat.clone());
        self.state = TrajState::Registered;
        Ok(flat)
    }

    /// Returns the flat view built by the last registration.
    ///
    /// Fails with [`TrajError::NotRegistered`] if the trajectory was mutated
    /// after that or never registered.
    pub fn flat_view(&self) -> Result<Arc<FlatView>> {
        self.flat.clone().ok_or(TrajError::NotRegistered)
    }

    /// Returns `true` if the flat view reflects the current episodes.
    pub fn is_registered(&self) -> bool {
        self.state == TrajState::Registered
    }

    /// Lifecycle state.
    pub fn state(&self) -> TrajState {
        self.state
    }

    /// The episodes in order.
    pub fn episodes(&self) -> &[Episode] {
        &self.epis
    }

    /// Mutable access to the episodes; invalidates the flat view.
    pub fn episodes_mut(&mut self) -> &mut [Episode] {
        if !self.epis.is_empty() {
            self.flat = None;
            self.state = TrajState::Augmented;
        }
        &mut self.epis
    }

    /// Consumes the trajectory and returns its episodes.
    pub fn into_episodes(self) -> Vec<Episode> {
        self.epis
    }

    /// The number of episodes.
    pub fn num_epi(&self) -> usize {
        self.epis.len()
    }

    /// The total number of steps.
    pub fn num_step(&self) -> usize {
        self.epis.iter().map(|e| e.len()).sum()
    }

    fn view(&self) -> Result<&FlatView> {
        self.flat.as_deref().ok_or(TrajError::NotRegistered)
    }

    /// One epoch of minibatches over the flat view.
    pub fn minibatches<R: RngCore>(
        &self,
        batch_size: usize,
        shuffle: bool,
        rng: &mut R,
    ) -> Result<MinibatchIter<'_>> {
        self.view()?.minibatches(batch_size, shuffle, rng)
    }

    /// Minibatches over the flat view as configured.
    pub fn iterate(&self, config: &BatchConfig) -> Result<MinibatchIter<'_>> {
        self.view()?
            .epochs(config.batch_size, config.epoch, config.shuffle, config.seed)
    }

    /// Steps drawn uniformly with replacement.
    pub fn random_batch<R: Rng>(&self, batch_size: usize, rng: &mut R) -> Result<Batch> {
        self.view()?.random_batch(batch_size, rng)
    }

    /// Every step in order.
    pub fn full_batch(&self) -> Result<Batch> {
        Ok(self.view()?.full_batch())
    }

    /// Batches of whole episodes for recurrent models.
    pub fn iterate_rnn<R: RngCore>(
        &self,
        num_epi_per_batch: usize,
        shuffle: bool,
        rng: &mut R,
    ) -> Result<SeqBatchIter<'_>> {
        self.view()?.iterate_rnn(num_epi_per_batch, shuffle, rng)
    }

    /// Summary of episode lengths and rewards.
    ///
    /// `epi_lens` and `epi_rews` hold one value per episode and are absent for
    /// an empty trajectory.
    pub fn summary(&self) -> Record {
        let mut record = Record::from_scalar("num_epi", self.num_epi() as f32);
        record.insert("num_step", RecordValue::Scalar(self.num_step() as f32));
        if self.epis.is_empty() {
            return record;
        }

        let n = self.num_epi() as f32;
        let sums = self.epis.iter().map(|e| e.sum_rews()).collect::<Vec<_>>();
        let max = sums.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min = sums.iter().cloned().fold(f32::INFINITY, f32::min);
        record.insert("mean_epi_len", RecordValue::Scalar(self.num_step() as f32 / n));
        record.insert("mean_epi_rew", RecordValue::Scalar(sums.iter().sum::<f32>() / n));
        record.insert("max_epi_rew", RecordValue::Scalar(max));
        record.insert("min_epi_rew", RecordValue::Scalar(min));
        record.insert(
            "epi_lens",
            RecordValue::Array1(self.epis.iter().map(|e| e.len() as f32).collect()),
        );
        record.insert("epi_rews", RecordValue::Array1(sums));
        record
    }
}
