//! Flat view of a trajectory.
use super::{Batch, MinibatchIter, SeqBatchIter};
use crate::{
    error::{Result, TrajError},
    Episode, FieldKey,
};
use ndarray::{concatenate, ArrayD, ArrayViewD, Axis};
use rand::{Rng, RngCore};
use std::{collections::BTreeMap, ops::Range};

/// Fields of all episodes concatenated along the time axis.
///
/// A flat view is an immutable snapshot taken by
/// [`Trajectory::register`](super::Trajectory::register). It keeps the
/// boundaries of the episodes it was built from, so batches of whole
/// episodes can be drawn for recurrent models.
#[derive(Debug)]
pub struct FlatView {
    fields: BTreeMap<FieldKey, ArrayD<f32>>,

    /// Start offset of every episode followed by the total number of steps.
    epis_index: Vec<usize>,
}

impl FlatView {
    /// Concatenates the fields of `epis` in order.
    ///
    /// Fails with [`TrajError::FieldMismatch`] if the episodes do not have the
    /// same set of fields, and with [`TrajError::Shape`] if the shape of a
    /// field at a single step differs across episodes.
    pub(crate) fn build(epis: &[Episode]) -> Result<Self> {
        let mut epis_index = Vec::with_capacity(epis.len() + 1);
        epis_index.push(0);
        for epi in epis.iter() {
            epis_index.push(epis_index[epis_index.len() - 1] + epi.len());
        }

        let first = match epis.first() {
            Some(epi) => epi,
            None => {
                return Ok(Self {
                    fields: BTreeMap::new(),
                    epis_index,
                })
            }
        };

        let expected = first.keys().cloned().collect::<Vec<_>>();
        for (i, epi) in epis.iter().enumerate().skip(1) {
            if !epi.keys().eq(expected.iter()) {
                return Err(TrajError::FieldMismatch {
                    episode: i,
                    expected,
                    actual: epi.keys().cloned().collect(),
                });
            }
        }

        let mut fields = BTreeMap::new();
        for key in expected.iter() {
            let step_shape = &first.fields()[key].shape()[1..];
            let mut views: Vec<ArrayViewD<'_, f32>> = Vec::with_capacity(epis.len());
            for epi in epis.iter() {
                let v = &epi.fields()[key];
                if &v.shape()[1..] != step_shape {
                    return Err(TrajError::shape(key, step_shape, &v.shape()[1..]));
                }
                views.push(v.view());
            }
            let flat = concatenate(Axis(0), &views)
                .map_err(|e| TrajError::shape(key, step_shape, e))?;
            fields.insert(key.clone(), flat);
        }

        Ok(Self { fields, epis_index })
    }

    /// The total number of steps.
    pub fn num_step(&self) -> usize {
        self.epis_index[self.epis_index.len() - 1]
    }

    /// The number of episodes.
    pub fn num_epi(&self) -> usize {
        self.epis_index.len() - 1
    }

    /// Steps of the `i`-th episode in the view, or `None` if `i` is out of range.
    pub fn episode_range(&self, i: usize) -> Option<Range<usize>> {
        if i < self.num_epi() {
            Some(self.range(i))
        } else {
            None
        }
    }

    /// `i` must be smaller than the number of episodes.
    pub(super) fn range(&self, i: usize) -> Range<usize> {
        self.epis_index[i]..self.epis_index[i + 1]
    }

    /// Keys of the fields in the view.
    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.fields.keys()
    }

    /// Returns the concatenated field, if any.
    pub fn get(&self, key: &FieldKey) -> Option<&ArrayD<f32>> {
        self.fields.get(key)
    }

    /// Returns the concatenated field or [`TrajError::MissingField`].
    pub fn field(&self, key: &FieldKey) -> Result<&ArrayD<f32>> {
        self.fields
            .get(key)
            .ok_or_else(|| TrajError::missing(key, 0))
    }

    pub(super) fn fields(&self) -> &BTreeMap<FieldKey, ArrayD<f32>> {
        &self.fields
    }

    /// Selects the given steps.
    pub fn select(&self, ixs: Vec<usize>) -> Result<Batch> {
        if let Some(&ix) = ixs.iter().find(|&&ix| ix >= self.num_step()) {
            return Err(TrajError::InvalidArgument(format!(
                "index {} out of {} steps",
                ix,
                self.num_step()
            )));
        }
        Ok(Batch::select(self, ixs))
    }

    /// One epoch of minibatches.
    ///
    /// Within the epoch, steps are drawn without replacement. If `shuffle` is
    /// `false`, steps are visited in the order of the view.
    pub fn minibatches<R: RngCore>(
        &self,
        batch_size: usize,
        shuffle: bool,
        rng: &mut R,
    ) -> Result<MinibatchIter<'_>> {
        MinibatchIter::new(self, batch_size, 1, shuffle, rng.next_u64())
    }

    /// `epoch` passes of minibatches, shuffled with a generator seeded by `seed`.
    pub fn epochs(
        &self,
        batch_size: usize,
        epoch: usize,
        shuffle: bool,
        seed: u64,
    ) -> Result<MinibatchIter<'_>> {
        MinibatchIter::new(self, batch_size, epoch, shuffle, seed)
    }

    /// Steps drawn uniformly with replacement.
    pub fn random_batch<R: Rng>(&self, batch_size: usize, rng: &mut R) -> Result<Batch> {
        if self.num_step() == 0 {
            return Err(TrajError::InvalidArgument(
                "cannot sample from an empty view".to_string(),
            ));
        }
        let ixs = (0..batch_size)
            .map(|_| rng.gen_range(0..self.num_step()))
            .collect();
        Ok(Batch::select(self, ixs))
    }

    /// Every step in order.
    pub fn full_batch(&self) -> Batch {
        Batch::select(self, (0..self.num_step()).collect())
    }

    /// One pass over whole episodes, `num_epi_per_batch` at a time.
    ///
    /// Batches never cut through an episode. See [`SeqBatch`](super::SeqBatch).
    pub fn iterate_rnn<R: RngCore>(
        &self,
        num_epi_per_batch: usize,
        shuffle: bool,
        rng: &mut R,
    ) -> Result<SeqBatchIter<'_>> {
        SeqBatchIter::new(self, num_epi_per_batch, shuffle, rng)
    }
}
