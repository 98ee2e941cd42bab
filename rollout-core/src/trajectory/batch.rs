//! Batches drawn from a flat view.
use super::FlatView;
use crate::{
    error::{Result, TrajError},
    FieldKey,
};
use ndarray::{Array2, ArrayD, ArrayView1, Axis, Ix1, IxDyn, Slice};
use rand::{rngs::StdRng, seq::SliceRandom, RngCore, SeedableRng};
use std::collections::BTreeMap;

/// Steps selected from a [`FlatView`].
///
/// Every field of the view is present, with the selected rows stacked
/// along axis 0.
#[derive(Debug, Clone)]
pub struct Batch {
    fields: BTreeMap<FieldKey, ArrayD<f32>>,
    ix_sample: Vec<usize>,
}

impl Batch {
    pub(super) fn select(view: &FlatView, ixs: Vec<usize>) -> Self {
        let fields = view
            .fields()
            .iter()
            .map(|(k, v)| (k.clone(), v.select(Axis(0), &ixs)))
            .collect();
        Self {
            fields,
            ix_sample: ixs,
        }
    }

    /// The number of steps in the batch.
    pub fn len(&self) -> usize {
        self.ix_sample.len()
    }

    /// Returns `true` if the batch has no steps.
    pub fn is_empty(&self) -> bool {
        self.ix_sample.is_empty()
    }

    /// Returns the field, if any.
    pub fn get(&self, key: &FieldKey) -> Option<&ArrayD<f32>> {
        self.fields.get(key)
    }

    /// Returns the field or [`TrajError::MissingField`].
    pub fn field(&self, key: &FieldKey) -> Result<&ArrayD<f32>> {
        self.fields
            .get(key)
            .ok_or_else(|| TrajError::missing(key, 0))
    }

    /// Returns a scalar-per-step field as a one-dimensional view.
    pub fn scalar(&self, key: &FieldKey) -> Result<ArrayView1<'_, f32>> {
        let value = self.field(key)?;
        value
            .view()
            .into_dimensionality::<Ix1>()
            .map_err(|_| TrajError::shape(key, [self.len()], value.shape()))
    }

    /// Indices of the selected steps in the flat view.
    pub fn ix_sample(&self) -> &[usize] {
        &self.ix_sample
    }

    /// Consumes the batch and returns its fields.
    pub fn into_fields(self) -> BTreeMap<FieldKey, ArrayD<f32>> {
        self.fields
    }
}

/// Lazy sequence of minibatches over a [`FlatView`].
///
/// Each epoch visits every step exactly once. Create a new iterator to start
/// over; the view itself is never modified.
pub struct MinibatchIter<'a> {
    view: &'a FlatView,
    batch_size: usize,
    shuffle: bool,
    rng: StdRng,
    ixs: Vec<usize>,
    pos: usize,
    epochs_left: usize,
}

impl<'a> MinibatchIter<'a> {
    pub(super) fn new(
        view: &'a FlatView,
        batch_size: usize,
        epoch: usize,
        shuffle: bool,
        seed: u64,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(TrajError::InvalidArgument(
                "batch_size must be positive".to_string(),
            ));
        }
        Ok(Self {
            view,
            batch_size,
            shuffle,
            rng: StdRng::seed_from_u64(seed),
            ixs: vec![],
            pos: 0,
            epochs_left: epoch,
        })
    }

    fn start_epoch(&mut self) {
        self.ixs = (0..self.view.num_step()).collect();
        if self.shuffle {
            self.ixs.shuffle(&mut self.rng);
        }
        self.pos = 0;
        self.epochs_left -= 1;
    }
}

impl<'a> Iterator for MinibatchIter<'a> {
    type Item = Batch;

    fn next(&mut self) -> Option<Self::Item> {
        if self.view.num_step() == 0 {
            return None;
        }
        if self.pos >= self.ixs.len() {
            if self.epochs_left == 0 {
                return None;
            }
            self.start_epoch();
        }

        let end = (self.pos + self.batch_size).min(self.ixs.len());
        let ixs = self.ixs[self.pos..end].to_vec();
        self.pos = end;
        Some(Batch::select(self.view, ixs))
    }
}

/// Whole episodes padded to a common length, laid out time-major.
///
/// Every field has shape `(L, B, ...)`, where `L` is the length of the longest
/// episode in the batch and `B` the number of episodes. Padded steps are zero
/// and marked by `0.0` in [`SeqBatch::out_masks`].
#[derive(Debug, Clone)]
pub struct SeqBatch {
    fields: BTreeMap<FieldKey, ArrayD<f32>>,
    out_masks: Array2<f32>,
    episodes: Vec<usize>,
}

impl SeqBatch {
    fn build(view: &FlatView, episodes: Vec<usize>) -> Self {
        let ranges = episodes
            .iter()
            .map(|&i| view.range(i))
            .collect::<Vec<_>>();
        let max_len = ranges.iter().map(|r| r.len()).max().unwrap_or(0);
        let n_epi = episodes.len();

        let fields = view
            .fields()
            .iter()
            .map(|(k, v)| {
                let mut shape = vec![max_len, n_epi];
                shape.extend_from_slice(&v.shape()[1..]);
                let mut out = ArrayD::zeros(IxDyn(&shape));
                for (b, r) in ranges.iter().enumerate() {
                    let src = v.slice_axis(Axis(0), Slice::from(r.clone()));
                    out.index_axis_mut(Axis(1), b)
                        .slice_axis_mut(Axis(0), Slice::from(0..r.len()))
                        .assign(&src);
                }
                (k.clone(), out)
            })
            .collect();

        let out_masks =
            Array2::from_shape_fn((max_len, n_epi), |(t, b)| (t < ranges[b].len()) as u8 as f32);

        Self {
            fields,
            out_masks,
            episodes,
        }
    }

    /// Returns the field, if any.
    pub fn get(&self, key: &FieldKey) -> Option<&ArrayD<f32>> {
        self.fields.get(key)
    }

    /// Returns the field or [`TrajError::MissingField`].
    pub fn field(&self, key: &FieldKey) -> Result<&ArrayD<f32>> {
        self.fields
            .get(key)
            .ok_or_else(|| TrajError::missing(key, 0))
    }

    /// `1.0` at valid steps, `0.0` at padding, `(L, B)`.
    pub fn out_masks(&self) -> &Array2<f32> {
        &self.out_masks
    }

    /// Indices of the episodes in the batch.
    pub fn episodes(&self) -> &[usize] {
        &self.episodes
    }

    /// The padded length `L`.
    pub fn seq_len(&self) -> usize {
        self.out_masks.shape()[0]
    }
}

/// Lazy sequence of [`SeqBatch`]es, one pass over the episodes.
pub struct SeqBatchIter<'a> {
    view: &'a FlatView,
    order: Vec<usize>,
    pos: usize,
    num_epi_per_batch: usize,
}

impl<'a> SeqBatchIter<'a> {
    pub(super) fn new<R: RngCore>(
        view: &'a FlatView,
        num_epi_per_batch: usize,
        shuffle: bool,
        rng: &mut R,
    ) -> Result<Self> {
        if num_epi_per_batch == 0 {
            return Err(TrajError::InvalidArgument(
                "num_epi_per_batch must be positive".to_string(),
            ));
        }
        let mut order = (0..view.num_epi()).collect::<Vec<_>>();
        if shuffle {
            order.shuffle(rng);
        }
        Ok(Self {
            view,
            order,
            pos: 0,
            num_epi_per_batch,
        })
    }
}

impl<'a> Iterator for SeqBatchIter<'a> {
    type Item = SeqBatch;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.order.len() {
            return None;
        }
        let end = (self.pos + self.num_epi_per_batch).min(self.order.len());
        let episodes = self.order[self.pos..end].to_vec();
        self.pos = end;
        Some(SeqBatch::build(self.view, episodes))
    }
}
