//! Episode container.
use super::FieldKey;
use crate::error::{Result, TrajError};
use ndarray::{Array1, Array2, ArrayD, ArrayView1, ArrayViewD, Axis, Ix1, Slice};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, convert::TryFrom, ops::Range};

/// A single rollout.
///
/// An episode maps [`FieldKey`]s to arrays whose first axis is time.
/// Every field has the same length `T >= 1` and the fields
/// [`FieldKey::REQUIRED`] are always present. Scalar-per-step fields
/// (see [`FieldKey::is_scalar`]) are one-dimensional.
///
/// Fields can be added or overwritten with [`Episode::set_field`], which
/// rejects arrays of a different length. Fields are never removed.
///
/// ```
/// use ndarray::{array, Array1};
/// use rollout_core::{Episode, FieldKey};
///
/// let epi = Episode::from_parts(
///     array![[0.0f32], [1.0], [2.0]],
///     array![[1.0f32], [1.0], [1.0]],
///     array![1.0f32, 1.0, 1.0],
///     array![0.0f32, 0.0, 1.0],
/// )
/// .unwrap();
/// assert_eq!(epi.len(), 3);
///
/// let mut epi = epi;
/// assert!(epi.set_scalar(FieldKey::Vs, Array1::<f32>::zeros(2)).is_err());
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(try_from = "EpisodeRecord", into = "EpisodeRecord")]
pub struct Episode {
    len: usize,
    fields: BTreeMap<FieldKey, ArrayD<f32>>,
}

/// Serialized form of [`Episode`], validated when converted back.
#[derive(Deserialize, Serialize)]
struct EpisodeRecord {
    fields: Vec<(FieldKey, ArrayD<f32>)>,
}

impl TryFrom<EpisodeRecord> for Episode {
    type Error = TrajError;

    fn try_from(record: EpisodeRecord) -> Result<Self> {
        Self::new(record.fields)
    }
}

impl From<Episode> for EpisodeRecord {
    fn from(epi: Episode) -> Self {
        Self {
            fields: epi.fields.into_iter().collect(),
        }
    }
}

/// Checks a field against the length of the episode it goes into.
pub(crate) fn check_field(key: &FieldKey, value: &ArrayD<f32>, len: usize) -> Result<()> {
    if value.ndim() == 0 {
        return Err(TrajError::shape(key, format!("({}, ...)", len), value.shape()));
    }
    if value.shape()[0] != len {
        return Err(TrajError::shape(key, len, value.shape()[0]));
    }
    if key.is_scalar() && value.ndim() != 1 {
        return Err(TrajError::shape(key, [len], value.shape()));
    }
    Ok(())
}

impl Episode {
    /// Constructs an episode from `(key, array)` pairs.
    ///
    /// Fails with [`TrajError::MissingField`] if one of [`FieldKey::REQUIRED`]
    /// is absent and with [`TrajError::Shape`] if the fields disagree on
    /// their length or the episode is empty.
    pub fn new(fields: impl IntoIterator<Item = (FieldKey, ArrayD<f32>)>) -> Result<Self> {
        let fields: BTreeMap<_, _> = fields.into_iter().collect();

        for key in FieldKey::REQUIRED.iter() {
            if !fields.contains_key(key) {
                return Err(TrajError::missing(key, 0));
            }
        }

        let obs = &fields[&FieldKey::Obs];
        let len = obs.shape().first().copied().unwrap_or(0);
        if len == 0 {
            return Err(TrajError::shape(&FieldKey::Obs, "at least one step", obs.shape()));
        }
        for (key, value) in fields.iter() {
            check_field(key, value, len)?;
        }

        Ok(Self { len, fields })
    }

    /// Constructs an episode from its required fields.
    pub fn from_parts(
        obs: Array2<f32>,
        acs: Array2<f32>,
        rews: Array1<f32>,
        dones: Array1<f32>,
    ) -> Result<Self> {
        Self::new([
            (FieldKey::Obs, obs.into_dyn()),
            (FieldKey::Acs, acs.into_dyn()),
            (FieldKey::Rews, rews.into_dyn()),
            (FieldKey::Dones, dones.into_dyn()),
        ])
    }

    /// The number of steps `T`.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`; episodes have at least one step.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the field exists.
    pub fn contains(&self, key: &FieldKey) -> bool {
        self.fields.contains_key(key)
    }

    /// Keys of the fields in a fixed order.
    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.fields.keys()
    }

    /// Returns the field, if any.
    pub fn get(&self, key: &FieldKey) -> Option<&ArrayD<f32>> {
        self.fields.get(key)
    }

    /// Returns the field or [`TrajError::MissingField`].
    pub fn field(&self, key: &FieldKey) -> Result<&ArrayD<f32>> {
        self.fields.get(key).ok_or_else(|| TrajError::missing(key, 0))
    }

    /// Returns a scalar-per-step field as a one-dimensional view.
    pub fn scalar(&self, key: &FieldKey) -> Result<ArrayView1<'_, f32>> {
        let value = self.field(key)?;
        value
            .view()
            .into_dimensionality::<Ix1>()
            .map_err(|_| TrajError::shape(key, [self.len], value.shape()))
    }

    /// Shape of the field at a single step.
    pub fn step_shape(&self, key: &FieldKey) -> Option<&[usize]> {
        self.fields.get(key).map(|v| &v.shape()[1..])
    }

    /// Observations.
    pub fn obs(&self) -> ArrayViewD<'_, f32> {
        self.fields[&FieldKey::Obs].view()
    }

    /// Actions.
    pub fn acs(&self) -> ArrayViewD<'_, f32> {
        self.fields[&FieldKey::Acs].view()
    }

    /// Rewards.
    pub fn rews(&self) -> ArrayView1<'_, f32> {
        // Checked to be one-dimensional on insertion.
        self.fields[&FieldKey::Rews]
            .view()
            .into_dimensionality::<Ix1>()
            .unwrap()
    }

    /// Terminal flags.
    pub fn dones(&self) -> ArrayView1<'_, f32> {
        self.fields[&FieldKey::Dones]
            .view()
            .into_dimensionality::<Ix1>()
            .unwrap()
    }

    /// Sum of rewards.
    pub fn sum_rews(&self) -> f32 {
        self.rews().sum()
    }

    /// Adds or overwrites a field.
    ///
    /// Fails with [`TrajError::Shape`] if the length of `value` differs from
    /// [`Episode::len`], or if a scalar-per-step field is not one-dimensional.
    pub fn set_field(&mut self, key: FieldKey, value: ArrayD<f32>) -> Result<()> {
        check_field(&key, &value, self.len)?;
        self.fields.insert(key, value);
        Ok(())
    }

    /// Adds or overwrites a scalar-per-step field.
    pub fn set_scalar(&mut self, key: FieldKey, value: Array1<f32>) -> Result<()> {
        self.set_field(key, value.into_dyn())
    }

    /// Returns a new episode holding the steps in `range` of every field.
    pub fn slice(&self, range: Range<usize>) -> Result<Self> {
        if range.start >= range.end || range.end > self.len {
            return Err(TrajError::shape(
                &FieldKey::Obs,
                format!("non-empty range within 0..{}", self.len),
                range,
            ));
        }
        let fields = self
            .fields
            .iter()
            .map(|(k, v)| {
                let s = Slice::from(range.clone());
                (k.clone(), v.slice_axis(Axis(0), s).to_owned())
            })
            .collect();

        Ok(Self {
            len: range.end - range.start,
            fields,
        })
    }

    pub(crate) fn fields(&self) -> &BTreeMap<FieldKey, ArrayD<f32>> {
        &self.fields
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::{array, Array2};

    fn episode(len: usize) -> Episode {
        let obs = Array2::from_shape_fn((len, 2), |(t, d)| (t * 2 + d) as f32);
        let acs = Array2::zeros((len, 1));
        Episode::from_parts(obs, acs, Array1::ones(len), Array1::zeros(len)).unwrap()
    }

    #[test]
    fn test_new_requires_core_fields() {
        let res = Episode::new([
            (FieldKey::Obs, Array2::<f32>::zeros((3, 2)).into_dyn()),
            (FieldKey::Rews, Array1::<f32>::zeros(3).into_dyn()),
            (FieldKey::Dones, Array1::<f32>::zeros(3).into_dyn()),
        ]);
        assert!(matches!(
            res,
            Err(TrajError::MissingField {
                field: FieldKey::Acs,
                ..
            })
        ));
    }

    #[test]
    fn test_new_rejects_unequal_lengths() {
        let res = Episode::from_parts(
            Array2::zeros((3, 2)),
            Array2::zeros((3, 1)),
            Array1::zeros(2),
            Array1::zeros(3),
        );
        assert!(matches!(res, Err(TrajError::Shape { field: FieldKey::Rews, .. })));
    }

    #[test]
    fn test_new_rejects_empty() {
        let res = Episode::from_parts(
            Array2::zeros((0, 2)),
            Array2::zeros((0, 1)),
            Array1::zeros(0),
            Array1::zeros(0),
        );
        assert!(matches!(res, Err(TrajError::Shape { .. })));
    }

    #[test]
    fn test_set_field() {
        let mut epi = episode(4);
        epi.set_scalar(FieldKey::Vs, Array1::zeros(4)).unwrap();
        assert!(epi.contains(&FieldKey::Vs));

        let err = epi.set_scalar(FieldKey::Rets, Array1::zeros(5)).unwrap_err();
        assert!(matches!(err, TrajError::Shape { .. }));
        assert!(!epi.contains(&FieldKey::Rets));

        // Scalar fields must be one-dimensional
        let err = epi
            .set_field(FieldKey::Advs, Array2::zeros((4, 1)).into_dyn())
            .unwrap_err();
        assert!(matches!(err, TrajError::Shape { .. }));

        // Overwriting keeps the length
        epi.set_scalar(FieldKey::Vs, array![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(epi.scalar(&FieldKey::Vs).unwrap()[3], 4.0);
        assert_eq!(epi.len(), 4);
    }

    #[test]
    fn test_slice() {
        let epi = episode(5);
        let sub = epi.slice(1..3).unwrap();
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.obs()[[0, 0]], 2.0);
        assert_eq!(sub.obs()[[1, 1]], 5.0);
        assert!(epi.slice(3..3).is_err());
        assert!(epi.slice(2..6).is_err());
    }

    #[test]
    fn test_step_shape() {
        let epi = episode(3);
        assert_eq!(epi.step_shape(&FieldKey::Obs), Some(&[2usize][..]));
        assert_eq!(epi.step_shape(&FieldKey::Rews), Some(&[][..]));
        assert_eq!(epi.step_shape(&FieldKey::Vs), None);
    }
}
