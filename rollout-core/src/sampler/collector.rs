//! Accumulates steps into an episode.
use crate::{
    error::{Result, TrajError},
    Episode, FieldKey,
};
use ndarray::{stack, Array1, ArrayD, ArrayViewD, Axis};
use std::collections::BTreeMap;

/// Builds an [`Episode`] step by step.
///
/// The per-step shape of every field is fixed by its first step.
#[derive(Debug, Default)]
pub struct EpisodeCollector {
    steps: BTreeMap<FieldKey, Vec<ArrayD<f32>>>,
    rews: Vec<f32>,
    dones: Vec<f32>,
}

impl EpisodeCollector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of steps pushed so far.
    pub fn len(&self) -> usize {
        self.rews.len()
    }

    /// Returns `true` if no step has been pushed.
    pub fn is_empty(&self) -> bool {
        self.rews.is_empty()
    }

    /// Drops the steps pushed so far.
    pub fn clear(&mut self) {
        self.steps.clear();
        self.rews.clear();
        self.dones.clear();
    }

    fn push_value(&mut self, key: FieldKey, value: ArrayD<f32>) -> Result<()> {
        let values = self.steps.entry(key.clone()).or_default();
        if let Some(first) = values.first() {
            if first.shape() != value.shape() {
                return Err(TrajError::shape(&key, first.shape(), value.shape()));
            }
        }
        values.push(value);
        Ok(())
    }

    /// Pushes a transition: the observation the action was taken at, the
    /// action, the reward and whether the episode terminated.
    pub fn push_step(
        &mut self,
        obs: ArrayD<f32>,
        act: ArrayD<f32>,
        reward: f32,
        is_done: bool,
    ) -> Result<()> {
        for (key, value) in [(FieldKey::Obs, &obs), (FieldKey::Acs, &act)].iter() {
            if let Some(first) = self.steps.get(key).and_then(|v| v.first()) {
                if first.shape() != value.shape() {
                    return Err(TrajError::shape(key, first.shape(), value.shape()));
                }
            }
        }
        self.push_value(FieldKey::Obs, obs)?;
        self.push_value(FieldKey::Acs, act)?;
        self.rews.push(reward);
        self.dones.push(if is_done { 1.0 } else { 0.0 });
        Ok(())
    }

    /// Records an extra per-step value for the last pushed step, such as
    /// [`FieldKey::Hs`].
    pub fn push_extra(&mut self, key: FieldKey, value: ArrayD<f32>) -> Result<()> {
        if FieldKey::REQUIRED.contains(&key) {
            return Err(TrajError::InvalidArgument(format!(
                "{} is pushed with push_step()",
                key
            )));
        }
        let n = self.steps.get(&key).map_or(0, |v| v.len());
        if n + 1 != self.len() {
            return Err(TrajError::shape(&key, self.len(), n + 1));
        }
        self.push_value(key, value)
    }

    /// Stacks the pushed steps into an episode and clears the collector.
    ///
    /// Fails with [`TrajError::Shape`] if no step was pushed or an extra field
    /// was not recorded at every step. The collector is cleared either way.
    pub fn finish(&mut self) -> Result<Episode> {
        let steps = std::mem::take(&mut self.steps);
        let rews = std::mem::take(&mut self.rews);
        let dones = std::mem::take(&mut self.dones);
        if rews.is_empty() {
            return Err(TrajError::shape(&FieldKey::Obs, "at least one step", 0));
        }

        let mut fields = Vec::with_capacity(steps.len() + 2);
        for (key, values) in steps.into_iter() {
            if values.len() != rews.len() {
                return Err(TrajError::shape(&key, rews.len(), values.len()));
            }
            let views: Vec<ArrayViewD<'_, f32>> = values.iter().map(|v| v.view()).collect();
            let stacked =
                stack(Axis(0), &views).map_err(|e| TrajError::shape(&key, "equal shapes", e))?;
            fields.push((key, stacked));
        }
        fields.push((FieldKey::Rews, Array1::from(rews).into_dyn()));
        fields.push((FieldKey::Dones, Array1::from(dones).into_dyn()));

        Episode::new(fields)
    }
}
