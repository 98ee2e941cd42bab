//! Statistics used for normalization.
//!
//! Statistics are plain values owned by the caller. They are returned by
//! [`normalize_obs_and_acs`](crate::functional::normalize_obs_and_acs) and can
//! be passed back in to normalize freshly sampled data with training-time
//! statistics.
use crate::{
    error::{Result, TrajError},
    FieldKey,
};
use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};
use serde::{Deserialize, Serialize};

/// Standard deviations below this value are replaced by one.
pub const STD_EPS: f32 = 1e-6;

/// Per-dimension mean and standard deviation.
///
/// Both arrays have the shape of a single step of the field they describe.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct MeanStd {
    /// Mean.
    pub mean: ArrayD<f32>,

    /// Standard deviation. Dimensions below [`STD_EPS`] are applied as one.
    pub std: ArrayD<f32>,
}

impl MeanStd {
    /// Creates statistics from mean and standard deviation.
    ///
    /// Dimensions with a standard deviation below [`STD_EPS`] get a unit scale.
    pub fn new(mean: ArrayD<f32>, std: ArrayD<f32>) -> Self {
        Self {
            mean,
            std: guard_std(std),
        }
    }

    /// Population statistics over axis 0 of `samples`.
    ///
    /// Returns `None` if there are no samples.
    pub fn from_samples(samples: ArrayViewD<'_, f32>) -> Option<Self> {
        if samples.ndim() == 0 || samples.shape()[0] == 0 {
            return None;
        }
        let mean = samples.mean_axis(Axis(0))?;
        let std = samples.var_axis(Axis(0), 0.0).mapv(f32::sqrt);
        Some(Self::new(mean, std))
    }

    /// Returns `(x - mean) / std` for `x` of shape `(N, ...)`.
    pub fn normalize(&self, key: &FieldKey, x: &ArrayD<f32>) -> Result<ArrayD<f32>> {
        if x.ndim() == 0 || &x.shape()[1..] != self.mean.shape() {
            return Err(TrajError::shape(key, self.mean.shape(), x.shape()));
        }
        Ok((x - &self.mean) / &guard_std(self.std.clone()))
    }

    /// Inverse of [`MeanStd::normalize`].
    pub fn denormalize(&self, key: &FieldKey, x: &ArrayD<f32>) -> Result<ArrayD<f32>> {
        if x.ndim() == 0 || &x.shape()[1..] != self.mean.shape() {
            return Err(TrajError::shape(key, self.mean.shape(), x.shape()));
        }
        Ok(x * &guard_std(self.std.clone()) + &self.mean)
    }
}

fn guard_std(std: ArrayD<f32>) -> ArrayD<f32> {
    std.mapv(|s| if s < STD_EPS { 1.0 } else { s })
}

/// Statistics of observations and actions.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ObsAcsStats {
    /// Statistics of observations, also applied to next observations.
    pub obs: MeanStd,

    /// Statistics of actions.
    pub acs: MeanStd,
}

/// Mean and variance accumulated over successive batches.
///
/// Batches are merged with the parallel variant of Welford's algorithm, so the
/// result equals the population statistics of all samples seen so far.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct RunningMeanStd {
    /// Running mean.
    pub mean: ArrayD<f32>,

    /// Running population variance.
    pub var: ArrayD<f32>,

    /// The number of samples seen.
    pub count: f32,
}

impl RunningMeanStd {
    /// Creates statistics for samples with the given per-step shape.
    pub fn new(shape: &[usize]) -> Self {
        Self {
            mean: ArrayD::zeros(IxDyn(shape)),
            var: ArrayD::zeros(IxDyn(shape)),
            count: 0.0,
        }
    }

    /// Merges a batch of shape `(N, ...)` into the statistics.
    pub fn update(&mut self, batch: ArrayViewD<'_, f32>) -> Result<()> {
        let key = FieldKey::Extra("running_mean_std".to_string());
        if batch.ndim() == 0 || &batch.shape()[1..] != self.mean.shape() {
            return Err(TrajError::shape(&key, self.mean.shape(), batch.shape()));
        }
        let batch_count = batch.shape()[0] as f32;
        if batch_count == 0.0 {
            return Ok(());
        }
        let batch_mean = batch
            .mean_axis(Axis(0))
            .ok_or_else(|| TrajError::shape(&key, "(N > 0, ...)", batch.shape()))?;
        let batch_var = batch.var_axis(Axis(0), 0.0);
        self.update_from_moments(batch_mean, batch_var, batch_count);
        Ok(())
    }

    fn update_from_moments(
        &mut self,
        batch_mean: ArrayD<f32>,
        batch_var: ArrayD<f32>,
        batch_count: f32,
    ) {
        let tot_count = self.count + batch_count;
        let delta = &batch_mean - &self.mean;
        let m_a = &self.var * self.count;
        let m_b = batch_var * batch_count;
        let m_2 = m_a + m_b + delta.mapv(|d| d * d) * (self.count * batch_count / tot_count);

        self.mean = &self.mean + &(delta * (batch_count / tot_count));
        self.var = m_2 / tot_count;
        self.count = tot_count;
    }

    /// Converts into normalization statistics.
    pub fn to_mean_std(&self) -> MeanStd {
        MeanStd::new(self.mean.clone(), self.var.mapv(f32::sqrt))
    }
}
