//! Configuration of on-policy preprocessing.
use crate::BatchConfig;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`prepare_on_policy`](super::prepare_on_policy).
///
/// ```
/// use rollout_core::{pipeline::OnPolicyConfig, BatchConfig};
///
/// let config = OnPolicyConfig::default()
///     .gamma(0.995)
///     .lam(0.97)
///     .batch(BatchConfig::default().batch_size(256).epoch(10));
/// assert!(config.centerize_advs);
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct OnPolicyConfig {
    /// Discount factor.
    pub gamma: f32,

    /// GAE parameter.
    pub lam: f32,

    /// If `true`, advantages are standardized over the trajectory.
    pub centerize_advs: bool,

    /// If `true`, `h_masks` are added for recurrent models.
    pub h_masks: bool,

    /// Batch iteration used by the training loop.
    pub batch: BatchConfig,
}

impl Default for OnPolicyConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            lam: 0.95,
            centerize_advs: true,
            h_masks: false,
            batch: BatchConfig::default(),
        }
    }
}

impl OnPolicyConfig {
    /// Sets the discount factor.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the GAE parameter.
    pub fn lam(mut self, v: f32) -> Self {
        self.lam = v;
        self
    }

    /// Sets whether advantages are standardized.
    pub fn centerize_advs(mut self, v: bool) -> Self {
        self.centerize_advs = v;
        self
    }

    /// Sets whether `h_masks` are added.
    pub fn h_masks(mut self, v: bool) -> Self {
        self.h_masks = v;
        self
    }

    /// Sets the batch configuration.
    pub fn batch(mut self, v: BatchConfig) -> Self {
        self.batch = v;
        self
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
