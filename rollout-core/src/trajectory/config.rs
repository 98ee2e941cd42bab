//! Configuration of batch iteration.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trajectory::iterate`](super::Trajectory::iterate).
///
/// ```
/// use rollout_core::BatchConfig;
///
/// let config = BatchConfig::default().batch_size(32).epoch(10).seed(0);
/// assert!(config.shuffle);
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct BatchConfig {
    /// The number of steps in a minibatch. The last minibatch of an epoch
    /// may be smaller.
    pub batch_size: usize,

    /// The number of passes over the flat view.
    pub epoch: usize,

    /// If `true`, steps are visited in a random order, without replacement
    /// within an epoch.
    pub shuffle: bool,

    /// Random seed for shuffling.
    pub seed: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 64,
            epoch: 1,
            shuffle: true,
            seed: 42,
        }
    }
}

impl BatchConfig {
    /// Sets the minibatch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the number of epochs.
    pub fn epoch(mut self, v: usize) -> Self {
        self.epoch = v;
        self
    }

    /// Sets the shuffle flag.
    pub fn shuffle(mut self, v: bool) -> Self {
        self.shuffle = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
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
