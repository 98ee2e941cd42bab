//! Interfaces of models consumed by transforms.
//!
//! Network architectures live outside of this crate. A model only has to
//! answer inference queries over the steps of one episode. Both traits take
//! `&self`: transforms never update model parameters.
use crate::Device;
use anyhow::Result;
use ndarray::{Array1, ArrayView1, ArrayViewD};

/// Extra inputs of a recurrent model.
#[derive(Debug, Clone)]
pub struct RecurrentInput<'a> {
    /// Reset masks, `1.0` where the hidden state must be reset, `(T,)`.
    pub h_masks: ArrayView1<'a, f32>,

    /// Hidden states recorded by the sampler, `(T, ...)`, if any.
    pub hs: Option<ArrayViewD<'a, f32>>,
}

/// State value function `V(s)`.
pub trait ValueFunction {
    /// Returns `true` if the model carries a hidden state across steps.
    fn is_recurrent(&self) -> bool {
        false
    }

    /// Evaluates value estimates for the observations of one episode.
    ///
    /// `obs` has shape `(T, ...)` and the returned array must have length `T`.
    /// `rnn` is given if and only if [`ValueFunction::is_recurrent`] returns `true`.
    fn values(
        &self,
        obs: ArrayViewD<'_, f32>,
        rnn: Option<RecurrentInput<'_>>,
        device: Device,
    ) -> Result<Array1<f32>>;
}

/// Discriminator or reward model used in adversarial imitation learning.
pub trait RewardGiver {
    /// Returns logits for the steps of one episode.
    ///
    /// `acs` is `None` when the reward depends on states only.
    /// The returned array must have length `T`.
    fn logits(
        &self,
        obs: ArrayViewD<'_, f32>,
        acs: Option<ArrayViewD<'_, f32>>,
        device: Device,
    ) -> Result<Array1<f32>>;
}

impl<F> ValueFunction for F
where
    F: Fn(ArrayViewD<'_, f32>) -> Array1<f32>,
{
    fn values(
        &self,
        obs: ArrayViewD<'_, f32>,
        _rnn: Option<RecurrentInput<'_>>,
        _device: Device,
    ) -> Result<Array1<f32>> {
        Ok(self(obs))
    }
}
