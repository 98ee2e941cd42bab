//! The standard preprocessing of on-policy algorithms.
//!
//! [`prepare_on_policy`] chains the transforms an actor-critic algorithm
//! applies to freshly sampled episodes before its update:
//!
//! 1. [`compute_vs`](crate::functional::compute_vs),
//! 2. [`compute_rets`](crate::functional::compute_rets),
//! 3. [`compute_advs`](crate::functional::compute_advs),
//! 4. [`centerize_advs`](crate::functional::centerize_advs), if enabled,
//! 5. [`compute_h_masks`](crate::functional::compute_h_masks), if enabled,
//!
//! and registers the trajectory. Batches are then pulled with
//! [`Trajectory::iterate`] using [`OnPolicyConfig::batch`].
mod config;
use crate::{
    error::Result, functional as F, model::ValueFunction, trajectory::FlatView, util::measure,
    Device, Trajectory,
};
pub use config::OnPolicyConfig;
use log::debug;
use std::sync::Arc;

/// Adds `vs`, `rets`, `advs` and optionally `h_masks`, then registers.
///
/// `h_masks` are computed before values when the value function is
/// recurrent, as it consumes them.
pub fn prepare_on_policy<V>(
    traj: &mut Trajectory,
    vf: &V,
    config: &OnPolicyConfig,
    device: Device,
) -> Result<Arc<FlatView>>
where
    V: ValueFunction + ?Sized,
{
    measure("prepare_on_policy", || {
        if config.h_masks {
            F::compute_h_masks(traj)?;
        }
        F::compute_vs(traj, vf, device)?;
        F::compute_rets(traj, config.gamma)?;
        F::compute_advs(traj, config.gamma, config.lam)?;
        if config.centerize_advs {
            let (mean, std) = F::centerize_advs(traj)?;
            debug!("Advantages: mean = {}, std = {}", mean, std);
        }
        traj.register()
    })
}
