//! Transforms over the episodes of a trajectory.
//!
//! Every transform takes a `&mut` [`Trajectory`], reads some fields of each
//! episode and adds or overwrites others. A transform first checks that every
//! episode has the fields it reads and computes all new arrays. Only then are
//! the arrays written back, so a transform that fails leaves the trajectory
//! untouched. Any successful transform invalidates the flat view.
//!
//! A typical on-policy preprocessing reads:
//!
//! ```
//! use ndarray::{Array1, Array2, ArrayViewD};
//! use rollout_core::{functional as F, Device, Episode, Trajectory};
//!
//! # fn main() -> rollout_core::error::Result<()> {
//! let epi = Episode::from_parts(
//!     Array2::zeros((4, 3)),
//!     Array2::zeros((4, 1)),
//!     Array1::ones(4),
//!     Array1::from(vec![0.0, 0.0, 0.0, 1.0]),
//! )?;
//! let vf = |obs: ArrayViewD<'_, f32>| Array1::<f32>::zeros(obs.shape()[0]);
//!
//! let mut traj = Trajectory::from_episodes(vec![epi]);
//! F::compute_vs(&mut traj, &vf, Device::Cpu)?;
//! F::compute_rets(&mut traj, 0.99)?;
//! F::compute_advs(&mut traj, 0.99, 0.95)?;
//! F::centerize_advs(&mut traj)?;
//! F::compute_h_masks(&mut traj)?;
//! traj.register()?;
//! # Ok(())
//! # }
//! ```
mod models;
mod normalize;
mod returns;
mod shift;
mod split;
use crate::{
    episode::check_field,
    error::{Result, TrajError},
    Episode, FieldKey, Trajectory,
};
pub use models::{compute_pseudo_rews, compute_vs};
use ndarray::ArrayD;
pub use normalize::normalize_obs_and_acs;
pub use returns::{
    centerize_advs, compute_advs, compute_advs_with_bootstrap, compute_rets, discounted_returns,
    gae,
};
pub use shift::{add_next_obs, compute_h_masks};
pub use split::train_test_split;

/// Fields to be written into one episode.
type Update = Vec<(FieldKey, ArrayD<f32>)>;

/// Fails with [`TrajError::MissingField`] unless every episode has `keys`.
fn require(epis: &[Episode], keys: &[FieldKey]) -> Result<()> {
    for (i, epi) in epis.iter().enumerate() {
        for key in keys.iter() {
            if !epi.contains(key) {
                return Err(TrajError::missing(key, i));
            }
        }
    }
    Ok(())
}

/// Writes updates into the episodes after checking all of them.
fn commit(traj: &mut Trajectory, updates: Vec<Update>) -> Result<()> {
    debug_assert_eq!(traj.num_epi(), updates.len());
    for (epi, update) in traj.episodes().iter().zip(updates.iter()) {
        for (key, value) in update.iter() {
            check_field(key, value, epi.len())?;
        }
    }
    for (epi, update) in traj.episodes_mut().iter_mut().zip(updates) {
        for (key, value) in update {
            epi.set_field(key, value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Device, RewardGiver};
    use ndarray::{Array1, Array2, ArrayViewD};

    struct ObsSum;

    impl RewardGiver for ObsSum {
        fn logits(
            &self,
            obs: ArrayViewD<'_, f32>,
            _acs: Option<ArrayViewD<'_, f32>>,
            _device: Device,
        ) -> anyhow::Result<Array1<f32>> {
            Ok(obs.outer_iter().map(|o| o.sum()).collect())
        }
    }

    fn episode(len: usize) -> Episode {
        let obs = Array2::from_shape_fn((len, 2), |(t, d)| (t * 2 + d) as f32);
        let acs = Array2::from_shape_fn((len, 1), |(t, _)| t as f32 * 0.5);
        let mut dones = Array1::zeros(len);
        dones[len - 1] = 1.0;
        Episode::from_parts(obs, acs, Array1::ones(len), dones).unwrap()
    }

    fn assert_lengths(traj: &Trajectory, lens: &[usize]) {
        for (epi, &len) in traj.episodes().iter().zip(lens.iter()) {
            assert_eq!(epi.len(), len);
            for (key, value) in epi.fields().iter() {
                assert_eq!(value.shape()[0], len, "length of {} changed", key);
            }
        }
    }

    #[test]
    fn test_transforms_keep_episode_lengths() {
        let lens = [4, 1, 3];
        let mut traj = Trajectory::from_episodes(lens.iter().map(|&n| episode(n)).collect());
        let vf = |obs: ArrayViewD<'_, f32>| -> Array1<f32> {
            obs.outer_iter().map(|o| o.sum()).collect()
        };

        compute_vs(&mut traj, &vf, Device::Cpu).unwrap();
        assert_lengths(&traj, &lens);
        compute_rets(&mut traj, 0.99).unwrap();
        assert_lengths(&traj, &lens);
        compute_advs(&mut traj, 0.99, 0.95).unwrap();
        assert_lengths(&traj, &lens);
        centerize_advs(&mut traj).unwrap();
        assert_lengths(&traj, &lens);
        compute_pseudo_rews(&mut traj, &ObsSum, false, Device::Cpu).unwrap();
        assert_lengths(&traj, &lens);
        normalize_obs_and_acs(&mut traj, None, None).unwrap();
        assert_lengths(&traj, &lens);
        compute_h_masks(&mut traj).unwrap();
        add_next_obs(&mut traj).unwrap();
        assert_lengths(&traj, &lens);

        for key in [FieldKey::Vs, FieldKey::Rets, FieldKey::Advs, FieldKey::NextObs].iter() {
            assert!(traj.episodes().iter().all(|epi| epi.contains(key)));
        }
        assert!(traj.register().is_ok());
    }
}
