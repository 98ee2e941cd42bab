//! Time-shifted and boundary fields.
use super::{commit, Update};
use crate::{
    error::{Result, TrajError},
    FieldKey, Trajectory,
};
use log::trace;
use ndarray::{concatenate, Array1, Axis, Slice};

/// Computes `h_masks`, which is one at the first step of each episode and
/// zero elsewhere.
///
/// A recurrent model resets its hidden state where the mask is one.
pub fn compute_h_masks(traj: &mut Trajectory) -> Result<()> {
    trace!("compute_h_masks");
    let updates: Vec<Update> = traj
        .episodes()
        .iter()
        .map(|epi| {
            let mut h_masks = Array1::<f32>::zeros(epi.len());
            h_masks[0] = 1.0;
            vec![(FieldKey::HMasks, h_masks.into_dyn())]
        })
        .collect();
    commit(traj, updates)
}

/// Adds `next_obs`, the observations shifted one step ahead.
///
/// `next_obs[t] = obs[t + 1]` for `t < T - 1`. The last entry duplicates the
/// last observation, `next_obs[T - 1] = obs[T - 1]`, so consumers must mask
/// the last transition of a terminated episode by `dones`.
///
/// ```
/// use ndarray::{array, Array1, Array2};
/// use rollout_core::{functional::add_next_obs, Episode, FieldKey, Trajectory};
///
/// let epi = Episode::from_parts(
///     array![[0.0f32], [1.0], [2.0]],
///     Array2::zeros((3, 1)),
///     Array1::zeros(3),
///     array![0.0f32, 0.0, 1.0],
/// )
/// .unwrap();
/// let mut traj = Trajectory::from_episodes(vec![epi]);
/// add_next_obs(&mut traj).unwrap();
///
/// let next_obs = traj.episodes()[0].field(&FieldKey::NextObs).unwrap();
/// assert_eq!(next_obs, &array![[1.0f32], [2.0], [2.0]].into_dyn());
/// ```
pub fn add_next_obs(traj: &mut Trajectory) -> Result<()> {
    trace!("add_next_obs");
    let updates = traj
        .episodes()
        .iter()
        .map(|epi| {
            let obs = epi.obs();
            let len = obs.shape()[0];
            let shifted = obs.slice_axis(Axis(0), Slice::from(1usize..));
            let last = obs.slice_axis(Axis(0), Slice::from(len - 1..));
            let next_obs = concatenate(Axis(0), &[shifted, last])
                .map_err(|_| TrajError::shape(&FieldKey::Obs, len, obs.shape()))?;
            Ok(vec![(FieldKey::NextObs, next_obs)])
        })
        .collect::<Result<Vec<Update>>>()?;
    commit(traj, updates)
}
