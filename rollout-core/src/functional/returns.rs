//! Discounted returns and generalized advantage estimation.
use super::{commit, require, Update};
use crate::{
    error::{Result, TrajError},
    FieldKey, Trajectory,
};
use log::trace;
use ndarray::{Array1, ArrayView1};
use rayon::prelude::*;

/// Standard deviations of advantages below this value give a unit scale.
const ADV_STD_EPS: f32 = 1e-8;

fn check_unit_interval(name: &str, x: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&x) {
        return Err(TrajError::InvalidArgument(format!(
            "{} must be in [0, 1], got {}",
            name, x
        )));
    }
    Ok(())
}

/// Discounted returns of a single episode.
///
/// `ret[t] = rew[t] + gamma * ret[t + 1] * (1 - done[t])` with
/// `ret[T - 1] = rew[T - 1]`.
pub fn discounted_returns(
    rews: ArrayView1<'_, f32>,
    dones: ArrayView1<'_, f32>,
    gamma: f32,
) -> Array1<f32> {
    let mut rets = Array1::zeros(rews.len());
    let mut next = 0.0;
    for t in (0..rews.len()).rev() {
        next = rews[t] + gamma * next * (1.0 - dones[t]);
        rets[t] = next;
    }
    rets
}

/// Generalized advantage estimates of a single episode.
///
/// `v_last` stands for `v[T]`, the value after the last step.
pub fn gae(
    rews: ArrayView1<'_, f32>,
    vs: ArrayView1<'_, f32>,
    dones: ArrayView1<'_, f32>,
    gamma: f32,
    lam: f32,
    v_last: f32,
) -> Array1<f32> {
    let len = rews.len();
    let mut advs = Array1::zeros(len);
    let mut last_adv = 0.0;
    for t in (0..len).rev() {
        let not_done = 1.0 - dones[t];
        let v_next = if t + 1 < len { vs[t + 1] } else { v_last };
        let delta = rews[t] + gamma * v_next * not_done - vs[t];
        last_adv = delta + gamma * lam * not_done * last_adv;
        advs[t] = last_adv;
    }
    advs
}

/// Computes `rets` of every episode.
///
/// Requires `rews` and `dones`, which every episode has.
pub fn compute_rets(traj: &mut Trajectory, gamma: f32) -> Result<()> {
    check_unit_interval("gamma", gamma)?;
    trace!("compute_rets: gamma = {}", gamma);

    let updates: Vec<Update> = traj
        .episodes()
        .par_iter()
        .map(|epi| {
            let rets = discounted_returns(epi.rews(), epi.dones(), gamma);
            vec![(FieldKey::Rets, rets.into_dyn())]
        })
        .collect();
    commit(traj, updates)
}

/// Computes `advs` of every episode with GAE, taking `v[T] = 0`.
///
/// Requires `vs`, see [`compute_vs`](super::compute_vs).
pub fn compute_advs(traj: &mut Trajectory, gamma: f32, lam: f32) -> Result<()> {
    let bootstraps = vec![0.0; traj.num_epi()];
    compute_advs_with_bootstrap(traj, gamma, lam, &bootstraps)
}

/// Computes `advs` of every episode with GAE, taking `v[T]` from `bootstraps`.
///
/// `bootstraps` holds one value per episode, which is useful for episodes
/// truncated by a step limit rather than terminated.
pub fn compute_advs_with_bootstrap(
    traj: &mut Trajectory,
    gamma: f32,
    lam: f32,
    bootstraps: &[f32],
) -> Result<()> {
    check_unit_interval("gamma", gamma)?;
    check_unit_interval("lam", lam)?;
    if bootstraps.len() != traj.num_epi() {
        return Err(TrajError::InvalidArgument(format!(
            "expected {} bootstrap values, got {}",
            traj.num_epi(),
            bootstraps.len()
        )));
    }
    require(traj.episodes(), &[FieldKey::Vs])?;
    trace!("compute_advs: gamma = {}, lam = {}", gamma, lam);

    let updates = traj
        .episodes()
        .par_iter()
        .zip(bootstraps.par_iter())
        .map(|(epi, &v_last)| {
            let vs = epi.scalar(&FieldKey::Vs)?;
            let advs = gae(epi.rews(), vs, epi.dones(), gamma, lam, v_last);
            Ok(vec![(FieldKey::Advs, advs.into_dyn())])
        })
        .collect::<Result<Vec<Update>>>()?;
    commit(traj, updates)
}

/// Standardizes `advs` with the statistics pooled over all episodes.
///
/// Returns the `(mean, std)` used. If the pooled standard deviation is
/// almost zero the scale is one and only the mean is subtracted.
pub fn centerize_advs(traj: &mut Trajectory) -> Result<(f32, f32)> {
    require(traj.episodes(), &[FieldKey::Advs])?;

    let n = traj.num_step() as f64;
    if n == 0.0 {
        return Ok((0.0, 1.0));
    }
    let mut sum = 0.0f64;
    for epi in traj.episodes().iter() {
        sum += epi.scalar(&FieldKey::Advs)?.iter().map(|&a| a as f64).sum::<f64>();
    }
    let mean = sum / n;
    let mut sq = 0.0f64;
    for epi in traj.episodes().iter() {
        sq += epi
            .scalar(&FieldKey::Advs)?
            .iter()
            .map(|&a| (a as f64 - mean).powi(2))
            .sum::<f64>();
    }
    let (mean, std) = (mean as f32, (sq / n).sqrt() as f32);
    let scale = if std < ADV_STD_EPS { 1.0 } else { std };
    trace!("centerize_advs: mean = {}, std = {}", mean, std);

    let updates = traj
        .episodes()
        .iter()
        .map(|epi| {
            let advs = epi.scalar(&FieldKey::Advs)?.mapv(|a| (a - mean) / scale);
            Ok(vec![(FieldKey::Advs, advs.into_dyn())])
        })
        .collect::<Result<Vec<Update>>>()?;
    commit(traj, updates)?;
    Ok((mean, std))
}
