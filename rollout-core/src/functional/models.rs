//! Transforms querying models.
use super::{commit, Update};
use crate::{
    error::{Result, TrajError},
    model::{RecurrentInput, RewardGiver, ValueFunction},
    Device, FieldKey, Trajectory,
};
use log::trace;
use ndarray::Array1;

fn check_len(key: &FieldKey, out: &Array1<f32>, len: usize) -> Result<()> {
    if out.len() != len {
        return Err(TrajError::shape(key, len, out.len()));
    }
    Ok(())
}

/// Computes `vs` with a value function.
///
/// A recurrent value function also receives `h_masks` and `hs` of each
/// episode. When an episode has no `h_masks`, the hidden state is reset at the
/// first step only.
pub fn compute_vs<V>(traj: &mut Trajectory, vf: &V, device: Device) -> Result<()>
where
    V: ValueFunction + ?Sized,
{
    let recurrent = vf.is_recurrent();
    trace!("compute_vs: recurrent = {}, device = {:?}", recurrent, device);

    let mut updates = Vec::with_capacity(traj.num_epi());
    for epi in traj.episodes().iter() {
        let vs = if recurrent {
            let default_masks;
            let h_masks = match epi.get(&FieldKey::HMasks) {
                Some(_) => epi.scalar(&FieldKey::HMasks)?,
                None => {
                    let mut m = Array1::<f32>::zeros(epi.len());
                    m[0] = 1.0;
                    default_masks = m;
                    default_masks.view()
                }
            };
            let rnn = RecurrentInput {
                h_masks,
                hs: epi.get(&FieldKey::Hs).map(|hs| hs.view()),
            };
            vf.values(epi.obs(), Some(rnn), device)?
        } else {
            vf.values(epi.obs(), None, device)?
        };
        check_len(&FieldKey::Vs, &vs, epi.len())?;
        updates.push(vec![(FieldKey::Vs, vs.into_dyn())]);
    }
    commit(traj, updates)
}

/// `softplus(x) = -log(sigmoid(-x))`, computed without overflow.
fn softplus(x: f32) -> f32 {
    x.max(0.0) + (-x.abs()).exp().ln_1p()
}

/// Replaces rewards with pseudo-rewards given by a discriminator.
///
/// The pseudo-reward of a step is `-log(sigmoid(-logit))` where `logit` is
/// the output of `rew_giver` for `obs` and, unless `state_only`, `acs`.
/// Pseudo-rewards are stored as `pseudo_rews` and overwrite `rews`. The
/// environment rewards are kept as `real_rews` the first time this is applied.
pub fn compute_pseudo_rews<G>(
    traj: &mut Trajectory,
    rew_giver: &G,
    state_only: bool,
    device: Device,
) -> Result<()>
where
    G: RewardGiver + ?Sized,
{
    trace!("compute_pseudo_rews: state_only = {}", state_only);

    let mut updates: Vec<Update> = Vec::with_capacity(traj.num_epi());
    for epi in traj.episodes().iter() {
        let acs = if state_only { None } else { Some(epi.acs()) };
        let logits = rew_giver.logits(epi.obs(), acs, device)?;
        check_len(&FieldKey::PseudoRews, &logits, epi.len())?;
        let pseudo_rews = logits.mapv(softplus).into_dyn();

        let mut update = vec![
            (FieldKey::PseudoRews, pseudo_rews.clone()),
            (FieldKey::Rews, pseudo_rews),
        ];
        if !epi.contains(&FieldKey::RealRews) {
            update.push((FieldKey::RealRews, epi.rews().to_owned().into_dyn()));
        }
        updates.push(update);
    }
    commit(traj, updates)
}
