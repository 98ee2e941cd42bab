mod common;
use anyhow::Result;
use common::{Counting, LineWalk};
use ndarray::{Array1, ArrayViewD};
use rand::{rngs::StdRng, SeedableRng};
use rollout_core::{
    functional::{compute_h_masks, compute_vs},
    sampler::{EpisodeSampler, SampleLimit, SyncSampler},
    Device, FieldKey, RecurrentInput, Trajectory, ValueFunction,
};
use test_log::test;

/// Returns the recorded hidden state, checking that it resets with `h_masks`.
struct HiddenEcho;

impl ValueFunction for HiddenEcho {
    fn is_recurrent(&self) -> bool {
        true
    }

    fn values(
        &self,
        obs: ArrayViewD<'_, f32>,
        rnn: Option<RecurrentInput<'_>>,
        _device: Device,
    ) -> Result<Array1<f32>> {
        let rnn = rnn.ok_or_else(|| anyhow::anyhow!("recurrent input is required"))?;
        let hs = rnn.hs.ok_or_else(|| anyhow::anyhow!("hidden states are required"))?;
        anyhow::ensure!(rnn.h_masks[0] == 1.0 && hs[[0, 0]] == 0.0, "no reset at start");
        Ok(Array1::from_shape_fn(obs.shape()[0], |t| hs[[t, 0]]))
    }
}

#[test]
fn test_recurrent_batches() -> Result<()> {
    let mut traj = Trajectory::new();
    for &goal in [2.0f32, 5.0, 3.0].iter() {
        let mut sampler = SyncSampler::new(LineWalk::new(goal));
        traj.add_episodes(sampler.sample(&mut Counting::default(), SampleLimit::MaxEpisodes(1))?);
    }
    compute_h_masks(&mut traj)?;
    compute_vs(&mut traj, &HiddenEcho, Device::Cpu)?;
    traj.register()?;

    let mut rng = StdRng::seed_from_u64(0);
    let batches = traj.iterate_rnn(3, true, &mut rng)?.collect::<Vec<_>>();
    assert_eq!(batches.len(), 1);
    let batch = &batches[0];
    assert_eq!(batch.seq_len(), 5);

    let h_masks = batch.field(&FieldKey::HMasks)?;
    let vs = batch.field(&FieldKey::Vs)?;
    let out_masks = batch.out_masks();
    for (b, &epi) in batch.episodes().iter().enumerate() {
        let len = traj.episodes()[epi].len();
        for t in 0..batch.seq_len() {
            let valid = t < len;
            assert_eq!(out_masks[[t, b]], if valid { 1.0 } else { 0.0 });
            assert_eq!(h_masks[[t, b]], if t == 0 { 1.0 } else { 0.0 });
            assert_eq!(vs[[t, b]], if valid { t as f32 } else { 0.0 });
        }
    }
    Ok(())
}
