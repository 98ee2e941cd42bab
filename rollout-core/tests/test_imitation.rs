mod common;
use anyhow::Result;
use common::{Constant, LineWalk};
use ndarray::{Array1, ArrayViewD, Axis, Ix1};
use rollout_core::{
    dataset::{load_episodes, save_episodes},
    functional::{add_next_obs, compute_pseudo_rews, normalize_obs_and_acs, train_test_split},
    sampler::{EpisodeSampler, SampleLimit, SyncSampler},
    Device, FieldKey, RewardGiver, Trajectory,
};
use tempdir::TempDir;
use test_log::test;

/// Prefers large actions.
struct ActionDiscriminator;

impl RewardGiver for ActionDiscriminator {
    fn logits(
        &self,
        obs: ArrayViewD<'_, f32>,
        acs: Option<ArrayViewD<'_, f32>>,
        _device: Device,
    ) -> Result<Array1<f32>> {
        match acs {
            Some(acs) => Ok(acs.index_axis(Axis(1), 0).to_owned().into_dimensionality::<Ix1>()?),
            None => Ok(Array1::zeros(obs.shape()[0])),
        }
    }
}

fn expert_episodes(n: usize) -> Result<Vec<rollout_core::Episode>> {
    let mut sampler = SyncSampler::new(LineWalk::new(4.0));
    sampler.sample(&mut Constant(2.0), SampleLimit::MaxEpisodes(n))
}

#[test]
fn test_dataset_split_and_normalize() -> Result<()> {
    let dir = TempDir::new("expert")?;
    let path = dir.path().join("expert.bin");
    save_episodes(&path, &expert_episodes(10)?)?;

    let epis = load_episodes(&path)?;
    assert_eq!(epis.len(), 10);
    let (train, test) = train_test_split(epis, 0.7, 0)?;
    assert_eq!((train.len(), test.len()), (7, 3));

    let mut train = Trajectory::from_episodes(train);
    let mut test = Trajectory::from_episodes(test);
    add_next_obs(&mut train)?;
    add_next_obs(&mut test)?;

    // Evaluation data is normalized with training statistics.
    let stats = normalize_obs_and_acs(&mut train, None, None)?;
    let stats_ = normalize_obs_and_acs(&mut test, Some(&stats.obs), Some(&stats.acs))?;
    assert_eq!(stats, stats_);
    // Every expert episode is the same, so both sets end up identical.
    assert_eq!(train.episodes()[0], test.episodes()[0]);

    let view = train.register()?;
    assert_eq!(view.num_step(), 14);
    assert!(view.get(&FieldKey::NextObs).is_some());
    Ok(())
}

#[test]
fn test_pseudo_rewards_replace_env_rewards() -> Result<()> {
    let mut traj = Trajectory::from_episodes(expert_episodes(2)?);
    compute_pseudo_rews(&mut traj, &ActionDiscriminator, false, Device::Cpu)?;

    let expected = (1.0f32 + 2.0f32.exp()).ln();
    for epi in traj.episodes() {
        assert!(epi.rews().iter().all(|r| (r - expected).abs() < 1e-5));
        assert!(epi.scalar(&FieldKey::RealRews)?.iter().all(|&r| r == -1.0));
    }

    compute_pseudo_rews(&mut traj, &ActionDiscriminator, true, Device::Cpu)?;
    let epi = &traj.episodes()[0];
    assert!(epi.rews().iter().all(|r| (r - 2f32.ln()).abs() < 1e-5));
    assert!(epi.scalar(&FieldKey::RealRews)?.iter().all(|&r| r == -1.0));
    Ok(())
}
