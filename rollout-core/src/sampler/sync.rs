//! Single-threaded sampler.
use super::{Env, EpisodeCollector, EpisodeSampler, Policy, SampleLimit};
use crate::{Episode, FieldKey};
use anyhow::Result;
use log::{debug, trace};

/// Runs a policy in a single environment.
///
/// An episode ends when the environment terminates it or, if set, after
/// `max_steps_per_episode` steps. The last step of a truncated episode is
/// not marked as done.
pub struct SyncSampler<E: Env> {
    env: E,
    max_steps_per_episode: Option<usize>,
    collector: EpisodeCollector,
}

impl<E: Env> SyncSampler<E> {
    /// Creates a sampler running in `env`.
    pub fn new(env: E) -> Self {
        Self {
            env,
            max_steps_per_episode: None,
            collector: EpisodeCollector::new(),
        }
    }

    /// Sets the maximum number of steps in an episode.
    pub fn max_steps_per_episode(mut self, v: usize) -> Self {
        self.max_steps_per_episode = Some(v);
        self
    }

    /// The environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Consumes the sampler and returns the environment.
    pub fn into_env(self) -> E {
        self.env
    }

    fn run_episode<P: Policy + ?Sized>(&mut self, policy: &mut P) -> Result<Episode> {
        policy.reset();
        let mut obs = self.env.reset()?;
        loop {
            let hs = policy.hidden_state();
            let act = policy.sample(&obs)?;
            let step = self.env.step(&act)?;
            let truncated = self
                .max_steps_per_episode
                .map_or(false, |n| self.collector.len() + 1 >= n);

            self.collector.push_step(obs, act, step.reward, step.is_done)?;
            if let Some(hs) = hs {
                self.collector.push_extra(FieldKey::Hs, hs)?;
            }
            if step.is_done || truncated {
                trace!(
                    "Episode finished: len = {}, done = {}",
                    self.collector.len(),
                    step.is_done
                );
                return Ok(self.collector.finish()?);
            }
            obs = step.obs;
        }
    }
}

impl<E: Env> EpisodeSampler for SyncSampler<E> {
    fn sample<P: Policy + ?Sized>(
        &mut self,
        policy: &mut P,
        limit: SampleLimit,
    ) -> Result<Vec<Episode>> {
        let mut epis = Vec::new();
        let mut num_step = 0;
        while !limit.is_reached(epis.len(), num_step) {
            let epi = match self.run_episode(policy) {
                Ok(epi) => epi,
                Err(e) => {
                    // Drop the partial episode so the next call starts clean.
                    self.collector.clear();
                    return Err(e);
                }
            };
            num_step += epi.len();
            epis.push(epi);
        }
        debug!("Sampled {} episodes, {} steps", epis.len(), num_step);
        Ok(epis)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sampler::Step;
    use ndarray::{arr1, ArrayD};

    /// Terminates after `len` steps; the reward is the step count.
    struct Chain {
        len: usize,
        t: usize,
    }

    impl Env for Chain {
        fn reset(&mut self) -> Result<ArrayD<f32>> {
            self.t = 0;
            Ok(arr1(&[0.0f32]).into_dyn())
        }

        fn step(&mut self, act: &ArrayD<f32>) -> Result<Step> {
            anyhow::ensure!(act.len() == 1, "invalid action");
            self.t += 1;
            let obs = arr1(&[self.t as f32]).into_dyn();
            Ok(Step::new(obs, self.t as f32, self.t >= self.len))
        }
    }

    /// Counts calls as its hidden state.
    #[derive(Default)]
    struct Recurrent {
        h: f32,
        resets: usize,
    }

    impl Policy for Recurrent {
        fn reset(&mut self) {
            self.h = 0.0;
            self.resets += 1;
        }

        fn sample(&mut self, _obs: &ArrayD<f32>) -> Result<ArrayD<f32>> {
            self.h += 1.0;
            Ok(arr1(&[1.0f32]).into_dyn())
        }

        fn hidden_state(&self) -> Option<ArrayD<f32>> {
            Some(arr1(&[self.h, -self.h]).into_dyn())
        }
    }

    struct Invalid;

    impl Policy for Invalid {
        fn sample(&mut self, _obs: &ArrayD<f32>) -> Result<ArrayD<f32>> {
            Ok(arr1(&[1.0f32, 2.0]).into_dyn())
        }
    }

    #[test]
    fn test_max_episodes() -> Result<()> {
        let mut sampler = SyncSampler::new(Chain { len: 3, t: 0 });
        let mut policy = Recurrent::default();
        let epis = sampler.sample(&mut policy, SampleLimit::MaxEpisodes(2))?;

        assert_eq!(epis.len(), 2);
        assert_eq!(policy.resets, 2);
        let epi = &epis[0];
        assert_eq!(epi.obs().iter().copied().collect::<Vec<_>>(), vec![0.0, 1.0, 2.0]);
        assert_eq!(epi.rews().to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(epi.dones().to_vec(), vec![0.0, 0.0, 1.0]);
        assert_eq!(epi.step_shape(&FieldKey::Hs), Some(&[2][..]));
        assert_eq!(epi.field(&FieldKey::Hs)?[[0, 0]], 0.0);
        Ok(())
    }

    #[test]
    fn test_max_steps_finishes_episode() -> Result<()> {
        let mut sampler = SyncSampler::new(Chain { len: 4, t: 0 });
        let epis = sampler.sample(&mut Recurrent::default(), SampleLimit::MaxSteps(5))?;
        assert_eq!(epis.len(), 2);
        assert_eq!(epis.iter().map(|e| e.len()).sum::<usize>(), 8);
        Ok(())
    }

    #[test]
    fn test_truncation() -> Result<()> {
        let mut sampler = SyncSampler::new(Chain { len: 10, t: 0 }).max_steps_per_episode(4);
        let epis = sampler.sample(&mut Recurrent::default(), SampleLimit::MaxEpisodes(1))?;
        assert_eq!(epis[0].len(), 4);
        assert_eq!(epis[0].dones().to_vec(), vec![0.0; 4]);
        Ok(())
    }

    #[test]
    fn test_env_error_propagates() {
        let mut sampler = SyncSampler::new(Chain { len: 3, t: 0 });
        assert!(sampler.sample(&mut Invalid, SampleLimit::MaxEpisodes(1)).is_err());
        assert!(sampler.collector.is_empty());
        let epis = sampler
            .sample(&mut Recurrent::default(), SampleLimit::MaxEpisodes(1))
            .unwrap();
        assert_eq!(epis[0].len(), 3);
    }
}
