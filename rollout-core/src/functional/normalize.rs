//! Normalization of observations and actions.
use super::{commit, Update};
use crate::{
    error::{Result, TrajError},
    stats::{MeanStd, ObsAcsStats},
    Episode, FieldKey, Trajectory,
};
use log::trace;
use ndarray::{concatenate, ArrayViewD, Axis};

/// Pooled statistics of `key` over all episodes.
fn pooled_stats(epis: &[Episode], key: &FieldKey) -> Result<MeanStd> {
    let views = epis
        .iter()
        .map(|epi| epi.field(key).map(|x| x.view()))
        .collect::<Result<Vec<ArrayViewD<'_, f32>>>>()?;
    let pooled = concatenate(Axis(0), &views)
        .map_err(|e| TrajError::shape(key, "equal per-step shapes", e))?;
    MeanStd::from_samples(pooled.view())
        .ok_or_else(|| TrajError::InvalidArgument("no samples to compute statistics".to_string()))
}

/// Normalizes `obs` and `acs` as `(x - mean) / std`.
///
/// Statistics are per-dimension population statistics pooled over all
/// episodes, unless given as `obs_stats` or `acs_stats`, in which case they
/// are applied with the same guard on small standard deviations. `next_obs` is normalized with the statistics of
/// `obs` when present. Dimensions with a standard deviation below
/// [`STD_EPS`](crate::stats::STD_EPS) are only centered.
///
/// Returns the statistics applied, so that training-time statistics can be
/// passed in again to normalize freshly sampled data.
pub fn normalize_obs_and_acs(
    traj: &mut Trajectory,
    obs_stats: Option<&MeanStd>,
    acs_stats: Option<&MeanStd>,
) -> Result<ObsAcsStats> {
    let epis = traj.episodes();
    if epis.is_empty() && (obs_stats.is_none() || acs_stats.is_none()) {
        return Err(TrajError::InvalidArgument(
            "statistics cannot be computed from an empty trajectory".to_string(),
        ));
    }
    let obs = match obs_stats {
        Some(stats) => MeanStd::new(stats.mean.clone(), stats.std.clone()),
        None => pooled_stats(epis, &FieldKey::Obs)?,
    };
    let acs = match acs_stats {
        Some(stats) => MeanStd::new(stats.mean.clone(), stats.std.clone()),
        None => pooled_stats(epis, &FieldKey::Acs)?,
    };
    trace!(
        "normalize_obs_and_acs: obs_stats given = {}, acs_stats given = {}",
        obs_stats.is_some(),
        acs_stats.is_some()
    );

    let updates = epis
        .iter()
        .map(|epi| {
            let mut update = vec![
                (FieldKey::Obs, obs.normalize(&FieldKey::Obs, epi.field(&FieldKey::Obs)?)?),
                (FieldKey::Acs, acs.normalize(&FieldKey::Acs, epi.field(&FieldKey::Acs)?)?),
            ];
            if let Some(next_obs) = epi.get(&FieldKey::NextObs) {
                update.push((FieldKey::NextObs, obs.normalize(&FieldKey::NextObs, next_obs)?));
            }
            Ok(update)
        })
        .collect::<Result<Vec<Update>>>()?;
    commit(traj, updates)?;

    Ok(ObsAcsStats { obs, acs })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::functional::add_next_obs;
    use ndarray::{array, Array1, Array2};

    fn episode(obs: Array2<f32>, acs: Array2<f32>) -> Episode {
        let len = obs.shape()[0];
        Episode::from_parts(obs, acs, Array1::zeros(len), Array1::zeros(len)).unwrap()
    }

    fn trajectory() -> Trajectory {
        Trajectory::from_episodes(vec![
            episode(
                array![[1.0f32, 7.0], [2.0, 7.0], [3.0, 7.0]],
                array![[0.5f32], [-0.5], [1.5]],
            ),
            episode(array![[4.0f32, 7.0], [5.0, 7.0]], array![[2.0f32], [0.0]]),
        ])
    }

    #[test]
    fn test_normalize_computes_pooled_stats() {
        let mut traj = trajectory();
        let stats = normalize_obs_and_acs(&mut traj, None, None).unwrap();
        assert_eq!(stats.obs.mean, array![3.0f32, 7.0].into_dyn());
        // The constant dimension gets a unit scale.
        assert_eq!(stats.obs.std[1], 1.0);

        let pooled: Vec<f32> = traj
            .episodes()
            .iter()
            .flat_map(|epi| {
                epi.obs()
                    .index_axis(Axis(1), 0)
                    .iter()
                    .copied()
                    .collect::<Vec<_>>()
            })
            .collect();
        let mean = pooled.iter().sum::<f32>() / pooled.len() as f32;
        let var = pooled.iter().map(|x| (x - mean).powi(2)).sum::<f32>() / pooled.len() as f32;
        assert!(mean.abs() < 1e-6);
        assert!((var - 1.0).abs() < 1e-5);
        for epi in traj.episodes() {
            assert!(epi.obs().index_axis(Axis(1), 1).iter().all(|&x| x == 0.0));
        }
    }

    #[test]
    fn test_supplied_stats_are_bit_identical() {
        let mut computed = trajectory();
        let stats = normalize_obs_and_acs(&mut computed, None, None).unwrap();

        let mut supplied = trajectory();
        let stats2 =
            normalize_obs_and_acs(&mut supplied, Some(&stats.obs), Some(&stats.acs)).unwrap();
        assert_eq!(stats, stats2);
        for (a, b) in computed.episodes().iter().zip(supplied.episodes().iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_next_obs_uses_obs_stats() {
        let mut traj = trajectory();
        add_next_obs(&mut traj).unwrap();
        normalize_obs_and_acs(&mut traj, None, None).unwrap();
        let epi = &traj.episodes()[0];
        let next_obs = epi.field(&FieldKey::NextObs).unwrap();
        assert_eq!(next_obs.index_axis(Axis(0), 0), epi.obs().index_axis(Axis(0), 1));
    }

    #[test]
    fn test_wrong_stats_shape_leaves_traj_untouched() {
        let mut traj = trajectory();
        let before = traj.episodes().to_vec();
        let bad = MeanStd::new(Array1::zeros(3).into_dyn(), Array1::ones(3).into_dyn());
        let res = normalize_obs_and_acs(&mut traj, Some(&bad), None);
        assert!(matches!(res, Err(TrajError::Shape { .. })));
        assert_eq!(traj.episodes(), &before[..]);
    }

    #[test]
    fn test_supplied_zero_std_is_guarded() {
        let yaml = concat!(
            "mean: {v: 1, dim: [2], data: [1.5, 7.0]}\n",
            "std: {v: 1, dim: [2], data: [0.5, 0.0]}\n",
        );
        let obs_stats: MeanStd = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(obs_stats.std[1], 0.0);

        let mut traj = Trajectory::from_episodes(vec![episode(
            array![[1.0f32, 7.0], [2.0, 7.0]],
            array![[0.0f32], [1.0]],
        )]);
        let stats = normalize_obs_and_acs(&mut traj, Some(&obs_stats), None).unwrap();
        assert_eq!(stats.obs.std, array![0.5f32, 1.0].into_dyn());

        let obs = traj.episodes()[0].obs();
        assert!(obs.iter().all(|x| x.is_finite()));
        assert_eq!(obs, array![[-1.0f32, 0.0], [1.0, 0.0]].into_dyn());
    }

    #[test]
    fn test_empty_trajectory() {
        let mut traj = Trajectory::new();
        assert!(matches!(
            normalize_obs_and_acs(&mut traj, None, None),
            Err(TrajError::InvalidArgument(_))
        ));
    }
}
