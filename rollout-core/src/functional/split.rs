//! Splitting episodes into training and test sets.
use crate::{
    error::{Result, TrajError},
    Episode,
};
use log::debug;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Splits episodes into training and test sets at random.
///
/// Episodes are never cut. The training set holds `round(n * train_size)`
/// episodes and the test set the rest. The same `seed` gives the same split.
///
/// ```
/// use ndarray::{Array1, Array2};
/// use rollout_core::{functional::train_test_split, Episode};
///
/// let epis: Vec<_> = (0..10)
///     .map(|_| {
///         Episode::from_parts(
///             Array2::zeros((2, 1)),
///             Array2::zeros((2, 1)),
///             Array1::zeros(2),
///             Array1::zeros(2),
///         )
///         .unwrap()
///     })
///     .collect();
/// let (train, test) = train_test_split(epis, 0.7, 42).unwrap();
/// assert_eq!((train.len(), test.len()), (7, 3));
/// ```
pub fn train_test_split(
    epis: Vec<Episode>,
    train_size: f64,
    seed: u64,
) -> Result<(Vec<Episode>, Vec<Episode>)> {
    if !(0.0..=1.0).contains(&train_size) {
        return Err(TrajError::InvalidArgument(format!(
            "train_size must be in [0, 1], got {}",
            train_size
        )));
    }
    let n = epis.len();
    let n_train = (n as f64 * train_size).round() as usize;

    let mut train = epis;
    train.shuffle(&mut StdRng::seed_from_u64(seed));
    let test = train.split_off(n_train);
    debug!("Split {} episodes into {} and {}", n, train.len(), test.len());

    Ok((train, test))
}
