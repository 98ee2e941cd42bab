//! Utilities.
use log::info;
use std::time::SystemTime;

/// Runs `f` and logs the elapsed time with `name`.
///
/// ```
/// use rollout_core::util::measure;
///
/// let n = measure("sum", || (0..100).sum::<usize>());
/// assert_eq!(n, 4950);
/// ```
pub fn measure<T>(name: &str, f: impl FnOnce() -> T) -> T {
    let timer = SystemTime::now();
    let out = f();
    match timer.elapsed() {
        Ok(d) => info!("{}: {:.4}sec", name, d.as_secs_f32()),
        Err(_) => info!("{}: clock went backwards", name),
    }
    out
}
