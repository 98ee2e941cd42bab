//! Persisted lists of episodes, such as expert demonstrations.
//!
//! Episodes are stored with [`bincode`]. Every loaded episode is validated,
//! so a dataset yields episodes satisfying the same invariants as sampled ones.
use crate::{Episode, Trajectory};
use anyhow::{Context, Result};
use log::info;
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

/// Saves episodes to a file.
pub fn save_episodes(path: impl AsRef<Path>, epis: &[Episode]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    bincode::serialize_into(BufWriter::new(file), epis)?;
    info!(
        "Saved {} episodes ({} steps) to {:?}",
        epis.len(),
        epis.iter().map(|epi| epi.len()).sum::<usize>(),
        path
    );
    Ok(())
}

/// Loads episodes saved with [`save_episodes`].
pub fn load_episodes(path: impl AsRef<Path>) -> Result<Vec<Episode>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let epis: Vec<Episode> = bincode::deserialize_from(BufReader::new(file))
        .with_context(|| format!("Failed to load episodes from {:?}", path))?;
    info!("Loaded {} episodes from {:?}", epis.len(), path);
    Ok(epis)
}

/// Loads episodes into a new trajectory.
pub fn load_trajectory(path: impl AsRef<Path>) -> Result<Trajectory> {
    Ok(Trajectory::from_episodes(load_episodes(path)?))
}
