//! Compute device passed to models.
use serde::{Deserialize, Serialize};

/// Device on which a model runs inference.
///
/// The pipeline itself always computes on the CPU. The device is handed to
/// [`ValueFunction`](crate::ValueFunction) and [`RewardGiver`](crate::RewardGiver)
/// calls so that models never consult process-wide state to decide where
/// to run.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum Device {
    /// Host CPU.
    Cpu,

    /// CUDA device with the given ordinal.
    Cuda(usize),
}

impl Default for Device {
    fn default() -> Self {
        Self::Cpu
    }
}

impl Device {
    /// Returns `true` if the device is a CUDA device.
    pub fn is_cuda(&self) -> bool {
        matches!(self, Self::Cuda(_))
    }
}
