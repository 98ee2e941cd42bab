//! Keys of episode fields.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of a field stored in an [`Episode`](super::Episode).
///
/// Fields recognized by the transforms of [`functional`](crate::functional) are
/// enumerated. Algorithm-specific data goes into [`FieldKey::Extra`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub enum FieldKey {
    /// Observations, `(T, ...)`.
    Obs,

    /// Actions, `(T, ...)`.
    Acs,

    /// Rewards, `(T,)`.
    Rews,

    /// Terminal flags, `(T,)`, `1.0` at a terminal step.
    Dones,

    /// Observations after each step, `(T, ...)`.
    NextObs,

    /// Value estimates, `(T,)`.
    Vs,

    /// Discounted returns, `(T,)`.
    Rets,

    /// Advantages, `(T,)`.
    Advs,

    /// Recurrent reset masks, `(T,)`, `1.0` where hidden state is reset.
    HMasks,

    /// Rewards given by a learned reward model, `(T,)`.
    PseudoRews,

    /// Environment rewards kept aside when `rews` is replaced, `(T,)`.
    RealRews,

    /// Recurrent hidden states, `(T, ...)`.
    Hs,

    /// Algorithm-specific field.
    Extra(String),
}

impl FieldKey {
    /// Fields every episode must have.
    pub const REQUIRED: [FieldKey; 4] = [
        FieldKey::Obs,
        FieldKey::Acs,
        FieldKey::Rews,
        FieldKey::Dones,
    ];

    /// Name of the field.
    pub fn name(&self) -> &str {
        match self {
            Self::Obs => "obs",
            Self::Acs => "acs",
            Self::Rews => "rews",
            Self::Dones => "dones",
            Self::NextObs => "next_obs",
            Self::Vs => "vs",
            Self::Rets => "rets",
            Self::Advs => "advs",
            Self::HMasks => "h_masks",
            Self::PseudoRews => "pseudo_rews",
            Self::RealRews => "real_rews",
            Self::Hs => "hs",
            Self::Extra(name) => name,
        }
    }

    /// Returns `true` if the field holds one scalar per step.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Rews
                | Self::Dones
                | Self::Vs
                | Self::Rets
                | Self::Advs
                | Self::HMasks
                | Self::PseudoRews
                | Self::RealRews
        )
    }
}

impl From<&str> for FieldKey {
    fn from(name: &str) -> Self {
        match name {
            "obs" => Self::Obs,
            "acs" => Self::Acs,
            "rews" => Self::Rews,
            "dones" => Self::Dones,
            "next_obs" => Self::NextObs,
            "vs" => Self::Vs,
            "rets" => Self::Rets,
            "advs" => Self::Advs,
            "h_masks" => Self::HMasks,
            "pseudo_rews" => Self::PseudoRews,
            "real_rews" => Self::RealRews,
            "hs" => Self::Hs,
            _ => Self::Extra(name.to_string()),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
