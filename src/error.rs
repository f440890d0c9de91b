//! Error types for spawning projectiles and validating profiles.
//!
//! None of these are fatal: the caller decides whether to skip the shot,
//! retry later, or reject the configuration.

use thiserror::Error;

use crate::pool::ProjectileHandle;

/// Recoverable failures of pool and arming operations.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ProjectileError {
    #[error("projectile pool exhausted (capacity {capacity})")]
    PoolExhausted { capacity: usize },

    #[error("direction magnitude {magnitude} is too small to normalize")]
    DegenerateDirection { magnitude: f32 },

    #[error("stale projectile handle {0:?}")]
    StaleHandle(ProjectileHandle),

    #[error("projectile {0:?} is already armed; release it first")]
    AlreadyArmed(ProjectileHandle),

    #[error("projectile {0:?} was not reserved by acquire")]
    NotReserved(ProjectileHandle),

    #[error(transparent)]
    InvalidProfile(#[from] ProfileError),
}

/// A `BallisticProfile` field outside its valid range.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ProfileError {
    #[error("invalid ballistic profile field `{field}`: {value}")]
    InvalidField { field: &'static str, value: f32 },
}
