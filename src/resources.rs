//! Global resources for the projectile simulation.

use std::sync::Arc;

use bevy::prelude::*;
use serde::Deserialize;

use crate::components::BallisticProfile;
use crate::error::ProfileError;
use crate::pool::DEFAULT_DIRECTION_EPSILON;

/// Global configuration for the projectile simulation.
///
/// Insert before adding [`RicochetPlugin`](crate::RicochetPlugin) to
/// override the defaults; the pool capacity is fixed when the plugin builds.
///
/// # Fields
/// * `pool_capacity` - Number of projectiles the pool preallocates
/// * `direction_epsilon` - Arm directions shorter than this are rejected
/// * `enable_ricochet` - When false every Obstacle contact stops the projectile
/// * `enable_penetration` - When false every Target contact stops the projectile after damage
///
/// # Example
/// ```
/// use bevy_ricochet::resources::RicochetConfig;
///
/// let config = RicochetConfig {
///     pool_capacity: 1024,
///     enable_ricochet: false,
///     ..Default::default()
/// };
/// assert!(config.enable_penetration);
/// ```
#[derive(Resource, Reflect, Debug, Clone, PartialEq, Deserialize)]
#[reflect(Resource)]
#[serde(default)]
pub struct RicochetConfig {
    pub pool_capacity: usize,
    pub direction_epsilon: f32,
    pub enable_ricochet: bool,
    pub enable_penetration: bool,
}

impl Default for RicochetConfig {
    /// Default values:
    /// - 256 pooled projectiles
    /// - 1e-4 direction epsilon
    /// - Ricochet and penetration enabled
    fn default() -> Self {
        Self {
            pool_capacity: 256,
            direction_epsilon: DEFAULT_DIRECTION_EPSILON,
            enable_ricochet: true,
            enable_penetration: true,
        }
    }
}

/// Named ammo profiles, shared by reference with every projectile fired.
///
/// The defaults cover the bullet variants a top-down shooter usually needs;
/// the single-hit bullet is just a profile with both budgets at zero.
///
/// # Example
/// ```
/// use bevy_ricochet::resources::AmmoPresets;
///
/// let presets = AmmoPresets::with_defaults();
/// let piercing = presets.get("piercing").unwrap();
/// assert_eq!(piercing.max_penetrations, 3);
/// ```
#[derive(Resource, Default, Debug, Clone)]
pub struct AmmoPresets {
    pub presets: Vec<Arc<BallisticProfile>>,
}

impl AmmoPresets {
    /// Creates the default ammo set:
    /// - `standard`: stops on the first contact
    /// - `ricochet`: up to 3 bounces off walls
    /// - `piercing`: passes through up to 3 targets
    /// - `ricochet_piercing`: both
    pub fn with_defaults() -> Self {
        let presets = [
            BallisticProfile::new("standard", 10.0, 20.0, 2.0),
            BallisticProfile::new("ricochet", 8.0, 18.0, 3.0).with_max_bounces(3),
            BallisticProfile::new("piercing", 12.0, 25.0, 2.0).with_max_penetrations(3),
            BallisticProfile::new("ricochet_piercing", 10.0, 20.0, 3.0)
                .with_max_bounces(3)
                .with_max_penetrations(3),
        ];

        Self {
            presets: presets.into_iter().map(Arc::new).collect(),
        }
    }

    /// Looks up a profile by name.
    pub fn get(&self, name: &str) -> Option<Arc<BallisticProfile>> {
        self.presets.iter().find(|p| p.name == name).cloned()
    }

    /// Adds or replaces a profile, keyed by its name.
    ///
    /// Invalid profiles are rejected and the presets are left unchanged.
    pub fn insert(&mut self, profile: BallisticProfile) -> Result<(), ProfileError> {
        profile.validate()?;
        let profile = Arc::new(profile);
        match self.presets.iter_mut().find(|p| p.name == profile.name) {
            Some(existing) => *existing = profile,
            None => self.presets.push(profile),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_presets_are_valid() {
        let presets = AmmoPresets::with_defaults();
        assert_eq!(presets.presets.len(), 4);
        assert!(presets.presets.iter().all(|p| p.validate().is_ok()));

        let standard = presets.get("standard").unwrap();
        assert_eq!((standard.max_bounces, standard.max_penetrations), (0, 0));
        assert!(presets.get("plasma").is_none());
    }

    #[test]
    fn test_insert_replaces_by_name() {
        let mut presets = AmmoPresets::with_defaults();
        presets.insert(BallisticProfile::new("standard", 99.0, 20.0, 2.0)).unwrap();
        presets.insert(BallisticProfile::new("plasma", 30.0, 10.0, 1.0)).unwrap();

        assert_eq!(presets.presets.len(), 5);
        assert_eq!(presets.get("standard").unwrap().damage, 99.0);
    }

    #[test]
    fn test_insert_rejects_invalid_profile() {
        let mut presets = AmmoPresets::with_defaults();

        let err = presets
            .insert(BallisticProfile::new("dud", -1.0, 0.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, ProfileError::InvalidField { field: "damage", .. }));

        let err = presets
            .insert(BallisticProfile::new("standard", 10.0, 20.0, f32::NAN))
            .unwrap_err();
        assert!(matches!(err, ProfileError::InvalidField { field: "lifetime", .. }));

        assert_eq!(presets.presets.len(), 4);
        assert!(presets.get("dud").is_none());
        assert_eq!(presets.get("standard").unwrap().lifetime, 2.0);
    }

    #[test]
    fn test_config_deserializes_partial_input() {
        let config: RicochetConfig =
            serde_json::from_str(r#"{"pool_capacity": 64, "enable_ricochet": false}"#).unwrap();

        assert_eq!(config.pool_capacity, 64);
        assert!(!config.enable_ricochet);
        assert!(config.enable_penetration);
        assert_eq!(config.direction_epsilon, DEFAULT_DIRECTION_EPSILON);
    }
}
