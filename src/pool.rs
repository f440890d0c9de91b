//! Fixed-capacity projectile pool.
//!
//! Every projectile the simulation will ever use is allocated when the pool
//! is built. Shots take a slot from the free list and give it back when
//! they despawn; nothing is allocated per shot and capacity never grows.
//! Slots are addressed by [`ProjectileHandle`], an index plus a generation
//! counter, so a handle kept after its projectile was reclaimed can never
//! reach the slot's next occupant.

use std::sync::Arc;

use bevy::prelude::*;

use crate::components::{BallisticProfile, Projectile};
use crate::error::ProjectileError;
use crate::types::ProjectileState;

/// Default magnitude below which an arm direction is rejected.
pub const DEFAULT_DIRECTION_EPSILON: f32 = 1e-4;

/// Generational handle to a pool slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct ProjectileHandle {
    index: u32,
    generation: u32,
}

impl ProjectileHandle {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Occupancy {
    Free,
    Reserved,
    Live,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    occupancy: Occupancy,
    projectile: Projectile,
}

/// Object pool of projectiles.
///
/// A slot is in exactly one of: the free list, reserved (acquired, not yet
/// armed), or the live set.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use bevy::prelude::*;
/// use bevy_ricochet::components::BallisticProfile;
/// use bevy_ricochet::pool::ProjectilePool;
///
/// let mut pool = ProjectilePool::new(8);
/// let profile = Arc::new(BallisticProfile::new("Pellet", 5.0, 30.0, 1.0));
/// let handle = pool.spawn(profile, Vec2::ZERO, Vec2::new(0.0, 2.0)).unwrap();
///
/// assert_eq!(pool.get(handle).unwrap().direction(), Vec2::Y);
/// assert_eq!(pool.live_count(), 1);
/// ```
#[derive(Resource, Debug)]
pub struct ProjectilePool {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: Vec<u32>,
    direction_epsilon: f32,
}

impl Default for ProjectilePool {
    fn default() -> Self {
        Self::new(256)
    }
}

impl ProjectilePool {
    /// Creates a pool holding `capacity` projectiles.
    pub fn new(capacity: usize) -> Self {
        Self::with_direction_epsilon(capacity, DEFAULT_DIRECTION_EPSILON)
    }

    /// Creates a pool with a custom degenerate-direction threshold.
    pub fn with_direction_epsilon(capacity: usize, direction_epsilon: f32) -> Self {
        let slots = (0..capacity)
            .map(|_| Slot {
                generation: 0,
                occupancy: Occupancy::Free,
                projectile: Projectile::default(),
            })
            .collect();
        // Reversed so slot 0 is handed out first.
        let free = (0..capacity as u32).rev().collect();

        Self {
            slots,
            free,
            live: Vec::with_capacity(capacity),
            direction_epsilon,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Projectiles that are armed or waiting for end-of-tick release.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn direction_epsilon(&self) -> f32 {
        self.direction_epsilon
    }

    /// Reserves a pooled projectile.
    ///
    /// The returned slot stays `Pooled` until [`arm`](Self::arm) binds a
    /// profile, or goes back via [`cancel`](Self::cancel).
    pub fn acquire(&mut self) -> Result<ProjectileHandle, ProjectileError> {
        let index = self.free.pop().ok_or(ProjectileError::PoolExhausted {
            capacity: self.capacity(),
        })?;
        let slot = &mut self.slots[index as usize];
        slot.occupancy = Occupancy::Reserved;

        Ok(ProjectileHandle {
            index,
            generation: slot.generation,
        })
    }

    /// Arms a reserved projectile and adds it to the live set.
    ///
    /// `direction` need not be normalized. This is the only place a profile
    /// is bound; an armed projectile must be released before it can be
    /// armed again. Profiles that fail [`BallisticProfile::validate`] are
    /// rejected and the slot stays reserved.
    pub fn arm(
        &mut self,
        handle: ProjectileHandle,
        profile: Arc<BallisticProfile>,
        origin: Vec2,
        direction: Vec2,
    ) -> Result<(), ProjectileError> {
        let epsilon = self.direction_epsilon;
        let slot = self
            .slot_mut(handle)
            .ok_or(ProjectileError::StaleHandle(handle))?;
        match slot.occupancy {
            Occupancy::Reserved => {}
            Occupancy::Live => return Err(ProjectileError::AlreadyArmed(handle)),
            Occupancy::Free => return Err(ProjectileError::NotReserved(handle)),
        }
        profile.validate()?;

        slot.projectile.arm(profile, origin, direction, epsilon)?;
        slot.occupancy = Occupancy::Live;
        self.live.push(handle.index);
        Ok(())
    }

    /// Acquire and arm in one step.
    ///
    /// If arming fails the slot goes straight back to the free list.
    pub fn spawn(
        &mut self,
        profile: Arc<BallisticProfile>,
        origin: Vec2,
        direction: Vec2,
    ) -> Result<ProjectileHandle, ProjectileError> {
        let handle = self.acquire()?;
        if let Err(err) = self.arm(handle, profile, origin, direction) {
            self.cancel(handle)?;
            return Err(err);
        }
        Ok(handle)
    }

    /// Returns a reserved, never-armed slot to the free list.
    pub fn cancel(&mut self, handle: ProjectileHandle) -> Result<(), ProjectileError> {
        let slot = self
            .slot_mut(handle)
            .ok_or(ProjectileError::StaleHandle(handle))?;
        if slot.occupancy != Occupancy::Reserved {
            return Err(ProjectileError::NotReserved(handle));
        }
        self.recycle(handle.index);
        Ok(())
    }

    /// Returns a despawning projectile to the pool.
    ///
    /// # Panics
    /// If the handle is stale or the projectile is not `Despawning`. Both
    /// are bugs in the caller, not runtime conditions.
    pub fn release(&mut self, handle: ProjectileHandle) {
        let state = match self.get(handle) {
            Some(projectile) => projectile.state(),
            None => panic!("release of stale projectile handle {handle:?}"),
        };
        assert_eq!(
            state,
            ProjectileState::Despawning,
            "release of projectile {handle:?} that is not despawning"
        );

        if let Some(position) = self.live.iter().position(|&index| index == handle.index) {
            self.live.swap_remove(position);
        }
        self.recycle(handle.index);
    }

    /// Releases every live projectile that is `Despawning`.
    ///
    /// Called once at the end of a tick so no update ever sees a slot
    /// reclaimed mid-tick. Each one goes through [`release`](Self::release).
    /// Returns the number released.
    pub fn release_despawning(&mut self) -> usize {
        let despawning: Vec<ProjectileHandle> = self
            .iter_live()
            .filter(|(_, projectile)| projectile.state() == ProjectileState::Despawning)
            .map(|(handle, _)| handle)
            .collect();
        for &handle in &despawning {
            self.release(handle);
        }
        despawning.len()
    }

    pub fn get(&self, handle: ProjectileHandle) -> Option<&Projectile> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.occupancy != Occupancy::Free)
            .map(|slot| &slot.projectile)
    }

    pub fn get_mut(&mut self, handle: ProjectileHandle) -> Option<&mut Projectile> {
        self.slot_mut(handle).map(|slot| &mut slot.projectile)
    }

    /// Handles of every live projectile, in no particular order.
    pub fn live_handles(&self) -> impl Iterator<Item = ProjectileHandle> + '_ {
        self.live.iter().map(|&index| ProjectileHandle {
            index,
            generation: self.slots[index as usize].generation,
        })
    }

    /// Live projectiles with their handles.
    pub fn iter_live(&self) -> impl Iterator<Item = (ProjectileHandle, &Projectile)> + '_ {
        self.live.iter().map(|&index| {
            let slot = &self.slots[index as usize];
            (
                ProjectileHandle {
                    index,
                    generation: slot.generation,
                },
                &slot.projectile,
            )
        })
    }

    fn slot_mut(&mut self, handle: ProjectileHandle) -> Option<&mut Slot> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.occupancy != Occupancy::Free)
    }

    fn recycle(&mut self, index: u32) {
        let slot = &mut self.slots[index as usize];
        slot.projectile.reset();
        slot.occupancy = Occupancy::Free;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
    }
}
