//! Particle records and the fixed-capacity store that owns them.

use core::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::fixed_math::{FixedNum, FixedVec2};

/// One fluid particle.
///
/// `density` and `near_density` are scratch values rewritten by every
/// relaxation pass; nothing reads them across ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Particle {
    pub position: FixedVec2,
    pub previous_position: FixedVec2,
    pub velocity: FixedVec2,
    pub density: FixedNum,
    pub near_density: FixedNum,
}

impl Particle {
    /// A particle at rest at `position`.
    pub const fn at(position: FixedVec2) -> Self {
        Self {
            position,
            previous_position: position,
            velocity: FixedVec2::ZERO,
            density: FixedNum::ZERO,
            near_density: FixedNum::ZERO,
        }
    }

    pub fn with_velocity(mut self, velocity: FixedVec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Whole-pixel coordinates of the particle, rounded towards the origin
    /// corner of the pixel that contains it.
    pub fn display_position(&self) -> (i32, i32) {
        (self.position.x.floor_int(), self.position.y.floor_int())
    }
}

/// Exactly `N` particles in static storage.
///
/// Slots are never added or removed; a particle's identity is its index for
/// the lifetime of the store.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParticleStore<const N: usize> {
    slots: [Particle; N],
}

impl<const N: usize> ParticleStore<N> {
    pub const fn new(slots: [Particle; N]) -> Self {
        Self { slots }
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Particle> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, Particle> {
        self.slots.iter_mut()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.slots
    }

    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.slots
    }

    pub fn get(&self, slot: usize) -> Option<&Particle> {
        self.slots.get(slot)
    }
}

impl<const N: usize> Default for ParticleStore<N> {
    fn default() -> Self {
        Self { slots: [Particle::default(); N] }
    }
}

impl<const N: usize> Index<usize> for ParticleStore<N> {
    type Output = Particle;
    fn index(&self, slot: usize) -> &Particle {
        &self.slots[slot]
    }
}

impl<const N: usize> IndexMut<usize> for ParticleStore<N> {
    fn index_mut(&mut self, slot: usize) -> &mut Particle {
        &mut self.slots[slot]
    }
}

impl<'a, const N: usize> IntoIterator for &'a ParticleStore<N> {
    type Item = &'a Particle;
    type IntoIter = core::slice::Iter<'a, Particle>;
    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}
