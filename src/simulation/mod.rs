//! Simulation layer - deterministic particle fluid.
//!
//! This module is organized into:
//! - **components**: Particle record and the fixed-capacity store
//! - **resources**: Solver configuration, domain and tick counter
//! - **physics**: Gravity, prediction and velocity reconstruction
//! - **viscosity**: Pairwise viscosity impulses
//! - **relaxation**: Double density relaxation
//! - **collision**: Boundary clamping with restitution
//! - **layout**: Initial particle layouts

use microfluid_macros::profile;

use crate::fixed_math::FixedVec2;

// Module declarations
pub mod components;
pub mod resources;
pub mod physics;
pub mod viscosity;
pub mod relaxation;
pub mod collision;
pub mod layout;


// Re-export commonly used items
pub use components::*;
pub use resources::*;
pub use layout::Layout;

/// Clavet-style viscoelastic fluid over a fixed set of `N` particles.
///
/// The stages of [`FluidSim::step`] always run in the same order and each
/// completes before the next starts:
///
/// 1. gravity
/// 2. viscosity
/// 3. position prediction
/// 4. double density relaxation
/// 5. boundary collision
/// 6. velocity reconstruction
pub struct FluidSim<const N: usize> {
    particles: ParticleStore<N>,
    config: SimConfig,
    tick: SimTick,
}

impl<const N: usize> FluidSim<N> {
    pub fn new(config: SimConfig, layout: Layout) -> Self {
        let particles = layout.build::<N>(&config.domain);
        Self::with_particles(config, particles)
    }

    pub fn with_particles(config: SimConfig, particles: ParticleStore<N>) -> Self {
        Self {
            particles,
            config,
            tick: SimTick::default(),
        }
    }

    /// Advance the fluid by one timestep.
    #[profile(2000)]
    pub fn step(&mut self) {
        let particles = self.particles.as_mut_slice();
        let config = &self.config;

        physics::apply_gravity(particles, config);
        viscosity::apply_viscosity(particles, config);
        physics::predict_positions(particles, config);
        relaxation::relax_density(particles, config);
        collision::resolve_boundaries(particles, config);
        physics::reconstruct_velocity(particles, config);

        self.tick.increment();
    }

    pub fn tick(&self) -> SimTick {
        self.tick
    }

    pub fn particles(&self) -> &ParticleStore<N> {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut ParticleStore<N> {
        &mut self.particles
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn domain(&self) -> &Domain {
        &self.config.domain
    }

    /// Change the gravity vector for subsequent ticks.
    pub fn set_gravity(&mut self, gravity: FixedVec2) {
        self.config.gravity = gravity;
    }

    /// Replace the particle state and tick counter, e.g. from a snapshot.
    pub fn restore(&mut self, tick: SimTick, particles: ParticleStore<N>) {
        self.tick = tick;
        self.particles = particles;
    }
}
