//! Linear integration stages of the solver.
//!
//! This module handles:
//! - Gravity (velocity update)
//! - Position prediction (caching the previous position and advancing)
//! - Velocity reconstruction from the corrected positions
//!
//! Every stage is O(N) over the particle slice.

use super::components::Particle;
use super::resources::SimConfig;

// ============================================================================
// Gravity
// ============================================================================

/// Add `gravity × dt` to every particle's velocity.
pub fn apply_gravity(particles: &mut [Particle], config: &SimConfig) {
    let delta_v = config.gravity * config.timestep;
    if delta_v.is_zero() {
        return;
    }

    for particle in particles.iter_mut() {
        particle.velocity += delta_v;
    }
}

// ============================================================================
// Prediction
// ============================================================================

/// Remember the current position, then advance by `velocity × dt`.
pub fn predict_positions(particles: &mut [Particle], config: &SimConfig) {
    let dt = config.timestep;

    for particle in particles.iter_mut() {
        particle.previous_position = particle.position;
        particle.position += particle.velocity * dt;
    }
}

// ============================================================================
// Velocity Reconstruction
// ============================================================================

/// Replace each velocity with `(position - previous_position) / dt`.
///
/// Relaxation and boundary corrections moved the particles after
/// prediction; deriving velocity from the net displacement carries those
/// corrections into the next tick.
pub fn reconstruct_velocity(particles: &mut [Particle], config: &SimConfig) {
    let dt = config.timestep;

    for particle in particles.iter_mut() {
        particle.velocity = (particle.position - particle.previous_position) / dt;
    }
}
