//! Double density relaxation.
//!
//! Each particle in slot order gathers a density `Σ(1 - r/h)²` and a
//! near-density `Σ(1 - r/h)³` from its neighbours, converts them into
//! pressure and near-pressure, and pushes every neighbour pair apart. Later
//! slots see the displacements already applied by earlier ones
//! (Gauss-Seidel ordering).

use microfluid_macros::profile;

use crate::fixed_math::{FixedNum, FixedVec2};
use super::components::Particle;
use super::resources::SimConfig;

/// `(1 - r/h)` for a pair of particles, or `None` when they are out of range.
fn falloff(distance: FixedNum, h: FixedNum, inv_h: FixedNum) -> Option<FixedNum> {
    if distance >= h {
        return None;
    }
    Some(FixedNum::ONE - distance * inv_h)
}

/// Pressure from the accumulated density.
///
/// Below rest density the pressure would turn negative and pull neighbours
/// together; that is clamped to zero unless attraction is enabled.
pub fn pressure(density: FixedNum, config: &SimConfig) -> FixedNum {
    let pressure = config.stiffness * (density - config.rest_density);
    if pressure < FixedNum::ZERO && !config.allow_attraction {
        FixedNum::ZERO
    } else {
        pressure
    }
}

pub fn near_pressure(near_density: FixedNum, config: &SimConfig) -> FixedNum {
    config.near_stiffness * near_density
}

/// Recompute `density` / `near_density` of particle `i` from scratch.
fn accumulate_density(particles: &mut [Particle], i: usize, h: FixedNum, inv_h: FixedNum) {
    let mut density = FixedNum::ZERO;
    let mut near_density = FixedNum::ZERO;
    let origin = particles[i].position;

    for (j, neighbor) in particles.iter().enumerate() {
        if i == j {
            continue;
        }
        let distance = (neighbor.position - origin).magnitude();
        if let Some(q) = falloff(distance, h, inv_h) {
            let q2 = q * q;
            density += q2;
            near_density += q2 * q;
        }
    }

    particles[i].density = density;
    particles[i].near_density = near_density;
}

/// Run one relaxation pass over all particles.
///
/// Returns the number of pair displacements applied.
#[profile(500)]
pub fn relax_density(particles: &mut [Particle], config: &SimConfig) -> usize {
    let h = config.interaction_radius;
    let inv_h = config.inverse_radius();
    let dt2 = config.timestep_squared();

    let mut displacements = 0;

    for i in 0..particles.len() {
        accumulate_density(particles, i, h, inv_h);

        let p = pressure(particles[i].density, config);
        let p_near = near_pressure(particles[i].near_density, config);
        if p == FixedNum::ZERO && p_near == FixedNum::ZERO {
            continue;
        }

        let origin = particles[i].position;
        let mut own_displacement = FixedVec2::ZERO;

        for j in 0..particles.len() {
            if i == j {
                continue;
            }
            let separation = particles[j].position - origin;
            let distance = separation.magnitude();
            // Coincident pairs have no direction to push along
            if distance == FixedNum::ZERO {
                continue;
            }
            let Some(q) = falloff(distance, h, inv_h) else { continue };

            let direction = separation / distance;
            let magnitude = (p * q + p_near * q * q) * dt2;
            let half = (direction * magnitude).half();

            particles[j].position += half;
            own_displacement -= half;
            displacements += 1;
        }

        particles[i].position += own_displacement;
    }

    displacements
}
