//! Pairwise viscosity impulses.
//!
//! Brute-force all-pairs over slot indices, always in the same order so the
//! rounding is reproducible.

use microfluid_macros::profile;

use crate::fixed_math::FixedNum;
use super::components::Particle;
use super::resources::SimConfig;

/// Apply symmetric viscosity impulses between every pair closer than `h`.
///
/// For a pair `(i, j)` with separation `r` and unit direction `n` from `i` to
/// `j`, the relative velocity `v_i - v_j` is split into an inward component
/// `u` along `n` and a shear component `w` along the perpendicular:
///
/// - approaching pairs (`u > 0`) receive `dt (1 - r/h) (σ u + β u²)` along `n`
/// - all pairs receive `dt (1 - r/h) σ_shear w` along the perpendicular
///
/// Each impulse is halved and applied with opposite signs, so the pair's
/// total momentum is unchanged. Coincident pairs (`r = 0`) have no
/// direction and are skipped.
///
/// Returns the number of interacting pairs.
#[profile(500)]
pub fn apply_viscosity(particles: &mut [Particle], config: &SimConfig) -> usize {
    let h = config.interaction_radius;
    let inv_h = config.inverse_radius();
    let dt = config.timestep;
    let apply_shear = config.viscosity_shear > FixedNum::ZERO;

    let mut interactions = 0;

    for i in 0..particles.len() {
        for j in (i + 1)..particles.len() {
            let separation = particles[j].position - particles[i].position;
            let distance = separation.magnitude();
            if distance == FixedNum::ZERO || distance >= h {
                continue;
            }
            interactions += 1;

            let direction = separation / distance;
            let falloff = FixedNum::ONE - distance * inv_h;
            let relative_velocity = particles[i].velocity - particles[j].velocity;

            let inward = relative_velocity.dot(direction);
            if inward > FixedNum::ZERO {
                let strength = config.viscosity_linear * inward
                    + config.viscosity_quadratic * inward * inward;
                let impulse = direction * (dt * falloff * strength);
                let half = impulse.half();
                particles[i].velocity -= half;
                particles[j].velocity += half;
            }

            if apply_shear {
                let tangent = direction.perp();
                let shear = relative_velocity.dot(tangent);
                let impulse = tangent * (dt * falloff * config.viscosity_shear * shear);
                let half = impulse.half();
                particles[i].velocity -= half;
                particles[j].velocity += half;
            }
        }
    }

    interactions
}
