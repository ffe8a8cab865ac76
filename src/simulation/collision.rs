//! Boundary collision resolution.
//!
//! A particle that ends the relaxation outside the domain is clamped onto the
//! wall it crossed. The normal component of the velocity it arrived with is
//! reflected and scaled by the restitution factor. Because the velocity is
//! rebuilt from positions afterwards, the reflected velocity is also encoded
//! into `previous_position` on that axis.

use tracing::trace;

use crate::fixed_math::FixedNum;
use super::components::Particle;
use super::resources::SimConfig;

/// Outcome of resolving one axis of one particle against the walls.
struct AxisContact {
    position: FixedNum,
    previous: FixedNum,
    velocity: FixedNum,
}

/// Resolve one coordinate against `[0, max]`. Returns `None` when it is
/// already inside.
fn resolve_axis(
    position: FixedNum,
    previous: FixedNum,
    max: FixedNum,
    config: &SimConfig,
) -> Option<AxisContact> {
    let (wall, outward_is_positive) = if position < FixedNum::ZERO {
        (FixedNum::ZERO, false)
    } else if position > max {
        (max, true)
    } else {
        return None;
    };

    let dt = config.timestep;
    let incoming = (position - previous) / dt;
    let moving_outward = if outward_is_positive {
        incoming > FixedNum::ZERO
    } else {
        incoming < FixedNum::ZERO
    };

    let mut velocity = if moving_outward {
        -(incoming * config.restitution)
    } else {
        incoming
    };
    if velocity.abs() < config.rest_speed {
        velocity = FixedNum::ZERO;
    }

    Some(AxisContact {
        position: wall,
        previous: wall - velocity * dt,
        velocity,
    })
}

/// Clamp every particle into the domain and reflect its wall-normal velocity.
///
/// Returns the number of particles that touched a wall this tick.
pub fn resolve_boundaries(particles: &mut [Particle], config: &SimConfig) -> usize {
    let max = config.domain.max();
    let mut clamped = 0;

    for particle in particles.iter_mut() {
        let mut touched = false;

        if let Some(contact) = resolve_axis(particle.position.x, particle.previous_position.x, max.x, config) {
            particle.position.x = contact.position;
            particle.previous_position.x = contact.previous;
            particle.velocity.x = contact.velocity;
            touched = true;
        }

        if let Some(contact) = resolve_axis(particle.position.y, particle.previous_position.y, max.y, config) {
            particle.position.y = contact.position;
            particle.previous_position.y = contact.previous;
            particle.velocity.y = contact.velocity;
            touched = true;
        }

        if touched {
            clamped += 1;
        }
    }

    if clamped > 0 {
        trace!("[BOUNDS] {} particles resolved against walls", clamped);
    }

    clamped
}
