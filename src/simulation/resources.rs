//! Simulation-wide state that is not per particle: the configuration record,
//! the domain rectangle and the tick counter.

use serde::{Deserialize, Serialize};

use crate::fixed_math::{FixedNum, FixedVec2};

// ============================================================================
// Tick Counter
// ============================================================================

/// Number of completed solver steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

// ============================================================================
// Domain
// ============================================================================

/// Axis-aligned simulation rectangle in display pixels.
///
/// Positions live in `[0, width - 1] × [0, height - 1]` with sub-pixel
/// precision, so every resolved position maps onto an addressable pixel.
/// The y axis grows downward: row 0 is the top of the panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain {
    pub width: u16,
    pub height: u16,
}

impl Domain {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Largest position still inside the domain.
    pub fn max(&self) -> FixedVec2 {
        FixedVec2::new(
            FixedNum::from_num(self.width.saturating_sub(1)),
            FixedNum::from_num(self.height.saturating_sub(1)),
        )
    }

    pub fn contains(&self, position: FixedVec2) -> bool {
        let max = self.max();
        position.x >= FixedNum::ZERO
            && position.y >= FixedNum::ZERO
            && position.x <= max.x
            && position.y <= max.y
    }

    pub fn clamp(&self, position: FixedVec2) -> FixedVec2 {
        let max = self.max();
        FixedVec2::new(
            position.x.clamp(FixedNum::ZERO, max.x),
            position.y.clamp(FixedNum::ZERO, max.y),
        )
    }

    pub fn center(&self) -> FixedVec2 {
        self.max().half()
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self::new(128, 64)
    }
}

// ============================================================================
// Simulation Configuration
// ============================================================================

/// Fixed-point solver parameters.
///
/// Built once from [`crate::config::InitialConfig`] (human-readable floats)
/// and never converted again, so every platform steps from bit-identical
/// constants. Units are display pixels and solver ticks.
///
/// | Field | Default | Valid range |
/// |---|---|---|
/// | `domain` | 128 × 64 | 1..=128 × 1..=64 |
/// | `interaction_radius` (h) | 16 | > 0 |
/// | `gravity` | (0, 1) px/tick² | any |
/// | `viscosity_linear` (σ) | 0 | ≥ 0 |
/// | `viscosity_quadratic` (β) | 0.05 | ≥ 0 |
/// | `viscosity_shear` | 0 | ≥ 0 |
/// | `stiffness` (k) | 2 | ≥ 0 |
/// | `near_stiffness` (k_near) | 3 | ≥ 0 |
/// | `rest_density` | 3.5 | ≥ 0 |
/// | `timestep` | 0.9 | > 0 |
/// | `restitution` | 0.5 | 0..=1 |
/// | `rest_speed` | 0.6 px/tick | ≥ 0 |
/// | `frame_period_us` | 33 333 | > 0 |
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    pub domain: Domain,
    pub interaction_radius: FixedNum,
    pub gravity: FixedVec2,
    pub viscosity_linear: FixedNum,
    pub viscosity_quadratic: FixedNum,
    /// Damping of the tangential relative velocity between neighbours.
    pub viscosity_shear: FixedNum,
    pub stiffness: FixedNum,
    pub near_stiffness: FixedNum,
    pub rest_density: FixedNum,
    /// Keep negative pressure (cohesion) below rest density instead of
    /// clamping it to zero.
    pub allow_attraction: bool,
    pub timestep: FixedNum,
    pub restitution: FixedNum,
    /// Wall-bounce speeds below this are zeroed so particles come to rest on
    /// a boundary instead of chattering against it.
    pub rest_speed: FixedNum,
    pub frame_period_us: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            domain: Domain::default(),
            interaction_radius: FixedNum::from_num(16.0),
            gravity: FixedVec2::from_f32(0.0, 1.0),
            viscosity_linear: FixedNum::ZERO,
            viscosity_quadratic: FixedNum::from_num(0.05),
            viscosity_shear: FixedNum::ZERO,
            stiffness: FixedNum::from_num(2.0),
            near_stiffness: FixedNum::from_num(3.0),
            rest_density: FixedNum::from_num(3.5),
            allow_attraction: false,
            timestep: FixedNum::from_num(0.9),
            restitution: FixedNum::from_num(0.5),
            rest_speed: FixedNum::from_num(0.6),
            frame_period_us: 33_333,
        }
    }
}

impl SimConfig {
    /// `dt²`, used by the relaxation displacement.
    pub fn timestep_squared(&self) -> FixedNum {
        self.timestep * self.timestep
    }

    /// `1 / h`, so kernels can compute `r / h` with a multiply.
    pub fn inverse_radius(&self) -> FixedNum {
        FixedNum::ONE / self.interaction_radius
    }
}
