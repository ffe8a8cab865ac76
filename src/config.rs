//! Start-up configuration.
//!
//! [`InitialConfig`] is the human-editable form, read from
//! `assets/initial_config.ron` with plain floats. It is validated and
//! converted to the fixed-point [`SimConfig`] exactly once; the solver never
//! sees a float.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::fixed_math::{FixedNum, FixedVec2};
use crate::render::{ParticleShape, PANEL_HEIGHT, PANEL_WIDTH};
use crate::simulation::{Domain, Layout, SimConfig};

pub const DEFAULT_CONFIG_PATH: &str = "assets/initial_config.ron";

/// Largest magnitude a float field may have and still fit the fixed-point
/// range with room for intermediate products.
const FIXED_FIELD_LIMIT: f32 = 1024.0;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(ron::error::SpannedError),
    OutOfRange {
        field: &'static str,
        value: f32,
        expected: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {}", e),
            ConfigError::OutOfRange { field, value, expected } => {
                write!(f, "{} = {} is out of range (expected {})", field, value, expected)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::OutOfRange { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::Parse(e)
    }
}

// ============================================================================
// Initial Configuration
// ============================================================================

/// One leg of the demo's gravity cycle: hold `(x, y)` for `ticks` frames.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct GravityPhase {
    pub ticks: u32,
    pub x: f32,
    pub y: f32,
}

/// Values fixed for the lifetime of a run. Changing any of them mid-run
/// would break the bit-exact replay of a simulation.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct InitialConfig {
    // Domain, in display pixels
    pub domain_width: u16,
    pub domain_height: u16,

    // Solver
    pub interaction_radius: f32,
    pub gravity_x: f32,
    pub gravity_y: f32,
    pub viscosity_linear: f32,
    pub viscosity_quadratic: f32,
    pub viscosity_shear: f32,
    pub stiffness: f32,
    pub near_stiffness: f32,
    pub rest_density: f32,
    pub allow_attraction: bool,
    pub timestep: f32,
    pub restitution: f32,
    pub rest_speed: f32,

    // Presentation
    pub frame_period_ms: f32,
    pub particle_shape: ParticleShape,
    pub layout: Layout,
    /// Cycled by the demo, one phase after another. Empty keeps `gravity_*`.
    pub gravity_program: Vec<GravityPhase>,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            domain_width: PANEL_WIDTH as u16,
            domain_height: PANEL_HEIGHT as u16,
            interaction_radius: 16.0,
            gravity_x: 0.0,
            gravity_y: 1.0,
            viscosity_linear: 0.0,
            viscosity_quadratic: 0.05,
            viscosity_shear: 0.0,
            stiffness: 2.0,
            near_stiffness: 3.0,
            rest_density: 3.5,
            allow_attraction: false,
            timestep: 0.9,
            restitution: 0.5,
            rest_speed: 0.6,
            frame_period_ms: 33.333,
            particle_shape: ParticleShape::Pixel,
            layout: Layout::Logo,
            gravity_program: vec![
                GravityPhase { ticks: 300, x: 0.0, y: 0.0 },
                GravityPhase { ticks: 100, x: 0.0, y: 1.0 },
                GravityPhase { ticks: 200, x: 1.0, y: 0.0 },
                GravityPhase { ticks: 300, x: -1.0, y: 0.0 },
                GravityPhase { ticks: 100, x: 0.0, y: -1.0 },
                GravityPhase { ticks: 300, x: 0.0, y: 0.0 },
            ],
        }
    }
}

/// True when `value` survives conversion to fixed point as a positive number.
fn positive_in_fixed(value: f32) -> bool {
    FixedNum::from_num(value) > FixedNum::ZERO
}

fn check(field: &'static str, value: f32, ok: bool, expected: &'static str) -> Result<(), ConfigError> {
    if value.is_finite() && value.abs() <= FIXED_FIELD_LIMIT && ok {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value, expected })
    }
}

impl InitialConfig {
    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str::<InitialConfig>(contents)?)
    }

    /// Read and validate a config file, propagating every failure.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_ron_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let width = f32::from(self.domain_width);
        let height = f32::from(self.domain_height);
        check("domain_width", width, (1..=PANEL_WIDTH as u16).contains(&self.domain_width), "1..=128")?;
        check("domain_height", height, (1..=PANEL_HEIGHT as u16).contains(&self.domain_height), "1..=64")?;

        check(
            "interaction_radius",
            self.interaction_radius,
            positive_in_fixed(self.interaction_radius),
            ">= 1/65536",
        )?;
        check("gravity_x", self.gravity_x, true, "finite")?;
        check("gravity_y", self.gravity_y, true, "finite")?;
        check("viscosity_linear", self.viscosity_linear, self.viscosity_linear >= 0.0, ">= 0")?;
        check("viscosity_quadratic", self.viscosity_quadratic, self.viscosity_quadratic >= 0.0, ">= 0")?;
        check("viscosity_shear", self.viscosity_shear, self.viscosity_shear >= 0.0, ">= 0")?;
        check("stiffness", self.stiffness, self.stiffness >= 0.0, ">= 0")?;
        check("near_stiffness", self.near_stiffness, self.near_stiffness >= 0.0, ">= 0")?;
        check("rest_density", self.rest_density, self.rest_density >= 0.0, ">= 0")?;
        check("timestep", self.timestep, positive_in_fixed(self.timestep), ">= 1/65536")?;
        check("restitution", self.restitution, (0.0..=1.0).contains(&self.restitution), "0..=1")?;
        check("rest_speed", self.rest_speed, self.rest_speed >= 0.0, ">= 0")?;
        check(
            "frame_period_ms",
            self.frame_period_ms,
            self.frame_period_ms > 0.0 && self.frame_period_us() > 0,
            ">= 0.001",
        )?;

        for phase in &self.gravity_program {
            check("gravity_program.ticks", phase.ticks as f32, phase.ticks > 0, "> 0")?;
            check("gravity_program.x", phase.x, true, "finite")?;
            check("gravity_program.y", phase.y, true, "finite")?;
        }

        Ok(())
    }

    pub fn frame_period_us(&self) -> u64 {
        (f64::from(self.frame_period_ms) * 1_000.0).round() as u64
    }
}

/// Load the start-up config, falling back to defaults on any failure.
pub fn load_initial_config(path: impl AsRef<Path>) -> InitialConfig {
    let path = path.as_ref();

    match std::fs::read_to_string(path) {
        Ok(contents) => match InitialConfig::from_ron_str(&contents) {
            Ok(config) => match config.validate() {
                Ok(()) => {
                    info!("[CONFIG] Loaded initial config from {}", path.display());
                    config
                }
                Err(e) => {
                    error!("[CONFIG] Invalid initial config: {}", e);
                    error!("[CONFIG] Using default InitialConfig");
                    InitialConfig::default()
                }
            },
            Err(e) => {
                error!("[CONFIG] {}", e);
                error!("[CONFIG] Using default InitialConfig");
                InitialConfig::default()
            }
        },
        Err(e) => {
            error!("[CONFIG] Failed to read {}: {}", path.display(), e);
            error!("[CONFIG] Using default InitialConfig");
            InitialConfig::default()
        }
    }
}

// ============================================================================
// Conversion
// ============================================================================

impl TryFrom<&InitialConfig> for SimConfig {
    type Error = ConfigError;

    fn try_from(initial: &InitialConfig) -> Result<Self, Self::Error> {
        initial.validate()?;

        Ok(SimConfig {
            domain: Domain::new(initial.domain_width, initial.domain_height),
            interaction_radius: FixedNum::from_num(initial.interaction_radius),
            gravity: FixedVec2::from_f32(initial.gravity_x, initial.gravity_y),
            viscosity_linear: FixedNum::from_num(initial.viscosity_linear),
            viscosity_quadratic: FixedNum::from_num(initial.viscosity_quadratic),
            viscosity_shear: FixedNum::from_num(initial.viscosity_shear),
            stiffness: FixedNum::from_num(initial.stiffness),
            near_stiffness: FixedNum::from_num(initial.near_stiffness),
            rest_density: FixedNum::from_num(initial.rest_density),
            allow_attraction: initial.allow_attraction,
            timestep: FixedNum::from_num(initial.timestep),
            restitution: FixedNum::from_num(initial.restitution),
            rest_speed: FixedNum::from_num(initial.rest_speed),
            frame_period_us: initial.frame_period_us(),
        })
    }
}

// ============================================================================
// Gravity Program
// ============================================================================

/// Fixed-point form of `gravity_program`, looked up by frame number.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GravityProgram {
    phases: Vec<(u64, FixedVec2)>,
    cycle_ticks: u64,
}

impl GravityProgram {
    pub fn new(phases: &[GravityPhase]) -> Self {
        let phases: Vec<(u64, FixedVec2)> = phases
            .iter()
            .filter(|phase| phase.ticks > 0)
            .map(|phase| (u64::from(phase.ticks), FixedVec2::from_f32(phase.x, phase.y)))
            .collect();
        let cycle_ticks = phases.iter().map(|(ticks, _)| ticks).sum();
        if phases.len() == 1 {
            warn!("[CONFIG] Gravity program has a single phase; gravity will never change");
        }
        Self { phases, cycle_ticks }
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Gravity for `frame`, wrapping around the program. `None` when empty.
    pub fn gravity_at(&self, frame: u64) -> Option<FixedVec2> {
        if self.cycle_ticks == 0 {
            return None;
        }
        let mut offset = frame % self.cycle_ticks;
        for &(ticks, gravity) in &self.phases {
            if offset < ticks {
                return Some(gravity);
            }
            offset -= ticks;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid_and_matches_sim_defaults() {
        let initial = InitialConfig::default();
        assert!(initial.validate().is_ok());

        let converted = SimConfig::try_from(&initial).unwrap();
        assert_eq!(converted, SimConfig::default());
    }

    #[test]
    fn test_partial_ron_fills_defaults() {
        let config = InitialConfig::from_ron_str("(stiffness: 4.0, layout: Scatter(seed: 9))").unwrap();

        assert_eq!(config.stiffness, 4.0);
        assert_eq!(config.layout, Layout::Scatter { seed: 9 });
        assert_eq!(config.timestep, InitialConfig::default().timestep);
    }

    #[test]
    fn test_out_of_range_fields_are_rejected() {
        let cases: [(&str, InitialConfig); 5] = [
            ("restitution", InitialConfig { restitution: 1.5, ..Default::default() }),
            ("timestep", InitialConfig { timestep: 0.0, ..Default::default() }),
            ("interaction_radius", InitialConfig { interaction_radius: -1.0, ..Default::default() }),
            ("domain_width", InitialConfig { domain_width: 200, ..Default::default() }),
            ("gravity_y", InitialConfig { gravity_y: f32::NAN, ..Default::default() }),
        ];

        for (expected_field, config) in cases {
            match config.validate() {
                Err(ConfigError::OutOfRange { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("{} should be rejected, got {:?}", expected_field, other),
            }
            assert!(SimConfig::try_from(&config).is_err());
        }
    }

    #[test]
    fn test_values_that_round_to_zero_in_fixed_point_are_rejected() {
        let tiny = 1.0e-6;
        let cases: [(&str, InitialConfig); 3] = [
            ("timestep", InitialConfig { timestep: tiny, ..Default::default() }),
            ("interaction_radius", InitialConfig { interaction_radius: tiny, ..Default::default() }),
            ("frame_period_ms", InitialConfig { frame_period_ms: 0.0001, ..Default::default() }),
        ];

        for (expected_field, config) in cases {
            match config.validate() {
                Err(ConfigError::OutOfRange { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("{} should be rejected, got {:?}", expected_field, other),
            }
        }

        let smallest = InitialConfig { timestep: FixedNum::DELTA.to_f32(), ..Default::default() };
        let converted = SimConfig::try_from(&smallest).unwrap();
        assert_eq!(converted.timestep, FixedNum::DELTA);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let result = InitialConfig::from_ron_str("(stiffness: \"soft\")");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = load_initial_config("does/not/exist.ron");
        assert_eq!(config, InitialConfig::default());

        assert!(matches!(InitialConfig::read("does/not/exist.ron"), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_frame_period_conversion() {
        let config = InitialConfig { frame_period_ms: 20.0, ..Default::default() };
        assert_eq!(config.frame_period_us(), 20_000);
        assert_eq!(InitialConfig::default().frame_period_us(), 33_333);
    }

    #[test]
    fn test_gravity_program_cycles() {
        let program = GravityProgram::new(&InitialConfig::default().gravity_program);

        assert_eq!(program.gravity_at(0), Some(FixedVec2::ZERO));
        assert_eq!(program.gravity_at(300), Some(FixedVec2::from_ints(0, 1)));
        assert_eq!(program.gravity_at(450), Some(FixedVec2::from_ints(1, 0)));
        assert_eq!(program.gravity_at(850), Some(FixedVec2::from_ints(-1, 0)));
        assert_eq!(program.gravity_at(950), Some(FixedVec2::from_ints(0, -1)));
        assert_eq!(program.gravity_at(1300), Some(FixedVec2::ZERO), "Program wraps after 1300 frames");
        assert_eq!(program.gravity_at(1300 + 300), program.gravity_at(300));
    }

    #[test]
    fn test_empty_gravity_program() {
        let program = GravityProgram::new(&[]);
        assert!(program.is_empty());
        assert_eq!(program.gravity_at(42), None);
    }
}
