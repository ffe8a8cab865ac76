//! Fixed-point particle fluid for a 128×64 monochrome panel.
//!
//! This crate is organized into:
//! - **fixed_math**: Saturating fixed-point scalar and vector types
//! - **simulation**: Double density relaxation fluid over a fixed particle store
//! - **render**: Page-major 1-bpp framebuffer and particle rasterizer
//! - **transport**: Frame transfer and display controller interfaces
//! - **scheduler**: Cooperative solve / rasterize / present state machine
//! - **config**: RON start-up configuration
//! - **snapshot**: Compressed save and resume of fluid state

pub mod config;
pub mod fixed_math;
pub mod render;
pub mod scheduler;
pub mod simulation;
pub mod snapshot;
pub mod transport;

/// Particle count used by the demo and the default layout.
pub const PARTICLE_COUNT: usize = 50;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Conditionally log messages based on tick interval when perf_stats feature is enabled.
///
/// This macro logs a message every 100 ticks. When the perf_stats feature is disabled,
/// this macro compiles to nothing and its arguments are never evaluated.
///
/// # Example
/// ```ignore
/// profile_log!(sim.tick(), "Presented {} frames", stats.frames_presented);
/// ```
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {
        if $tick.0 % 100 == 0 {
            ::tracing::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {};
}
