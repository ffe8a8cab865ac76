//! Stage-by-stage solver timings for the default 50-particle fluid.
//!
//! Run with `--features perf_stats` to also see the `[PERF]` lines from the
//! profiled stages.

use microfluid::render::{Framebuffer, Rasterizer};
use microfluid::simulation::{collision, physics, relaxation, viscosity, FluidSim, Layout, SimConfig};
use microfluid::fixed_math::FixedVec2;
use microfluid::PARTICLE_COUNT;
use std::time::{Duration, Instant};

const TICKS: u32 = 600;

#[derive(Default)]
struct StageTimes {
    gravity: Duration,
    viscosity: Duration,
    predict: Duration,
    relax: Duration,
    collide: Duration,
    reconstruct: Duration,
    rasterize: Duration,
}

fn timed<R>(total: &mut Duration, f: impl FnOnce() -> R) -> R {
    let start = Instant::now();
    let result = f();
    *total += start.elapsed();
    result
}

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let config = SimConfig::default();
    let mut sim = FluidSim::<PARTICLE_COUNT>::new(config.clone(), Layout::Logo);
    let rasterizer = Rasterizer::default();
    let mut frame = Framebuffer::new();
    let mut times = StageTimes::default();

    // Scatter velocities so the first ticks already have interacting pairs
    let mut rng = fastrand::Rng::with_seed(42);
    for particle in sim.particles_mut().iter_mut() {
        particle.velocity = FixedVec2::from_f32((rng.f32() - 0.5) * 4.0, (rng.f32() - 0.5) * 4.0);
    }

    let mut viscosity_pairs = 0;
    let mut relax_pairs = 0;
    let mut wall_hits = 0;

    println!("Running {} ticks with {} particles...\n", TICKS, PARTICLE_COUNT);
    for _ in 0..TICKS {
        let particles = sim.particles_mut().as_mut_slice();
        timed(&mut times.gravity, || physics::apply_gravity(particles, &config));
        viscosity_pairs += timed(&mut times.viscosity, || viscosity::apply_viscosity(particles, &config));
        timed(&mut times.predict, || physics::predict_positions(particles, &config));
        relax_pairs += timed(&mut times.relax, || relaxation::relax_density(particles, &config));
        wall_hits += timed(&mut times.collide, || collision::resolve_boundaries(particles, &config));
        timed(&mut times.reconstruct, || physics::reconstruct_velocity(particles, &config));
        timed(&mut times.rasterize, || rasterizer.draw(sim.particles(), &mut frame));
    }

    let stages = [
        ("gravity", times.gravity),
        ("viscosity", times.viscosity),
        ("predict", times.predict),
        ("relax", times.relax),
        ("collide", times.collide),
        ("reconstruct", times.reconstruct),
        ("rasterize", times.rasterize),
    ];
    let total: Duration = stages.iter().map(|(_, time)| *time).sum();

    println!("{:<12} {:>12} {:>8}", "stage", "per tick", "share");
    for (name, time) in stages {
        println!(
            "{:<12} {:>12?} {:>7.1}%",
            name,
            time / TICKS,
            100.0 * time.as_secs_f64() / total.as_secs_f64().max(f64::EPSILON)
        );
    }
    println!("{:<12} {:>12?}", "total", total / TICKS);
    println!(
        "\nper tick: {:.1} viscosity pairs, {:.1} relaxation displacements, {:.1} wall contacts",
        viscosity_pairs as f64 / TICKS as f64,
        relax_pairs as f64 / TICKS as f64,
        wall_hits as f64 / TICKS as f64
    );
    println!("lit pixels in last frame: {}", frame.count_set());
}
