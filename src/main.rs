use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use microfluid::config::{load_initial_config, GravityProgram, DEFAULT_CONFIG_PATH};
use microfluid::render::Rasterizer;
use microfluid::scheduler::{FrameScheduler, FrameState};
use microfluid::simulation::{FluidSim, SimConfig};
use microfluid::snapshot::{load_snapshot, save_snapshot, Snapshot};
use microfluid::transport::{DisplayController, RecordingDisplay, TimedTransport};
use microfluid::PARTICLE_COUNT;

use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Standard-mode I²C clock of the target panel.
const BUS_HZ: u32 = 400_000;
const DEFAULT_FRAMES: u64 = 1_300;
const ASCII_EVERY: u64 = 100;
const IDLE_SLEEP: Duration = Duration::from_micros(250);

fn setup_file_logging() -> Result<String, Box<dyn Error>> {
    // Create logs directory if it doesn't exist
    let log_dir = PathBuf::from("logs");
    if !log_dir.exists() {
        fs::create_dir_all(&log_dir)?;
    }

    // Keep only the last 25 runs
    cleanup_old_logs(&log_dir, 25);

    let now = chrono::Local::now();
    let log_filename = format!("microfluid_{}.log", now.format("%Y%m%d_%H%M%S"));
    let log_path_str = log_dir.join(&log_filename).to_string_lossy().to_string();

    // One file per run, never rotated
    let file_appender = RollingFileAppender::new(Rotation::NEVER, &log_dir, &log_filename);

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("microfluid=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(log_path_str)
}

fn cleanup_old_logs(log_dir: &Path, keep_count: usize) {
    if let Ok(entries) = fs::read_dir(log_dir) {
        let mut log_files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|s| s.starts_with("microfluid") && s.ends_with(".log"))
                    .unwrap_or(false)
            })
            .collect();

        // Oldest first
        log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

        if log_files.len() > keep_count {
            for file in log_files.iter().take(log_files.len() - keep_count) {
                let _ = fs::remove_file(file.path());
            }
        }
    }
}

struct CliOptions {
    config_path: PathBuf,
    frames: u64,
    save: Option<PathBuf>,
    resume: Option<PathBuf>,
}

impl CliOptions {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, Box<dyn Error>> {
        let mut options = CliOptions {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            frames: DEFAULT_FRAMES,
            save: None,
            resume: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--frames" => {
                    let value = args.next().ok_or("--frames needs a count")?;
                    options.frames = value.parse()?;
                }
                "--save" => options.save = Some(args.next().ok_or("--save needs a path")?.into()),
                "--resume" => options.resume = Some(args.next().ok_or("--resume needs a path")?.into()),
                flag if flag.starts_with("--") => return Err(format!("unknown option {}", flag).into()),
                path => options.config_path = PathBuf::from(path),
            }
        }

        Ok(options)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let log_file = setup_file_logging()?;

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  microfluid - Logging to file                            ║");
    println!("╠══════════════════════════════════════════════════════════╣");
    println!("║  Log file: {:<45} ║", log_file);
    println!("╚══════════════════════════════════════════════════════════╝");

    let options = CliOptions::parse(std::env::args().skip(1))?;

    let initial = load_initial_config(&options.config_path);
    let sim_config = SimConfig::try_from(&initial)?;
    let gravity_program = GravityProgram::new(&initial.gravity_program);

    let mut sim = FluidSim::<PARTICLE_COUNT>::new(sim_config, initial.layout);
    if let Some(path) = &options.resume {
        load_snapshot(path)?.restore_into(&mut sim)?;
        info!("Resumed at tick {}", sim.tick().0);
    }

    let mut panel = RecordingDisplay::new();
    panel.init()?;
    let setup_commands = panel.writes().len();
    info!("Display initialized with {} setup commands", setup_commands);

    let transport = TimedTransport::i2c(BUS_HZ);
    info!("Frame transfer time {:?} at {} Hz", transport.transfer_time(), BUS_HZ);

    let mut scheduler = FrameScheduler::new(sim, Rasterizer::new(initial.particle_shape), transport);
    let start = Instant::now();
    let mut presented = 0;

    while presented < options.frames {
        let now_us = start.elapsed().as_micros() as u64;
        let state = scheduler.poll(now_us);

        if scheduler.stats().frames_presented != presented {
            presented = scheduler.stats().frames_presented;

            if let Some(gravity) = gravity_program.gravity_at(presented) {
                scheduler.sim_mut().set_gravity(gravity);
            }
            if presented % ASCII_EVERY == 0 {
                if let Some(frame) = scheduler.in_flight_frame() {
                    println!("frame {}:\n{}", presented, frame.to_ascii());
                }
            }
        } else if state == FrameState::AwaitingTransport {
            std::thread::sleep(IDLE_SLEEP);
        }
    }

    let stats = scheduler.stats();
    let elapsed = start.elapsed().as_secs_f64();
    info!(
        "Presented {} frames in {:.2}s ({:.1} fps), {} missed deadlines",
        stats.frames_presented,
        elapsed,
        stats.frames_presented as f64 / elapsed.max(f64::EPSILON),
        stats.missed_deadlines
    );
    if stats.missed_deadlines > 0 {
        warn!("Frame budget of {} us was exceeded", scheduler.frame_period_us());
    }

    if let Some(path) = &options.save {
        save_snapshot(path, &Snapshot::capture(scheduler.sim()))?;
    }

    Ok(())
}
