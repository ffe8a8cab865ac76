//! Saving and resuming fluid state.
//!
//! A snapshot is the particle store plus the tick it was taken at, written
//! with bincode inside a zlib stream. Restoring it into a simulation with the
//! same config continues the interrupted run bit for bit.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::simulation::{FluidSim, Particle, ParticleStore, SimTick};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    Version { found: u32, expected: u32 },
    ParticleCount { found: usize, expected: usize },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Version { found, expected } => {
                write!(f, "snapshot version {} is not supported (expected {})", found, expected)
            }
            SnapshotError::ParticleCount { found, expected } => {
                write!(f, "snapshot holds {} particles but the simulation has {}", found, expected)
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub version: u32,
    pub tick: SimTick,
    pub particles: Vec<Particle>,
}

impl Snapshot {
    pub fn capture<const N: usize>(sim: &FluidSim<N>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            tick: sim.tick(),
            particles: sim.particles().as_slice().to_vec(),
        }
    }

    /// Overwrite `sim`'s particles and tick with the snapshot's.
    ///
    /// `sim` is left untouched on error.
    pub fn restore_into<const N: usize>(&self, sim: &mut FluidSim<N>) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version {
                found: self.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        let slots: [Particle; N] = self.particles.as_slice().try_into().map_err(|_| {
            SnapshotError::ParticleCount {
                found: self.particles.len(),
                expected: N,
            }
        })?;
        sim.restore(self.tick, ParticleStore::new(slots));
        Ok(())
    }
}

pub fn save_snapshot(path: impl AsRef<Path>, snapshot: &Snapshot) -> Result<(), Box<dyn std::error::Error>> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let mut encoder = ZlibEncoder::new(writer, Compression::default());
    bincode::serialize_into(&mut encoder, snapshot)?;
    encoder.finish()?;
    info!("[SNAPSHOT] Saved tick {} to {}", snapshot.tick.0, path.display());
    Ok(())
}

pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Snapshot, Box<dyn std::error::Error>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut decoder = ZlibDecoder::new(reader);
    let snapshot: Snapshot = bincode::deserialize_from(&mut decoder)?;
    info!("[SNAPSHOT] Loaded tick {} from {}", snapshot.tick.0, path.display());
    Ok(snapshot)
}
