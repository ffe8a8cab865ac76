//! Particle store to framebuffer.

use microfluid_macros::profile;
use serde::{Deserialize, Serialize};

use crate::simulation::ParticleStore;
use super::framebuffer::Framebuffer;

/// Rounded 4×4 droplet, offsets from the sprite's top-left corner.
const BLOB_PIXELS: [(i32, i32); 12] = [
    (1, 0), (2, 0),
    (0, 1), (1, 1), (2, 1), (3, 1),
    (0, 2), (1, 2), (2, 2), (3, 2),
    (1, 3), (2, 3),
];

/// The blob is centred on the particle's pixel rather than hanging below it.
const BLOB_ORIGIN: (i32, i32) = (-1, -1);

const SINGLE_PIXEL: [(i32, i32); 1] = [(0, 0)];

/// What each particle looks like on the panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleShape {
    /// One lit pixel per particle.
    #[default]
    Pixel,
    /// A 12-pixel droplet, easier to see on a small panel.
    Blob,
}

impl ParticleShape {
    fn sprite(&self) -> (&'static [(i32, i32)], (i32, i32)) {
        match self {
            ParticleShape::Pixel => (&SINGLE_PIXEL, (0, 0)),
            ParticleShape::Blob => (&BLOB_PIXELS, BLOB_ORIGIN),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rasterizer {
    pub shape: ParticleShape,
}

impl Rasterizer {
    pub const fn new(shape: ParticleShape) -> Self {
        Self { shape }
    }

    /// Clear `frame` and draw every particle into it.
    ///
    /// Work is one sprite per particle regardless of how many particles
    /// share a pixel; overlapping pixels simply stay set. Returns the number
    /// of pixel writes that landed on the panel.
    #[profile(200)]
    pub fn draw<const N: usize>(&self, particles: &ParticleStore<N>, frame: &mut Framebuffer) -> usize {
        frame.clear();

        let (pixels, (origin_x, origin_y)) = self.shape.sprite();
        let mut written = 0;

        for particle in particles {
            let (x, y) = particle.display_position();
            for &(dx, dy) in pixels {
                if frame.set_pixel(x + origin_x + dx, y + origin_y + dy) {
                    written += 1;
                }
            }
        }

        written
    }
}
