//! Deterministic initial particle layouts.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::fixed_math::{FixedNum, FixedVec2};
use super::components::{Particle, ParticleStore};
use super::resources::Domain;

/// How the particle store is populated at start-up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    /// The word "FLUID", a droplet outline and three rows of fill beneath,
    /// laid out for a 128×64 panel. Slots past the drawing continue as a
    /// grid.
    #[default]
    Logo,
    /// Rows filled from the bottom-left corner upwards.
    Grid { spacing: u8 },
    /// Uniformly scattered sub-pixel positions from a seeded generator.
    Scatter { seed: u64 },
}

/// Pixel coordinates of the logo drawing, letter by letter.
const LOGO_POINTS: [(u8, u8); 86] = [
    // F
    (5, 11), (5, 17), (5, 23), (5, 29), (11, 17), (11, 29), (17, 29),
    // L
    (23, 11), (23, 17), (23, 23), (23, 29), (29, 11), (35, 11),
    // U
    (41, 11), (41, 17), (41, 23), (41, 29), (47, 11), (53, 11), (53, 17), (53, 23), (53, 29),
    // I
    (59, 11), (59, 29), (65, 11), (65, 17), (65, 23), (65, 29), (71, 11), (71, 29),
    // D
    (77, 11), (77, 17), (77, 23), (77, 29), (83, 11), (83, 29), (89, 17), (89, 23),
    // droplet
    (95, 14), (95, 20), (98, 8), (98, 26), (101, 32), (104, 5), (104, 38), (107, 32),
    (110, 8), (110, 26), (113, 14), (113, 20),
    // fill rows
    (29, 44), (35, 44), (41, 44), (47, 44), (53, 44), (59, 44), (65, 44), (71, 44),
    (77, 44), (83, 44), (89, 44), (95, 44),
    (29, 50), (35, 50), (41, 50), (47, 50), (53, 50), (59, 50), (65, 50), (71, 50),
    (77, 50), (83, 50), (89, 50), (95, 50),
    (29, 56), (35, 56), (41, 56), (47, 56), (53, 56), (59, 56), (65, 56), (71, 56),
    (77, 56), (83, 56), (89, 56), (95, 56),
];

const LOGO_OVERFLOW_SPACING: u8 = 6;

fn grid_point(slot: usize, spacing: u8, domain: &Domain) -> FixedVec2 {
    let spacing = spacing.max(1) as i32;
    let width = domain.width as i32;
    let height = domain.height as i32;
    let cols = ((width - 1) / spacing).max(1);

    let col = slot as i32 % cols;
    let row = slot as i32 / cols;
    let x = spacing / 2 + col * spacing;
    let y = height - 1 - spacing / 2 - row * spacing;

    FixedVec2::new(FixedNum::from_num(x), FixedNum::from_num(y))
}

impl Layout {
    /// Populate all `N` slots. Points outside `domain` are clamped onto it.
    pub fn build<const N: usize>(&self, domain: &Domain) -> ParticleStore<N> {
        let mut slots = [Particle::default(); N];

        match *self {
            Layout::Logo => {
                for (slot, particle) in slots.iter_mut().enumerate() {
                    let point = match LOGO_POINTS.get(slot) {
                        Some(&(x, y)) => FixedVec2::from_ints(x as i16, y as i16),
                        None => grid_point(slot - LOGO_POINTS.len(), LOGO_OVERFLOW_SPACING, domain),
                    };
                    *particle = Particle::at(domain.clamp(point));
                }
            }
            Layout::Grid { spacing } => {
                for (slot, particle) in slots.iter_mut().enumerate() {
                    *particle = Particle::at(domain.clamp(grid_point(slot, spacing, domain)));
                }
            }
            Layout::Scatter { seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                let max_x = FixedNum::from_num(domain.width.max(1)).to_bits();
                let max_y = FixedNum::from_num(domain.height.max(1)).to_bits();
                for particle in slots.iter_mut() {
                    let x = FixedNum::from_bits(rng.random_range(0..max_x));
                    let y = FixedNum::from_bits(rng.random_range(0..max_y));
                    *particle = Particle::at(domain.clamp(FixedVec2::new(x, y)));
                }
            }
        }

        ParticleStore::new(slots)
    }
}
