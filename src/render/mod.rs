//! Render layer - particle positions to a packed monochrome frame.
//!
//! This module is organized into:
//! - **framebuffer**: Page-major 1-bpp frame matching SSD1306 horizontal addressing
//! - **rasterizer**: Clears a back buffer and stamps one sprite per particle

pub mod framebuffer;
pub mod rasterizer;


pub use framebuffer::{Framebuffer, FRAME_BYTES, PAGES, PANEL_HEIGHT, PANEL_WIDTH};
pub use rasterizer::{ParticleShape, Rasterizer};
