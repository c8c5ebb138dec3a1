//! Pac-Man arcade board emulation core.
//!
//! This crate models the board around the Z80: banked memory regions, device
//! registers, the per-frame run loop and the tile layer. The instruction core
//! itself is supplied by the host through [`cpu::CpuCore`]. Frontends drive
//! everything through the [`machine`] facade.

/// Page table from the 16-bit bus onto memory regions.
pub mod address_space;

/// CPU collaborator traits.
pub mod cpu;

/// Pac-Man memory map, I/O registers and board latches.
pub mod driver;

pub mod error;

/// Host controls to active-low input ports.
pub mod input;

/// High-level facade that wires the scheduler and compositor together.
pub mod machine;

/// Region allocator plus address map.
pub mod memory;

/// Owned backing buffers for every mapped region.
pub mod region;

/// ROM set layout and loaders.
pub mod rom;

/// Frame-synchronous run loop and vblank delivery.
pub mod scheduler;

/// Palette, tiles and the tile compositor.
pub mod video;

pub use error::{Error, Result};
