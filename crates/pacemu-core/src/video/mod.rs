//! Tile layer rendering for the 224×288 playfield.

pub mod compositor;
pub mod palette;
pub mod tiles;

pub use compositor::{
    ColorLaw, CompositorOptions, Framebuffer, TILES_X, TILES_Y, TileCompositor, VIDEO_HEIGHT,
    VIDEO_WIDTH,
};
pub use palette::{PALETTE_SIZE, Palette, Rgba};
pub use tiles::{TileSet, TILE_COUNT, TILE_SIZE};
