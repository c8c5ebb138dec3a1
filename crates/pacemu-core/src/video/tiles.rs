pub const TILE_COUNT: usize = 256;
pub const TILE_SIZE: usize = 8;
pub const TILE_PIXELS: usize = TILE_SIZE * TILE_SIZE;
/// Bytes per tile in the 2bpp character ROM.
pub const ENCODED_TILE_BYTES: usize = 16;

pub type Tile = [u8; TILE_PIXELS];

/// 256 tiles pre-expanded to one byte per pixel, row-major within a tile.
#[derive(Clone, PartialEq, Eq)]
pub struct TileSet {
    tiles: Box<[Tile; TILE_COUNT]>,
}

impl std::fmt::Debug for TileSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileSet")
            .field("tiles", &TILE_COUNT)
            .finish()
    }
}

impl Default for TileSet {
    fn default() -> Self {
        Self::test_pattern()
    }
}

impl TileSet {
    pub fn blank() -> Self {
        Self {
            tiles: Box::new([[0; TILE_PIXELS]; TILE_COUNT]),
        }
    }

    /// Checkerboard per tile, coloured with the low nibble of the tile index.
    pub fn test_pattern() -> Self {
        let mut set = Self::blank();
        for (index, tile) in set.tiles.iter_mut().enumerate() {
            for y in 0..TILE_SIZE {
                for x in 0..TILE_SIZE {
                    if (x + y + index) & 1 != 0 {
                        tile[y * TILE_SIZE + x] = index as u8 & 0x0F;
                    }
                }
            }
        }
        set
    }

    /// Expand the 4 KiB `pacman.5e` character ROM.
    ///
    /// Each tile is 16 bytes. Pixels 0-3 of a row come from byte `8 + y`,
    /// pixels 4-7 from byte `y`; within a byte the high nibble holds the
    /// upper bit plane, MSB first. Missing trailing bytes decode as zero.
    pub fn from_character_rom(rom: &[u8]) -> Self {
        let mut set = Self::blank();
        for (code, tile) in set.tiles.iter_mut().enumerate() {
            let base = code * ENCODED_TILE_BYTES;
            for y in 0..TILE_SIZE {
                for x in 0..TILE_SIZE {
                    let (byte_off, bit) = if x < 4 { (8, x) } else { (0, x - 4) };
                    let byte = rom.get(base + byte_off + y).copied().unwrap_or(0);
                    let hi = (byte >> (7 - bit)) & 1;
                    let lo = (byte >> (3 - bit)) & 1;
                    tile[y * TILE_SIZE + x] = hi << 1 | lo;
                }
            }
        }
        set
    }

    #[inline]
    pub fn tile(&self, code: u8) -> &Tile {
        &self.tiles[code as usize]
    }

    pub fn tile_mut(&mut self, code: u8) -> &mut Tile {
        &mut self.tiles[code as usize]
    }

    /// Heap bytes held by the expanded table.
    pub fn byte_size(&self) -> usize {
        TILE_COUNT * TILE_PIXELS
    }
}
