pub const PALETTE_SIZE: usize = 16;

// 1K/470/220 ohm ladders on red and green, 470/220 on blue.
const RG_WEIGHTS: [f64; 3] = [1000.0, 470.0, 220.0];
const B_WEIGHTS: [f64; 2] = [470.0, 220.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    /// `r<<24 | g<<16 | b<<8 | a`, the framebuffer's pixel format.
    #[inline]
    pub const fn packed(self) -> u32 {
        (self.r as u32) << 24 | (self.g as u32) << 16 | (self.b as u32) << 8 | self.a as u32
    }

    pub const fn from_packed(pixel: u32) -> Self {
        Self {
            r: (pixel >> 24) as u8,
            g: (pixel >> 16) as u8,
            b: (pixel >> 8) as u8,
            a: pixel as u8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgba; PALETTE_SIZE],
}

impl Default for Palette {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Palette {
    /// Board colour set used when no palette PROM is available.
    pub const DEFAULT: Palette = Palette {
        colors: [
            Rgba::opaque(0x00, 0x00, 0x00), // black
            Rgba::opaque(0xFF, 0x00, 0x00), // red
            Rgba::opaque(0xFF, 0xB8, 0x97), // pink
            Rgba::opaque(0xFF, 0xB8, 0xFF), // light pink
            Rgba::opaque(0x00, 0xFF, 0xFF), // cyan
            Rgba::opaque(0xFF, 0xB8, 0x00), // orange
            Rgba::opaque(0x51, 0xFF, 0xFF), // light cyan
            Rgba::opaque(0xFF, 0xFF, 0x00), // yellow
            Rgba::opaque(0xFF, 0xB8, 0x97), // peach
            Rgba::opaque(0xFF, 0xB8, 0x00), // orange
            Rgba::opaque(0xFF, 0xFF, 0xFF), // white
            Rgba::opaque(0x00, 0x00, 0xFF), // blue
            Rgba::opaque(0x00, 0xFF, 0x00), // green
            Rgba::opaque(0xFF, 0xFF, 0xB8), // light yellow
            Rgba::opaque(0xFF, 0x00, 0xFF), // magenta
            Rgba::opaque(0xFF, 0xB8, 0x51), // light orange
        ],
    };

    pub fn new(colors: [Rgba; PALETTE_SIZE]) -> Self {
        Self { colors }
    }

    /// Decode the first sixteen entries of the 82s123 palette PROM.
    ///
    /// Bits 0-2 drive red, 3-5 green and 6-7 blue through resistor ladders.
    /// Returns `None` when fewer than sixteen bytes are supplied.
    pub fn from_color_prom(prom: &[u8]) -> Option<Self> {
        let entries = prom.get(..PALETTE_SIZE)?;
        let rg_scale = conductance_scale(&RG_WEIGHTS);
        let b_scale = conductance_scale(&B_WEIGHTS);

        let mut colors = [Rgba::default(); PALETTE_SIZE];
        for (color, &entry) in colors.iter_mut().zip(entries) {
            *color = Rgba::opaque(
                mix(&rg_scale, entry),
                mix(&rg_scale, entry >> 3),
                mix(&b_scale, entry >> 6),
            );
        }
        Some(Self { colors })
    }

    #[inline]
    pub fn get(&self, index: u8) -> Rgba {
        self.colors[index as usize & (PALETTE_SIZE - 1)]
    }

    pub fn colors(&self) -> &[Rgba; PALETTE_SIZE] {
        &self.colors
    }
}

fn conductance_scale<const N: usize>(weights: &[f64; N]) -> [f64; N] {
    let total: f64 = weights.iter().map(|w| 1.0 / w).sum();
    weights.map(|w| (1.0 / w) / total)
}

/// Sum the weighted low `N` bits of `bits` into an 8-bit level.
fn mix<const N: usize>(scale: &[f64; N], bits: u8) -> u8 {
    let level: f64 = scale
        .iter()
        .enumerate()
        .filter(|&(i, _)| bits >> i & 1 != 0)
        .map(|(_, s)| s)
        .sum();
    (level * 255.0).round().min(255.0) as u8
}
