mod config;
mod snapshot;

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use log::info;
use pacemu_core::driver::{
    self, Driver, REG_DSW1, REG_DSW2, REG_FLIP_SCREEN, REG_IN0_IRQ_ENABLE, REG_IN1, SPRITE_COORDS,
};
use pacemu_core::rom::{self, DirectorySource, RomSet, SLOTS};
use pacemu_core::video::{
    Framebuffer, Palette, Rgba, TILE_COUNT, TILES_Y, TileCompositor, TileSet,
};

use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "pacemu", version, about = "Pac-Man board inspection tool")]
struct Args {
    /// Path to config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the pacman.* ROM images
    #[arg(long, global = true)]
    rom_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that every ROM image is present with the right size
    Verify,
    /// List directories under ROOT that look like Pac-Man ROM sets
    Scan { root: PathBuf },
    /// Print the board memory map
    Map,
    /// Hex dump of the board address space after power-up
    Dump {
        /// Start address, e.g. 0x4000 or $4000
        #[arg(long, value_parser = parse_address, default_value = "0")]
        start: u16,

        #[arg(long, default_value_t = 256)]
        len: usize,

        /// Load the built-in diagnostic program instead of the ROM set
        #[arg(long)]
        diagnostic: bool,
    },
    /// Render all 256 tiles into a PNG
    Tiles {
        #[arg(long)]
        out: PathBuf,

        /// Attribute byte applied to every tile
        #[arg(long, value_parser = parse_byte, default_value = "0x0A")]
        color: u8,
    },
}

fn parse_address(s: &str) -> Result<u16, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_prefix('$'));
    let parsed = match digits {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address {s:?}: {e}"))
}

fn parse_byte(s: &str) -> Result<u8, String> {
    let value = parse_address(s)?;
    u8::try_from(value).map_err(|_| format!("{s:?} does not fit in a byte"))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config_path = args.config.clone().unwrap_or_else(config::default_config_path);
    let mut cfg = config::load_from_file(&config_path);
    if let Some(dir) = args.rom_dir.clone() {
        cfg.rom_dir = Some(dir);
    }

    match args.command {
        Command::Verify => verify(&cfg),
        Command::Scan { root } => scan(&root),
        Command::Map => {
            print_map();
            Ok(())
        }
        Command::Dump {
            start,
            len,
            diagnostic,
        } => dump(&cfg, start, len, diagnostic),
        Command::Tiles { out, color } => tiles(&cfg, &out, color),
    }
}

fn load_rom_set(cfg: &CliConfig) -> anyhow::Result<RomSet> {
    let Some(dir) = cfg.rom_dir.as_ref() else {
        bail!("no ROM directory: pass --rom-dir or set rom_dir in the config file");
    };
    RomSet::load(&mut DirectorySource::new(dir))
        .with_context(|| format!("loading ROM set from {}", dir.display()))
}

fn verify(cfg: &CliConfig) -> anyhow::Result<()> {
    let set = load_rom_set(cfg)?;
    for slot in &SLOTS {
        println!("  {:<10} {:>5} bytes  {:?}", slot.name, slot.size, slot.kind);
    }
    println!("ROM set OK ({} bytes)", set.total_bytes());
    Ok(())
}

fn scan(root: &std::path::Path) -> anyhow::Result<()> {
    let sets = rom::find_rom_sets(root).with_context(|| format!("scanning {}", root.display()))?;
    if sets.is_empty() {
        println!("no Pac-Man ROM sets under {}", root.display());
    }
    for dir in sets {
        let status = match RomSet::load(&mut DirectorySource::new(&dir)) {
            Ok(_) => "complete".to_string(),
            Err(e) => e.to_string(),
        };
        println!("{}: {status}", dir.display());
    }
    Ok(())
}

fn print_map() {
    for (range, window) in driver::windows() {
        println!(
            "${:04X}-${:04X}  {:<8} {} bytes",
            range.start(),
            range.end(),
            format!("{window:?}"),
            *range.end() as usize - *range.start() as usize + 1
        );
    }
    println!("$5100-$FFFF  unmapped (reads $FF)");
    println!();
    println!("I/O registers:");
    println!("  ${REG_IN0_IRQ_ENABLE:04X}  read IN0 / write interrupt enable");
    println!("  ${REG_FLIP_SCREEN:04X}  write flip screen");
    println!("  ${REG_IN1:04X}  read IN1");
    println!(
        "  ${:04X}-${:04X}  write sprite coordinates",
        SPRITE_COORDS.start(),
        SPRITE_COORDS.end()
    );
    println!("  ${REG_DSW1:04X}  read DSW1");
    println!("  ${REG_DSW2:04X}  read DSW2");
}

fn dump(cfg: &CliConfig, start: u16, len: usize, diagnostic: bool) -> anyhow::Result<()> {
    let program = if diagnostic || cfg.rom_dir.is_none() {
        info!("using the built-in diagnostic program");
        rom::diagnostic_rom()
    } else {
        load_rom_set(cfg)?.program_rom().to_vec()
    };

    let mut board = Driver::new();
    board.init()?;
    board.load_program_rom(&program)?;
    print!("{}", board.memory().dump(start, len));
    board.shutdown();
    Ok(())
}

fn tiles(cfg: &CliConfig, out: &std::path::Path, color: u8) -> anyhow::Result<()> {
    let mut compositor = match cfg.rom_dir {
        Some(_) => {
            let set = load_rom_set(cfg)?;
            let palette = Palette::from_color_prom(set.palette_prom()).unwrap_or_default();
            let mut compositor =
                TileCompositor::new(palette, TileSet::from_character_rom(set.character_rom()));
            compositor.set_lookup(set.lookup_prom());
            compositor
        }
        None => TileCompositor::default(),
    }
    .with_options(cfg.compositor_options());

    // sixteen tiles per column, column-major like the board
    let mut video = vec![0u8; 0x400];
    let mut attributes = vec![0u8; 0x400];
    for code in 0..TILE_COUNT {
        let index = (code / 16) * TILES_Y + code % 16;
        video[index] = code as u8;
        attributes[index] = color;
    }

    let mut fb = Framebuffer::new(cfg.framebuffer_width, cfg.framebuffer_height);
    fb.clear(Rgba::opaque(0, 0, 0));
    compositor.render(&mut fb, &video, &attributes, false);
    snapshot::write_png(out, &fb)?;
    println!("wrote {}", out.display());
    Ok(())
}
