use std::path::{Path, PathBuf};

use log::warn;
use pacemu_core::video::{ColorLaw, CompositorOptions};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ColorLawSetting {
    #[default]
    Flat,
    LookupProm,
}

impl From<ColorLawSetting> for ColorLaw {
    fn from(setting: ColorLawSetting) -> Self {
        match setting {
            ColorLawSetting::Flat => ColorLaw::FlatTileColor,
            ColorLawSetting::LookupProm => ColorLaw::LookupProm,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub rom_dir: Option<PathBuf>,
    pub framebuffer_width: usize,
    pub framebuffer_height: usize,
    pub honor_flip: bool,
    pub color_law: ColorLawSetting,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            rom_dir: None,
            framebuffer_width: 640,
            framebuffer_height: 480,
            honor_flip: false,
            color_law: ColorLawSetting::Flat,
        }
    }
}

impl CliConfig {
    pub fn compositor_options(&self) -> CompositorOptions {
        CompositorOptions {
            honor_flip: self.honor_flip,
            color_law: self.color_law.into(),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("pacemu").join("pacemu.toml");
    }

    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join("pacemu")
            .join("pacemu.toml");
    }

    PathBuf::from("pacemu.toml")
}

/// Read the config at `path`. A missing file yields defaults silently; an
/// unreadable one yields defaults with a warning.
pub fn load_from_file(path: &Path) -> CliConfig {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return CliConfig::default(),
    };

    match toml::from_str::<CliConfig>(&text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(
                "Failed to parse config {}: {e}; using defaults",
                path.display()
            );
            CliConfig::default()
        }
    }
}
