// Configuration management
//
// Handles emulator configuration and settings persistence. The boot
// policy and compatibility toggles live here so cross-cutting shim
// behaviors (HLE IPL, SPC autoplay patching, the char-base unit) are
// chosen at construction time instead of through process-wide state.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::ppu::CharBaseUnit;
use crate::scheduler::Region;

/// Default configuration file path
const CONFIG_FILE: &str = "emulator_config.toml";

/// Emulator configuration
///
/// Stores all user-configurable settings for the emulator core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmulatorConfig {
    /// Video timing settings
    pub video: VideoConfig,

    /// Audio settings
    pub audio: AudioConfig,

    /// Boot policy (APU and IPL handling)
    pub boot: BootConfig,

    /// Hardware-accuracy compatibility toggles
    pub compat: CompatConfig,

    /// Save state settings
    pub save_state: SaveStateConfig,

    /// Screenshot settings
    pub screenshot: ScreenshotConfig,
}

/// Video timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Video standard: "ntsc" (262 lines) or "pal" (312 lines)
    pub region: VideoRegion,
}

/// Serializable region selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoRegion {
    Ntsc,
    Pal,
}

impl VideoRegion {
    pub fn to_region(self) -> Region {
        match self {
            VideoRegion::Ntsc => Region::Ntsc,
            VideoRegion::Pal => Region::Pal,
        }
    }
}

/// Audio configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Enable audio output
    pub enabled: bool,

    /// Volume (0.0-1.0)
    pub volume: f32,

    /// Host sample rate for the resampler
    pub sample_rate: u32,
}

/// Boot policy configuration
///
/// Environmental shim behaviors are opted into here rather than via
/// global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootConfig {
    /// Run the SPC700 core at all
    pub apu_enabled: bool,

    /// Shortcut the IPL handshake instead of executing the boot ROM
    pub hle_ipl: bool,

    /// Patch recognized mailbox wait loops when loading SPC dumps
    pub spc_autoplay_patch: bool,
}

/// Compatibility toggles
///
/// Both default to the hardware-accurate behavior; the alternates match
/// a family of test fixtures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatConfig {
    /// Character base unit for $210B/$210C: true = 4K words (0x2000
    /// bytes, hardware), false = 2K words (0x1000 bytes)
    pub char_base_4k_words: bool,

    /// Strict per-layer color math mask (hardware) vs the legacy
    /// backdrop-bit-as-global-enable behavior
    pub strict_math_mask: bool,
}

impl CompatConfig {
    pub fn char_base_unit(&self) -> CharBaseUnit {
        if self.char_base_4k_words {
            CharBaseUnit::Words4k
        } else {
            CharBaseUnit::Words2k
        }
    }
}

/// Save state configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveStateConfig {
    /// Number of save slots (1-10)
    pub slots: u8,

    /// Save directory
    pub save_directory: PathBuf,
}

/// Screenshot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotConfig {
    /// Screenshot directory
    pub screenshot_directory: PathBuf,

    /// Include timestamp in filename
    pub include_timestamp: bool,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        EmulatorConfig {
            video: VideoConfig {
                region: VideoRegion::Ntsc,
            },
            audio: AudioConfig {
                enabled: true,
                volume: 0.5,
                sample_rate: 48_000,
            },
            boot: BootConfig {
                apu_enabled: true,
                hle_ipl: false,
                spc_autoplay_patch: true,
            },
            compat: CompatConfig {
                char_base_4k_words: true,
                strict_math_mask: true,
            },
            save_state: SaveStateConfig {
                slots: 10,
                save_directory: PathBuf::from("saves"),
            },
            screenshot: ScreenshotConfig {
                screenshot_directory: PathBuf::from("screenshots"),
                include_timestamp: true,
            },
        }
    }
}

impl EmulatorConfig {
    /// Load configuration from file or create default
    ///
    /// If the configuration file doesn't exist, creates a default
    /// configuration and saves it to the file.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|_| {
            let config = Self::default();
            // Try to save the default config, but don't fail if we can't
            let _ = config.save();
            config
        })
    }

    /// Load configuration from file
    pub fn load() -> Result<Self, io::Error> {
        let contents = fs::read_to_string(CONFIG_FILE)?;
        toml::from_str(&contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), io::Error> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(CONFIG_FILE, contents)
    }
}
