use std::fs;
use std::path::Path;
use std::time::Duration;

use bitfall_core::{
    Alphabet, CharacterSet, ConfigError, DEFAULT_COLUMN_LENGTH, DEFAULT_TEXT_SIZE,
    DEFAULT_TICK_INTERVAL, LEGACY_CUSTOM_ID, RainConfig, Rgb,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::SettingsError;

/// User facing settings, as stored in the TOML file.
///
/// Missing keys fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// One of `binary`, `matrix`, `custom-random`, `custom-exact`,
    /// `custom-cycle`.
    pub character_set: String,
    /// Symbol pool for `custom-random`.
    pub custom_character_set: String,
    /// Literal text for `custom-exact` and `custom-cycle`.
    pub custom_character_string: String,
    pub bit_color: Rgb,
    pub background_color: Rgb,
    /// Text size in surface units (16 is one terminal row).
    pub text_size: u32,
    /// Glyph change speed in percent; 100 changes a glyph every 100ms.
    pub change_bit_speed: u32,
    /// Fall speed in percent of the text size per tick.
    pub falling_speed: u32,
    /// Glyphs per column, at most 1024. Ignored for the literal text sets.
    pub num_bits: u32,
    pub enable_depth: bool,
    /// Upper bound of the random delay before a column starts falling.
    pub start_jitter_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            character_set: CharacterSet::Binary.id().to_string(),
            custom_character_set: String::new(),
            custom_character_string: String::new(),
            bit_color: Rgb::PHOSPHOR,
            background_color: Rgb::BLACK,
            text_size: DEFAULT_TEXT_SIZE as u32,
            change_bit_speed: 100,
            falling_speed: 100,
            num_bits: DEFAULT_COLUMN_LENGTH as u32,
            enable_depth: true,
            start_jitter_ms: 6000,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or defaults if the file does not exist.
    ///
    /// Legacy values are migrated and written back.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings = Self::from_toml(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if settings.migrate() {
            settings.save(path)?;
        }
        Ok(settings)
    }

    /// Write settings to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let write_error = |source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        // Write then rename so a watcher never reads a half-written file.
        let staged = path.with_extension("toml.tmp");
        fs::write(&staged, self.to_toml()?).map_err(write_error)?;
        fs::rename(&staged, path).map_err(write_error)?;
        Ok(())
    }

    /// Overwrite `path` with the default settings.
    pub fn reset_to_defaults(path: &Path) -> Result<Self, SettingsError> {
        let settings = Self::default();
        settings.save(path)?;
        info!(path = %path.display(), "settings reset to defaults");
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Rewrite the legacy `custom` character set id. Returns whether
    /// anything changed.
    pub fn migrate(&mut self) -> bool {
        if self.character_set.trim().eq_ignore_ascii_case(LEGACY_CUSTOM_ID) {
            warn!(
                from = %self.character_set,
                to = CharacterSet::CustomRandom.id(),
                "migrating legacy character set"
            );
            self.character_set = CharacterSet::CustomRandom.id().to_string();
            return true;
        }
        false
    }

    pub fn character_set(&self) -> Result<CharacterSet, ConfigError> {
        self.character_set.parse()
    }

    /// Switch to another character set, keeping the custom texts.
    pub fn set_character_set(&mut self, set: CharacterSet) {
        self.character_set = set.id().to_string();
    }

    /// Validate the settings and build the engine's configuration snapshot.
    pub fn rain_config(&self) -> Result<RainConfig, ConfigError> {
        let set = self.character_set()?;
        let text = match set {
            CharacterSet::Binary | CharacterSet::Matrix => {
                set.preset_symbols().unwrap_or_default()
            }
            CharacterSet::CustomRandom => self.custom_character_set.as_str(),
            CharacterSet::CustomExact | CharacterSet::CustomCycle => {
                self.custom_character_string.as_str()
            }
        };
        let alphabet = Alphabet::new(text, set.mode())?;

        if self.change_bit_speed == 0 {
            return Err(ConfigError::NonPositive {
                name: "change_bit_speed",
            });
        }

        let text_size = self.text_size as f32;
        let config = RainConfig {
            alphabet,
            column_length: self.num_bits as usize,
            glyph_color: self.bit_color,
            background: self.background_color,
            text_size,
            tick_interval: DEFAULT_TICK_INTERVAL * 100 / self.change_bit_speed,
            fall_speed: text_size * self.falling_speed as f32 / 100.0,
            depth_enabled: self.enable_depth,
            max_start_jitter: Duration::from_millis(self.start_jitter_ms),
        };
        config.validate()?;
        Ok(config)
    }
}
