//! The immutable rain configuration snapshot.

use std::time::Duration;

use rand::Rng;

use crate::{BINARY_CHARS, ConfigError, MATRIX_CHARS, Rgb};

/// Highest alpha a glyph is drawn with.
pub const MAX_ALPHA: u8 = 240;

/// Tick interval at 100% change speed.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound of the random delay before a column's first tick.
pub const DEFAULT_START_JITTER: Duration = Duration::from_millis(6000);

/// Glyphs per column in random mode.
pub const DEFAULT_COLUMN_LENGTH: usize = 12;

/// Most glyphs a column may hold.
pub const MAX_COLUMN_LENGTH: usize = 1024;

/// Base text size in surface units.
pub const DEFAULT_TEXT_SIZE: f32 = 16.0;

/// Advance width of a monospace glyph relative to its text size.
pub const GLYPH_ASPECT: f32 = 0.5;

/// How a column picks the glyph appended on each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GlyphMode {
    /// Append a uniformly random symbol.
    #[default]
    Random,
    /// Keep the literal text; ticks only move the column.
    Exact,
    /// Append the next symbol of the text, wrapping around.
    Cycle,
}

/// A non-empty set of symbols together with how they are consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
    mode: GlyphMode,
}

impl Alphabet {
    /// Build an alphabet from the characters of `text`.
    pub fn new(text: &str, mode: GlyphMode) -> Result<Self, ConfigError> {
        let symbols: Vec<char> = text.chars().collect();
        if symbols.is_empty() {
            return Err(ConfigError::EmptyCharacterSet);
        }
        Ok(Self { symbols, mode })
    }

    pub fn binary() -> Self {
        Self {
            symbols: BINARY_CHARS.chars().collect(),
            mode: GlyphMode::Random,
        }
    }

    pub fn matrix() -> Self {
        Self {
            symbols: MATRIX_CHARS.chars().collect(),
            mode: GlyphMode::Random,
        }
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn mode(&self) -> GlyphMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false; kept for the `len` convention.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The symbol at `index`, wrapping around the end of the set.
    pub fn symbol(&self, index: usize) -> char {
        self.symbols[index % self.symbols.len()]
    }

    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> char {
        self.symbols[rng.gen_range(0..self.symbols.len())]
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::binary()
    }
}

/// Everything a column needs to know about the effect.
///
/// Built once per settings change and shared read-only by every column.
#[derive(Debug, Clone, PartialEq)]
pub struct RainConfig {
    pub alphabet: Alphabet,
    /// Glyphs per column in random mode. Literal modes use the text length.
    pub column_length: usize,
    pub glyph_color: Rgb,
    pub background: Rgb,
    /// Base text size before the depth factor is applied.
    pub text_size: f32,
    pub tick_interval: Duration,
    /// Base distance a column falls per tick before the depth factor.
    pub fall_speed: f32,
    pub depth_enabled: bool,
    pub max_start_jitter: Duration,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self::new(Alphabet::default())
    }
}

impl RainConfig {
    pub fn new(alphabet: Alphabet) -> Self {
        Self {
            alphabet,
            column_length: DEFAULT_COLUMN_LENGTH,
            glyph_color: Rgb::PHOSPHOR,
            background: Rgb::BLACK,
            text_size: DEFAULT_TEXT_SIZE,
            tick_interval: DEFAULT_TICK_INTERVAL,
            fall_speed: DEFAULT_TEXT_SIZE,
            depth_enabled: true,
            max_start_jitter: DEFAULT_START_JITTER,
        }
    }

    /// Reject values the engine cannot animate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.alphabet.is_empty() {
            return Err(ConfigError::EmptyCharacterSet);
        }
        if self.length() == 0 {
            return Err(ConfigError::NonPositive {
                name: "column length",
            });
        }
        if self.length() > MAX_COLUMN_LENGTH {
            return Err(ConfigError::TooLarge {
                name: "column length",
                max: MAX_COLUMN_LENGTH,
            });
        }
        if self.text_size.is_nan() || self.text_size <= 0.0 {
            return Err(ConfigError::NonPositive { name: "text size" });
        }
        if !self.text_size.is_finite() {
            return Err(ConfigError::NotFinite { name: "text size" });
        }
        // NaN or negative speeds keep a column from ever reaching the bottom.
        if !self.fall_speed.is_finite() {
            return Err(ConfigError::NotFinite { name: "fall speed" });
        }
        if self.fall_speed < 0.0 {
            return Err(ConfigError::Negative { name: "fall speed" });
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::NonPositive {
                name: "tick interval",
            });
        }
        Ok(())
    }

    /// Effective number of glyphs per column.
    pub fn length(&self) -> usize {
        match self.alphabet.mode() {
            GlyphMode::Random => self.column_length,
            GlyphMode::Exact | GlyphMode::Cycle => self.alphabet.len(),
        }
    }

    /// Horizontal advance of one glyph at the base text size.
    pub fn glyph_width(&self) -> f32 {
        self.text_size * GLYPH_ASPECT
    }

    /// Alpha added per row; never zero so long columns still fade in.
    pub fn alpha_increment(&self) -> u8 {
        (MAX_ALPHA as usize / self.length().max(1)).max(1) as u8
    }

    /// Alpha of the `row`-th glyph from the top of a column.
    pub fn row_alpha(&self, row: usize) -> u8 {
        let alpha = self.alpha_increment() as usize * (row + 1);
        alpha.min(MAX_ALPHA as usize) as u8
    }
}
