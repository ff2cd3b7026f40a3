//! Core types for the bitfall renderer.
//!
//! Shared by the engine, the settings layer and the terminal front end:
//! colors, character sets, the immutable [`RainConfig`] snapshot and the
//! [`ResetSignal`] used to request a full rebuild.

mod charset;
mod color;
mod config;
mod error;
mod signal;

pub use charset::{BINARY_CHARS, CharacterSet, LEGACY_CUSTOM_ID, MATRIX_CHARS};
pub use color::Rgb;
pub use config::{
    Alphabet, DEFAULT_COLUMN_LENGTH, DEFAULT_START_JITTER, DEFAULT_TEXT_SIZE,
    DEFAULT_TICK_INTERVAL, GLYPH_ASPECT, GlyphMode, MAX_ALPHA, MAX_COLUMN_LENGTH, RainConfig,
};
pub use error::ConfigError;
pub use signal::ResetSignal;
