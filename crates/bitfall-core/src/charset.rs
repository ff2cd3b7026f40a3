//! Character set presets and identifiers.

use std::fmt;
use std::str::FromStr;

use crate::{ConfigError, GlyphMode};

/// Symbols of the binary preset.
pub const BINARY_CHARS: &str = "01";

/// Symbols of the matrix preset (halfwidth katakana, one cell wide).
pub const MATRIX_CHARS: &str = "ｱｲｳｴｵｶｷｸｹｺｻｼｽｾｿﾀﾁﾂﾃﾄﾅﾆﾇﾈﾉﾊﾋﾌﾍﾎﾏﾐﾑﾒﾓﾔﾕﾖﾗﾘﾙﾚﾛﾜﾝ";

/// Identifier older settings files used for what is now `custom-random`.
pub const LEGACY_CUSTOM_ID: &str = "custom";

/// Which character set the rain draws from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CharacterSet {
    #[default]
    Binary,
    Matrix,
    /// Random symbols from a user supplied pool.
    CustomRandom,
    /// A user supplied literal text, displayed as is.
    CustomExact,
    /// A user supplied literal text, scrolled one symbol per tick.
    CustomCycle,
}

impl CharacterSet {
    pub const ALL: [CharacterSet; 5] = [
        CharacterSet::Binary,
        CharacterSet::Matrix,
        CharacterSet::CustomRandom,
        CharacterSet::CustomExact,
        CharacterSet::CustomCycle,
    ];

    /// The identifier used in settings files.
    pub fn id(self) -> &'static str {
        match self {
            CharacterSet::Binary => "binary",
            CharacterSet::Matrix => "matrix",
            CharacterSet::CustomRandom => "custom-random",
            CharacterSet::CustomExact => "custom-exact",
            CharacterSet::CustomCycle => "custom-cycle",
        }
    }

    /// Built-in symbols, `None` for the custom sets.
    pub fn preset_symbols(self) -> Option<&'static str> {
        match self {
            CharacterSet::Binary => Some(BINARY_CHARS),
            CharacterSet::Matrix => Some(MATRIX_CHARS),
            _ => None,
        }
    }

    pub fn mode(self) -> GlyphMode {
        match self {
            CharacterSet::Binary | CharacterSet::Matrix | CharacterSet::CustomRandom => {
                GlyphMode::Random
            }
            CharacterSet::CustomExact => GlyphMode::Exact,
            CharacterSet::CustomCycle => GlyphMode::Cycle,
        }
    }

    /// Cycle between the built-in presets.
    pub fn next_preset(self) -> Self {
        match self {
            CharacterSet::Binary => CharacterSet::Matrix,
            _ => CharacterSet::Binary,
        }
    }
}

impl fmt::Display for CharacterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CharacterSet {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().to_ascii_lowercase();
        if id == LEGACY_CUSTOM_ID {
            return Ok(CharacterSet::CustomRandom);
        }
        CharacterSet::ALL
            .into_iter()
            .find(|set| set.id() == id)
            .ok_or_else(|| ConfigError::UnknownCharacterSet(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ids() {
        for set in CharacterSet::ALL {
            assert_eq!(set.id().parse::<CharacterSet>(), Ok(set));
        }
        assert_eq!(" Matrix ".parse::<CharacterSet>(), Ok(CharacterSet::Matrix));
    }

    #[test]
    fn test_legacy_custom_maps_to_random_pool() {
        assert_eq!(
            LEGACY_CUSTOM_ID.parse::<CharacterSet>(),
            Ok(CharacterSet::CustomRandom)
        );
    }

    #[test]
    fn test_unknown_id_is_rejected() {
        assert_eq!(
            "hexadecimal".parse::<CharacterSet>(),
            Err(ConfigError::UnknownCharacterSet("hexadecimal".to_string()))
        );
    }

    #[test]
    fn test_modes() {
        assert_eq!(CharacterSet::Binary.mode(), GlyphMode::Random);
        assert_eq!(CharacterSet::CustomExact.mode(), GlyphMode::Exact);
        assert_eq!(CharacterSet::CustomCycle.mode(), GlyphMode::Cycle);
    }

    #[test]
    fn test_matrix_symbols_are_single_width() {
        assert_eq!(MATRIX_CHARS.chars().count(), 45);
        assert!(MATRIX_CHARS.chars().all(|c| ('\u{ff61}'..='\u{ff9f}').contains(&c)));
    }
}
