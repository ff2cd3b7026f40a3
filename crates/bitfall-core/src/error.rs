use thiserror::Error;

/// Invalid rain configuration.
///
/// Every variant is fatal: the renderer refuses to start with it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("character set length can't be 0")]
    EmptyCharacterSet,

    #[error("invalid character set {0:?}")]
    UnknownCharacterSet(String),

    #[error("invalid color {0:?}, expected #rrggbb")]
    InvalidColor(String),

    #[error("{name} must be greater than zero")]
    NonPositive { name: &'static str },

    #[error("{name} can't be negative")]
    Negative { name: &'static str },

    #[error("{name} must be a finite number")]
    NotFinite { name: &'static str },

    #[error("{name} can't exceed {max}")]
    TooLarge { name: &'static str, max: usize },
}
