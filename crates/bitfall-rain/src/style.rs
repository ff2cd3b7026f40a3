//! Per-column depth-of-field styling.

use std::ops::RangeInclusive;

use bitfall_core::RainConfig;
use rand::Rng;

/// Range the depth factor is sampled from. 1.0 is nearest to the viewer.
pub const DEPTH_RANGE: RangeInclusive<f32> = 0.8..=1.0;

/// Factors above this are drawn sharp.
pub const SHARP_THRESHOLD: f32 = 0.93;

/// Factors from this up to [`SHARP_THRESHOLD`] are slightly blurred.
pub const SLIGHT_BLUR_THRESHOLD: f32 = 0.87;

/// How out of focus a column looks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlurLevel {
    #[default]
    None,
    Slight,
    Strong,
}

impl BlurLevel {
    pub fn from_factor(factor: f32) -> Self {
        if factor > SHARP_THRESHOLD {
            BlurLevel::None
        } else if factor >= SLIGHT_BLUR_THRESHOLD {
            BlurLevel::Slight
        } else {
            BlurLevel::Strong
        }
    }
}

/// Style of one column, sampled once per reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStyle {
    /// Depth factor in [`DEPTH_RANGE`], 1.0 when depth is disabled.
    pub depth: f32,
    pub text_size: f32,
    pub fall_speed: f32,
    pub blur: BlurLevel,
}

impl ColumnStyle {
    /// The undistorted style used when the depth effect is off.
    pub fn flat(config: &RainConfig) -> Self {
        Self {
            depth: 1.0,
            text_size: config.text_size,
            fall_speed: config.fall_speed,
            blur: BlurLevel::None,
        }
    }

    /// Style of a column at the given depth factor.
    ///
    /// Speed falls off with the fourth power so distant columns are both
    /// smaller and much slower.
    pub fn at_depth(config: &RainConfig, factor: f32) -> Self {
        Self {
            depth: factor,
            text_size: config.text_size * factor,
            fall_speed: config.fall_speed * factor.powi(4),
            blur: BlurLevel::from_factor(factor),
        }
    }

    pub fn sample<R: Rng + ?Sized>(config: &RainConfig, rng: &mut R) -> Self {
        if config.depth_enabled {
            Self::at_depth(config, rng.gen_range(DEPTH_RANGE))
        } else {
            Self::flat(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_blur_thresholds() {
        assert_eq!(BlurLevel::from_factor(1.0), BlurLevel::None);
        assert_eq!(BlurLevel::from_factor(0.931), BlurLevel::None);
        assert_eq!(BlurLevel::from_factor(0.93), BlurLevel::Slight);
        assert_eq!(BlurLevel::from_factor(0.9), BlurLevel::Slight);
        assert_eq!(BlurLevel::from_factor(0.87), BlurLevel::Slight);
        assert_eq!(BlurLevel::from_factor(0.869), BlurLevel::Strong);
        assert_eq!(BlurLevel::from_factor(0.8), BlurLevel::Strong);
    }

    #[test]
    fn test_flat_when_depth_disabled() {
        let config = RainConfig {
            depth_enabled: false,
            text_size: 20.0,
            fall_speed: 10.0,
            ..RainConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let style = ColumnStyle::sample(&config, &mut rng);
        assert_eq!(style, ColumnStyle::flat(&config));
        assert_eq!(style.text_size, 20.0);
        assert_eq!(style.fall_speed, 10.0);
        assert_eq!(style.blur, BlurLevel::None);
    }

    #[test]
    fn test_at_depth_scaling() {
        let config = RainConfig {
            text_size: 20.0,
            fall_speed: 10.0,
            ..RainConfig::default()
        };
        let style = ColumnStyle::at_depth(&config, 0.8);
        assert!((style.text_size - 16.0).abs() < 1e-4);
        assert!((style.fall_speed - 4.096).abs() < 1e-4);
        assert_eq!(style.blur, BlurLevel::Strong);
    }

    #[test]
    fn test_sampled_depth_is_in_range_and_seeded() {
        let config = RainConfig::default();
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);

        for _ in 0..500 {
            let style = ColumnStyle::sample(&config, &mut a);
            assert!(DEPTH_RANGE.contains(&style.depth));
            assert_eq!(style.blur, BlurLevel::from_factor(style.depth));
            assert_eq!(style, ColumnStyle::sample(&config, &mut b));
        }
    }
}
