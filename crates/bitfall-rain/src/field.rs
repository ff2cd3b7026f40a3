//! The field controller: every column on screen.

use std::sync::Arc;

use bitfall_core::{ConfigError, RainConfig, ResetSignal};
use tracing::{debug, info};

use crate::column::Column;
use crate::scheduler::Scheduler;
use crate::surface::Surface;

/// Columns per glyph width; above 1 so neighbouring columns overlap.
pub const COLUMN_DENSITY: f32 = 1.5;

/// All columns spanning the screen, plus the repaint state.
#[derive(Debug)]
pub struct Field {
    config: Arc<RainConfig>,
    columns: Vec<Column>,
    scheduler: Scheduler,
    reset: ResetSignal,
    width: f32,
    height: f32,
    visible: bool,
    running: bool,
}

impl Field {
    /// Create an empty field. Columns appear once the screen size is known.
    pub fn new(
        config: RainConfig,
        scheduler: Scheduler,
        reset: ResetSignal,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            columns: Vec::new(),
            scheduler,
            reset,
            width: 0.0,
            height: 0.0,
            visible: true,
            running: false,
        })
    }

    /// Install a new configuration; the next frame rebuilds every column.
    pub fn configure(&mut self, config: RainConfig) -> Result<(), ConfigError> {
        config.validate()?;
        info!(
            charset_len = config.alphabet.len(),
            mode = ?config.alphabet.mode(),
            length = config.length(),
            depth = config.depth_enabled,
            "rain configuration changed"
        );
        self.config = Arc::new(config);
        self.reset.request();
        Ok(())
    }

    /// Resize the field, keeping existing columns where possible.
    pub fn set_screen_dimensions(&mut self, width: f32, height: f32) {
        debug!(width, height, "screen dimensions changed");
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.rebuild(false);
    }

    /// Resume or pause everything as the field becomes visible or hidden.
    pub fn set_visible(&mut self, visible: bool) {
        if visible {
            self.visible = true;
            self.unpause();
        } else {
            self.pause();
            self.visible = false;
        }
    }

    /// Paint one frame.
    ///
    /// Consumes a pending reset first. Returns `false` when the frame was
    /// skipped: the field is hidden, there is no surface, or the screen has
    /// no area.
    pub fn draw<S: Surface + ?Sized>(&mut self, surface: Option<&mut S>) -> bool {
        if !self.visible {
            self.pause();
            return false;
        }
        if self.reset.take() {
            self.rebuild(true);
        }

        let Some(surface) = surface else {
            debug!("surface unavailable, skipping frame");
            return false;
        };
        if self.width <= 0.0 || self.height <= 0.0 {
            return false;
        }

        surface.clear(self.config.background);
        for column in &self.columns {
            column.draw(&mut *surface);
        }
        true
    }

    /// Resume every column and the repaint loop.
    pub fn unpause(&mut self) {
        self.running = true;
        for column in &mut self.columns {
            column.unpause();
        }
    }

    /// Pause every column and the repaint loop.
    pub fn pause(&mut self) {
        self.running = false;
        for column in &mut self.columns {
            column.pause();
        }
    }

    /// Stop every column ahead of a rebuild or shutdown.
    pub fn stop(&mut self) {
        self.running = false;
        for column in &mut self.columns {
            column.stop();
        }
    }

    /// Whether the host should keep scheduling frames.
    pub fn is_running(&self) -> bool {
        self.running && self.visible
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn config(&self) -> &RainConfig {
        &self.config
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn reset_signal(&self) -> &ResetSignal {
        &self.reset
    }

    /// Number of columns that fit the current width.
    pub fn column_count(&self) -> usize {
        (COLUMN_DENSITY * self.width / self.config.glyph_width()) as usize
    }

    fn column_x(&self, index: usize) -> f32 {
        (index as f32 * self.config.glyph_width() / COLUMN_DENSITY).floor()
    }

    fn rebuild(&mut self, clear_all: bool) {
        self.stop();

        let count = self.column_count();
        if clear_all {
            self.columns.clear();
        } else {
            self.columns.truncate(count);
        }
        for column in &self.columns {
            column.set_screen_height(self.height);
        }
        for index in self.columns.len()..count {
            let column = Column::new(
                self.column_x(index),
                Arc::clone(&self.config),
                self.height,
                self.scheduler.clone(),
            );
            self.columns.push(column);
        }

        info!(columns = count, clear_all, "field rebuilt");
        if self.visible {
            self.unpause();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bitfall_core::{Alphabet, GlyphMode, Rgb};

    use super::*;
    use crate::surface::GlyphPaint;

    #[derive(Default)]
    struct Recorder {
        clears: Vec<Rgb>,
        glyphs: usize,
    }

    impl Surface for Recorder {
        fn clear(&mut self, color: Rgb) {
            self.clears.push(color);
        }

        fn draw_glyph(&mut self, _glyph: char, _x: f32, _y: f32, _paint: &GlyphPaint) {
            self.glyphs += 1;
        }
    }

    fn slow_config() -> RainConfig {
        // Long intervals keep the timers quiet during the test.
        RainConfig {
            tick_interval: Duration::from_secs(60),
            max_start_jitter: Duration::from_secs(60),
            column_length: 4,
            ..RainConfig::default()
        }
    }

    fn field(config: RainConfig) -> Field {
        Field::new(config, Scheduler::spawn().unwrap(), ResetSignal::new()).unwrap()
    }

    #[test]
    fn test_column_count_follows_width() {
        let mut field = field(slow_config());
        // Glyph width is 16 * 0.5 = 8 units.
        field.set_screen_dimensions(80.0, 100.0);
        assert_eq!(field.columns().len(), 15);

        let xs: Vec<f32> = field.columns().iter().map(|c| c.state().x()).collect();
        assert_eq!(&xs[..4], &[0.0, 5.0, 10.0, 16.0]);

        field.set_screen_dimensions(40.0, 100.0);
        assert_eq!(field.columns().len(), 7);

        field.set_screen_dimensions(0.0, 100.0);
        assert!(field.columns().is_empty());
    }

    fn placements(field: &Field) -> Vec<(f32, f32)> {
        field
            .columns()
            .iter()
            .map(|column| {
                let state = column.state();
                (state.x(), state.style().depth)
            })
            .collect()
    }

    #[test]
    fn test_resize_keeps_leading_columns() {
        let mut field = field(slow_config());
        field.set_screen_dimensions(80.0, 100.0);
        let before = placements(&field);

        // Depth is only resampled on reset, which a single tick cannot reach.
        field.set_screen_dimensions(40.0, 200.0);
        let after = placements(&field);
        assert_eq!(&before[..7], &after[..]);
    }

    #[test]
    fn test_new_columns_start_desynchronized() {
        let mut field = field(RainConfig {
            tick_interval: Duration::from_millis(1),
            max_start_jitter: Duration::from_millis(6_000),
            ..RainConfig::default()
        });
        field.set_screen_dimensions(800.0, 1_000_000.0);
        let start: Vec<f32> = field.columns().iter().map(|c| c.state().y()).collect();
        assert_eq!(start.len(), 150);

        std::thread::sleep(Duration::from_millis(100));
        let moved = field
            .columns()
            .iter()
            .zip(&start)
            .filter(|(column, y)| column.state().y() != **y)
            .count();
        // About one in sixty columns draws a jitter under 100ms.
        assert!(moved < start.len() / 2, "{moved} of {} columns moved", start.len());
        field.stop();
    }

    #[test]
    fn test_draw_clears_then_draws_columns() {
        let mut field = field(RainConfig {
            background: Rgb::new(5, 5, 5),
            ..slow_config()
        });
        field.set_screen_dimensions(16.0, 100.0);
        let mut surface = Recorder::default();

        assert!(field.draw(Some(&mut surface)));
        assert_eq!(surface.clears, vec![Rgb::new(5, 5, 5)]);
        assert_eq!(surface.glyphs, field.columns().len() * 4);
        assert!(field.is_running());
    }

    #[test]
    fn test_frames_are_skipped() {
        let mut field = field(slow_config());
        let mut surface = Recorder::default();

        // No screen size yet.
        assert!(!field.draw(Some(&mut surface)));

        field.set_screen_dimensions(16.0, 100.0);
        assert!(!field.draw(None::<&mut Recorder>));

        field.set_visible(false);
        assert!(!field.draw(Some(&mut surface)));
        assert!(!field.is_running());
        assert!(field.columns().iter().all(Column::is_paused));
        assert!(surface.clears.is_empty());
    }

    #[test]
    fn test_visibility_pauses_and_resumes_columns() {
        let mut field = field(slow_config());
        field.set_screen_dimensions(32.0, 100.0);
        assert!(field.columns().iter().all(|c| !c.is_paused()));

        field.set_visible(false);
        assert!(field.columns().iter().all(Column::is_paused));

        field.set_visible(true);
        assert!(field.is_running());
        assert!(field.columns().iter().all(|c| !c.is_paused()));

        field.stop();
        assert!(!field.is_running());
        assert!(field.columns().iter().all(Column::is_paused));
    }

    #[test]
    fn test_configure_resets_once_on_next_frame() {
        let mut field = field(slow_config());
        field.set_screen_dimensions(32.0, 100.0);
        assert_eq!(field.columns()[0].state().len(), 4);

        let exact = RainConfig {
            alphabet: Alphabet::new("wake up", GlyphMode::Exact).unwrap(),
            ..slow_config()
        };
        field.configure(exact).unwrap();
        assert!(field.reset_signal().is_requested());
        // Columns are rebuilt lazily by the render loop.
        assert_eq!(field.columns()[0].state().len(), 4);

        let mut surface = Recorder::default();
        assert!(field.draw(Some(&mut surface)));
        assert!(!field.reset_signal().is_requested());
        assert!(field.columns().iter().all(|c| c.state().len() == 7));
    }

    #[test]
    fn test_external_reset_request_rebuilds() {
        let signal = ResetSignal::new();
        let config = RainConfig {
            alphabet: Alphabet::matrix(),
            ..slow_config()
        };
        let mut field = Field::new(config, Scheduler::spawn().unwrap(), signal.clone()).unwrap();
        field.set_screen_dimensions(32.0, 100.0);
        let before: Vec<String> = field
            .columns()
            .iter()
            .map(|c| c.state().glyphs().collect())
            .collect();

        signal.request();
        let mut surface = Recorder::default();
        field.draw(Some(&mut surface));
        assert!(!signal.is_requested());

        let after: Vec<String> = field
            .columns()
            .iter()
            .map(|c| c.state().glyphs().collect())
            .collect();
        assert_eq!(before.len(), after.len());
        assert_ne!(before, after);
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        let mut field = field(slow_config());
        let result = field.configure(RainConfig {
            text_size: 0.0,
            ..slow_config()
        });
        assert!(result.is_err());
        assert!(!field.reset_signal().is_requested());
    }
}
