//! A single falling column of glyphs.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bitfall_core::{GlyphMode, RainConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::scheduler::{Schedule, Scheduler, TaskHandle};
use crate::style::ColumnStyle;
use crate::surface::{GlyphPaint, Surface};

/// Result of advancing a column by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The column moved down and is still on screen.
    Fell,
    /// The column passed the bottom and respawned above the screen; its
    /// timer should restart after `delay`.
    Reset { delay: Duration },
}

/// Animation state of one column.
///
/// The glyph buffer holds the oldest glyph at the front. Its length is fixed
/// when the state is created and never changes.
#[derive(Debug)]
pub struct ColumnState {
    glyphs: VecDeque<char>,
    x: f32,
    y: f32,
    style: ColumnStyle,
    config: Arc<RainConfig>,
    screen_height: f32,
    /// Index of the symbol at the bottom of the column in cycling mode.
    cursor: usize,
    rng: StdRng,
}

impl ColumnState {
    /// Fill a new column and place it above the screen.
    pub fn new(x: f32, config: Arc<RainConfig>, screen_height: f32, mut rng: StdRng) -> Self {
        let alphabet = &config.alphabet;
        let length = config.length();
        let mut glyphs = VecDeque::with_capacity(length);
        match alphabet.mode() {
            GlyphMode::Random => glyphs.extend((0..length).map(|_| alphabet.random(&mut rng))),
            // Literal text starts at the bottom row and reads upwards.
            GlyphMode::Exact | GlyphMode::Cycle => {
                for index in 0..length {
                    glyphs.push_front(alphabet.symbol(index));
                }
            }
        }

        let mut state = Self {
            glyphs,
            x,
            y: 0.0,
            style: ColumnStyle::flat(&config),
            config,
            screen_height,
            cursor: 0,
            rng,
        };
        state.reset();
        state
    }

    /// Drop the oldest glyph, append a new one and fall by one step.
    pub fn tick(&mut self) -> Tick {
        let alphabet = &self.config.alphabet;
        match alphabet.mode() {
            GlyphMode::Random => {
                self.glyphs.pop_front();
                self.glyphs.push_back(alphabet.random(&mut self.rng));
            }
            GlyphMode::Cycle => {
                self.cursor = (self.cursor + alphabet.len() - 1) % alphabet.len();
                self.glyphs.pop_front();
                self.glyphs.push_back(alphabet.symbol(self.cursor));
            }
            GlyphMode::Exact => {}
        }

        self.y += self.style.fall_speed;
        if self.y > self.screen_height {
            Tick::Reset {
                delay: self.reset(),
            }
        } else {
            Tick::Fell
        }
    }

    /// Respawn above the screen with a freshly sampled style.
    ///
    /// Returns the random delay the column's timer should restart with.
    pub fn reset(&mut self) -> Duration {
        self.style = ColumnStyle::sample(&self.config, &mut self.rng);
        self.y = self.initial_y();
        self.start_jitter()
    }

    /// Delay before ticking again after a pause.
    ///
    /// Columns sitting at their spawn point or already below the screen
    /// resume at once; columns mid-fall wait a random jitter.
    pub fn resume_delay(&mut self) -> Duration {
        let near_top = self.y <= self.initial_y() + self.style.text_size;
        if near_top || self.y > self.screen_height {
            Duration::ZERO
        } else {
            self.start_jitter()
        }
    }

    /// Draw every glyph top to bottom, fading in towards the newest.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        let mut paint = GlyphPaint {
            color: self.config.glyph_color,
            alpha: 0,
            text_size: self.style.text_size,
            blur: self.style.blur,
        };
        let mut y = self.y;
        for (row, &glyph) in self.glyphs.iter().enumerate() {
            paint.alpha = self.config.row_alpha(row);
            surface.draw_glyph(glyph, self.x, y, &paint);
            y += self.style.text_size;
        }
    }

    pub fn set_screen_height(&mut self, height: f32) {
        self.screen_height = height;
    }

    pub fn glyphs(&self) -> impl ExactSizeIterator<Item = char> + '_ {
        self.glyphs.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn style(&self) -> &ColumnStyle {
        &self.style
    }

    /// Spawn height for the current text size, one full column above the top.
    fn initial_y(&self) -> f32 {
        -(self.style.text_size * self.glyphs.len() as f32)
    }

    fn start_jitter(&mut self) -> Duration {
        let max = self.config.max_start_jitter.as_millis() as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.rng.gen_range(0..max))
    }
}

/// A column together with its recurring mutation timer.
///
/// The state sits behind a mutex shared with the timer job, so a tick and a
/// draw never interleave.
#[derive(Debug)]
pub struct Column {
    state: Arc<Mutex<ColumnState>>,
    scheduler: Scheduler,
    task: Option<TaskHandle>,
    /// Spawn jitter for the next start, set when the column (re)spawns
    /// while paused.
    pending_delay: Option<Duration>,
}

impl Column {
    /// Create a paused column; call [`Column::unpause`] to start it.
    pub fn new(x: f32, config: Arc<RainConfig>, screen_height: f32, scheduler: Scheduler) -> Self {
        Self::with_rng(x, config, screen_height, scheduler, StdRng::from_entropy())
    }

    pub fn with_rng(
        x: f32,
        config: Arc<RainConfig>,
        screen_height: f32,
        scheduler: Scheduler,
        rng: StdRng,
    ) -> Self {
        let mut state = ColumnState::new(x, config, screen_height, rng);
        let pending_delay = Some(state.start_jitter());
        Self {
            state: Arc::new(Mutex::new(state)),
            scheduler,
            task: None,
            pending_delay,
        }
    }

    /// Advance one tick by hand, outside the timer.
    pub fn tick(&self) -> Tick {
        self.lock().tick()
    }

    /// Respawn above the screen. A running column restarts its timer after
    /// fresh jitter; a paused one keeps the jitter for its next start.
    pub fn reset(&mut self) {
        let running = self.task.is_some();
        self.pause();
        let delay = self.lock().reset();
        self.pending_delay = Some(delay);
        if running {
            self.unpause();
        }
    }

    /// Cancel the timer. Returns once no tick is in flight.
    pub fn pause(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.cancel();
        }
    }

    /// Stop ticking ahead of a rebuild.
    pub fn stop(&mut self) {
        self.pause();
    }

    /// Start or restart the timer if paused.
    ///
    /// A freshly spawned column waits out its spawn jitter; otherwise the
    /// resume rule of [`ColumnState::resume_delay`] applies.
    pub fn unpause(&mut self) {
        if self.task.is_some() {
            return;
        }
        let delay = match self.pending_delay.take() {
            Some(delay) => delay,
            None => self.lock().resume_delay(),
        };
        self.schedule(delay);
    }

    pub fn is_paused(&self) -> bool {
        self.task.is_none()
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        self.lock().draw(surface);
    }

    pub fn set_screen_height(&self, height: f32) {
        self.lock().set_screen_height(height);
    }

    /// Lock the state for inspection.
    pub fn state(&self) -> MutexGuard<'_, ColumnState> {
        self.lock()
    }

    fn schedule(&mut self, delay: Duration) {
        let interval = self.lock().config.tick_interval;
        let state = Arc::clone(&self.state);
        trace!(?delay, ?interval, "column timer scheduled");
        self.task = Some(self.scheduler.schedule(delay, interval, move || {
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            match state.tick() {
                Tick::Fell => Schedule::Continue,
                Tick::Reset { delay } => Schedule::Restart(delay),
            }
        }));
    }

    fn lock(&self) -> MutexGuard<'_, ColumnState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
