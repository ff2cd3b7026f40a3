mod cli;
mod logging;

use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;

use bitfall_config::{ConfigWatcher, Settings, default_config_path, log_dir};
use bitfall_core::ResetSignal;
use bitfall_rain::{BufferSurface, Field, Scheduler};
use clap::Parser;
use color_eyre::Result;
use crossterm::event::{
    self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use ratatui::layout::Rect;
use ratatui::{DefaultTerminal, Frame};
use tracing::{info, warn};

use crate::cli::Cli;

/// Event poll timeout while the rain is on screen, about 60 frames a second.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Event poll timeout while the rain is hidden.
const IDLE_INTERVAL: Duration = Duration::from_millis(250);

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    if cli.write_default_config {
        Settings::reset_to_defaults(&config_path)?;
        println!("wrote default settings to {}", config_path.display());
        return Ok(());
    }
    if cli.print_config {
        print!("{}", Settings::load(&config_path)?.to_toml()?);
        return Ok(());
    }

    let _guard = logging::init_logging(&log_dir())?;
    info!(config = %config_path.display(), "starting bitfall");

    let app = App::new(config_path, !cli.no_watch)?;

    let terminal = ratatui::init();
    execute!(stdout(), EnableFocusChange)?;
    let result = app.run(terminal);
    if let Err(err) = execute!(stdout(), DisableFocusChange) {
        warn!(%err, "failed to disable focus reporting");
    }
    ratatui::restore();
    result
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    /// Settings the field is currently configured with.
    settings: Settings,
    config_path: PathBuf,
    field: Field,
    watcher: Option<ConfigWatcher>,
    /// Terminal area the field was last sized for.
    area: Rect,
}

impl App {
    /// Load the settings and build an empty field.
    pub fn new(config_path: PathBuf, watch: bool) -> Result<Self> {
        let settings = Settings::load(&config_path)?;
        let config = settings.rain_config()?;
        let scheduler = Scheduler::spawn()?;
        let field = Field::new(config, scheduler, ResetSignal::new())?;

        let watcher = watch.then(|| {
            let watcher = ConfigWatcher::new(config_path.clone(), field.reset_signal().clone());
            watcher.start();
            watcher
        });

        Ok(Self {
            running: false,
            settings,
            config_path,
            field,
            watcher,
            area: Rect::default(),
        })
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        self.running = true;
        self.field.unpause();
        while self.running {
            self.apply_watched_update()?;
            if self.field.is_visible() {
                terminal.draw(|frame| self.render(frame))?;
            }
            self.handle_crossterm_events()?;
        }
        self.field.stop();
        if let Some(watcher) = &self.watcher {
            watcher.stop();
        }
        info!("bitfall stopped");
        Ok(())
    }

    /// Paints the rain over the whole frame.
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area != self.area {
            self.area = area;
            let (width, height) = BufferSurface::dimensions(area);
            self.field.set_screen_dimensions(width, height);
        }
        let mut surface = BufferSurface::new(frame.buffer_mut(), area);
        self.field.draw(Some(&mut surface));
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Polls with a timeout so frames keep coming without input.
    fn handle_crossterm_events(&mut self) -> Result<()> {
        let timeout = if self.field.is_visible() {
            FRAME_INTERVAL
        } else {
            IDLE_INTERVAL
        };
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key)?,
                Event::FocusLost => self.field.set_visible(false),
                Event::FocusGained => self.field.set_visible(true),
                // The next frame picks up the new area.
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) -> Result<()> {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char(' ')) => self.toggle_visible(),
            (_, KeyCode::Char('r')) => self.reload()?,
            (_, KeyCode::Char('d')) => self.toggle_depth()?,
            (_, KeyCode::Char('c')) => self.cycle_character_set()?,
            _ => {}
        }
        Ok(())
    }

    /// Apply a settings file change picked up by the watcher.
    fn apply_watched_update(&mut self) -> Result<()> {
        let Some(update) = self.watcher.as_ref().and_then(ConfigWatcher::take_update) else {
            return Ok(());
        };
        self.apply(update?)
    }

    /// Configure the field from `settings` and keep them as current.
    fn apply(&mut self, settings: Settings) -> Result<()> {
        self.field.configure(settings.rain_config()?)?;
        self.settings = settings;
        Ok(())
    }

    fn toggle_visible(&mut self) {
        self.field.set_visible(!self.field.is_visible());
    }

    /// Reload the settings file from disk.
    fn reload(&mut self) -> Result<()> {
        info!(path = %self.config_path.display(), "reloading settings");
        let settings = Settings::load(&self.config_path)?;
        self.apply(settings)
    }

    fn toggle_depth(&mut self) -> Result<()> {
        let mut settings = self.settings.clone();
        settings.enable_depth = !settings.enable_depth;
        self.apply(settings)
    }

    /// Switch between the binary and matrix presets.
    fn cycle_character_set(&mut self) -> Result<()> {
        let mut settings = self.settings.clone();
        let next = settings.character_set()?.next_preset();
        settings.set_character_set(next);
        self.apply(settings)
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}
