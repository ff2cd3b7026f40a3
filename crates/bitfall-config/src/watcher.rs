//! Settings file watching.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, SystemTime};

use bitfall_core::ResetSignal;
use tracing::{debug, info, warn};

use crate::{Settings, SettingsError};

/// How often the settings file is checked for changes.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

type Update = Result<Settings, SettingsError>;

/// What identifies a version of the file: modification time and size.
type Stamp = Option<(SystemTime, u64)>;

/// Polls the settings file in a background thread.
///
/// When the file changes it is reloaded, the result is parked for the app to
/// [`take`](ConfigWatcher::take_update), and the reset signal is raised.
#[derive(Debug)]
pub struct ConfigWatcher {
    path: PathBuf,
    reset: ResetSignal,
    poll_interval: Duration,
    /// Latest reload not yet taken by the app.
    pending: Arc<RwLock<Option<Update>>>,
    /// Flag to signal thread termination.
    running: Arc<RwLock<bool>>,
}

impl ConfigWatcher {
    pub fn new(path: PathBuf, reset: ResetSignal) -> Self {
        Self {
            path,
            reset,
            poll_interval: POLL_INTERVAL,
            pending: Arc::new(RwLock::new(None)),
            running: Arc::new(RwLock::new(false)),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Start the polling thread.
    pub fn start(&self) {
        if let Ok(mut running) = self.running.write() {
            if *running {
                return;
            }
            *running = true;
        }

        let path = self.path.clone();
        let reset = self.reset.clone();
        let pending = self.pending.clone();
        let running = self.running.clone();
        let poll_interval = self.poll_interval;

        thread::spawn(move || {
            let mut last = stamp(&path);
            debug!(path = %path.display(), "watching settings file");

            loop {
                thread::sleep(poll_interval);

                if let Ok(is_running) = running.read()
                    && !*is_running
                {
                    break;
                }

                let current = stamp(&path);
                if current == last {
                    continue;
                }
                last = current;

                let update = Settings::load(&path);
                match &update {
                    Ok(_) => info!(path = %path.display(), "settings file changed"),
                    Err(err) => warn!(path = %path.display(), %err, "settings file is invalid"),
                }
                let loaded = update.is_ok();
                if let Ok(mut slot) = pending.write() {
                    *slot = Some(update);
                }
                if loaded {
                    reset.request();
                }
            }
        });
    }

    /// Stop the polling thread.
    pub fn stop(&self) {
        if let Ok(mut running) = self.running.write() {
            *running = false;
        }
    }

    /// Take the most recent reload, if there is one.
    pub fn take_update(&self) -> Option<Update> {
        self.pending.write().ok().and_then(|mut slot| slot.take())
    }
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn stamp(path: &Path) -> Stamp {
    let metadata = fs::metadata(path).ok()?;
    Some((metadata.modified().ok()?, metadata.len()))
}
