//! Light/dark theme state.
//!
//! A single [`ThemeContext`] is created at start-up from the persisted
//! preference and handed to every component that renders. Changing the
//! mode writes it back through the [`ThemeStorage`] and notifies all
//! subscribers; setting the mode it already has does neither.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use atelier_shared::ThemeMode;

use crate::error::{ClientError, Result};
use crate::events::{EventBus, Subscription, ThemeChanged};

/// Where the theme preference lives. The context calls it, never the
/// other way round.
pub trait ThemeStorage: Send + Sync {
    fn load(&self) -> Result<Option<ThemeMode>>;
    fn save(&self, mode: ThemeMode) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredPreference {
    theme: ThemeMode,
}

/// JSON file `{ "theme": "dark" }` in the platform config directory.
#[derive(Debug, Clone)]
pub struct FileThemeStorage {
    path: PathBuf,
}

impl FileThemeStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/atelier/theme.json`
    pub fn in_config_dir() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "atelier").ok_or(ClientError::NoConfigDir)?;
        Ok(Self::new(dirs.config_dir().join("theme.json")))
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl ThemeStorage for FileThemeStorage {
    fn load(&self) -> Result<Option<ThemeMode>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        let stored: StoredPreference = serde_json::from_str(&raw)?;
        Ok(Some(stored.theme))
    }

    fn save(&self, mode: ThemeMode) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(&StoredPreference { theme: mode })?;
        fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), %mode, "Theme preference saved");
        Ok(())
    }
}

/// Volatile storage, counting writes.
#[derive(Debug, Default)]
pub struct MemoryThemeStorage {
    value: Mutex<Option<ThemeMode>>,
    writes: Mutex<usize>,
}

impl MemoryThemeStorage {
    pub fn with_value(mode: ThemeMode) -> Self {
        Self {
            value: Mutex::new(Some(mode)),
            writes: Mutex::new(0),
        }
    }

    pub fn write_count(&self) -> usize {
        *lock(&self.writes)
    }
}

impl ThemeStorage for MemoryThemeStorage {
    fn load(&self) -> Result<Option<ThemeMode>> {
        Ok(*lock(&self.value))
    }

    fn save(&self, mode: ThemeMode) -> Result<()> {
        *lock(&self.value) = Some(mode);
        *lock(&self.writes) += 1;
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared theme state. Cloning yields another handle to the same state.
#[derive(Clone)]
pub struct ThemeContext {
    mode: Arc<Mutex<ThemeMode>>,
    storage: Arc<dyn ThemeStorage>,
    changes: EventBus<ThemeChanged>,
}

impl ThemeContext {
    /// Initialise from the stored preference, or `fallback` when nothing is
    /// stored or the stored value cannot be read.
    pub fn load(storage: Arc<dyn ThemeStorage>, fallback: ThemeMode) -> Self {
        let mode = match storage.load() {
            Ok(Some(mode)) => mode,
            Ok(None) => fallback,
            Err(e) => {
                warn!(error = %e, "Could not read theme preference, using default");
                fallback
            }
        };
        info!(%mode, "Theme initialised");

        Self {
            mode: Arc::new(Mutex::new(mode)),
            storage,
            changes: EventBus::new(),
        }
    }

    pub fn mode(&self) -> ThemeMode {
        *lock(&self.mode)
    }

    pub fn toggle(&self) -> ThemeMode {
        let next = self.mode().toggled();
        self.set_mode(next);
        next
    }

    /// Switch to `mode`. Returns `false` (and does nothing) when it is
    /// already active.
    pub fn set_mode(&self, mode: ThemeMode) -> bool {
        {
            let mut current = lock(&self.mode);
            if *current == mode {
                return false;
            }
            *current = mode;
        }

        // The in-memory change stands even when persisting fails.
        if let Err(e) = self.storage.save(mode) {
            warn!(error = %e, %mode, "Failed to persist theme preference");
        }

        debug!(%mode, "Theme changed");
        self.changes.publish(&ThemeChanged { mode });
        true
    }

    /// Called with the new mode after every effective change.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(ThemeMode) + Send + Sync + 'static,
    {
        self.changes.subscribe(move |event: &ThemeChanged| handler(event.mode))
    }

    pub fn subscriber_count(&self) -> usize {
        self.changes.listener_count()
    }
}

impl std::fmt::Debug for ThemeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeContext")
            .field("mode", &self.mode())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
