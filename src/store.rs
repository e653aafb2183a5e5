//! Session slot and autosave.
//!
//! The slot is a single JSON file holding the last autosaved project. It is
//! overwritten on every autosave tick and read once at startup to bring back
//! the previous session. A missing or unreadable slot just means there was
//! no previous session.

use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use crate::{engine::MessageSender, error::ProjectError, project::Project, session::Session};

pub const SLOT_FILE_NAME: &str = "freq.json";

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Slot at `dir/freq.json`. The directory is created on first save.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SLOT_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the slot. Written to a sibling temp file first and renamed
    /// into place, so the slot is never left half-written.
    pub fn save(&self, project: &Project) -> Result<(), ProjectError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| ProjectError::Io { path, source }
        };

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(io_err(dir))?;
        }
        let json = project.to_json()?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err(&tmp))?;
        fs::rename(&tmp, &self.path).map_err(io_err(&self.path))?;
        Ok(())
    }

    /// Like `save` but logs a warning on failure rather than returning an error value.
    pub fn save_or_warn(&self, project: &Project) {
        if let Err(e) = self.save(project) {
            log::warn!("failed to autosave to {}: {}", self.path.display(), e);
        }
    }

    /// `Ok(None)` when the slot does not exist yet.
    pub fn load(&self) -> Result<Option<Project>, ProjectError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ProjectError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        Project::from_json(&json).map(Some)
    }

    /// The previous session, if any. A corrupt slot is logged and treated
    /// as absent.
    pub fn restore(&self) -> Option<Project> {
        match self.load() {
            Ok(project) => project,
            Err(e) => {
                log::warn!(
                    "ignoring unreadable session slot {}: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }
}

/// Fixed-interval autosave timer.
///
/// Owned by the UI loop and polled with the current time; it never spawns a
/// thread. Missed ticks are not replayed: after a save the next one is due a
/// full interval later.
#[derive(Debug, Clone)]
pub struct Autosave {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Autosave {
    /// A stopped timer; call [`Autosave::start`] to arm it.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arm the timer; the first save is due one interval after `now`.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Time left until the next save, zero if overdue, `None` when stopped.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }

    /// True if a save is due at `now`; schedules the following one.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    /// Snapshot `session` into `store` if a save is due. Returns whether it saved.
    pub fn tick<S: MessageSender>(
        &mut self,
        now: Instant,
        session: &Session<S>,
        store: &SessionStore,
    ) -> bool {
        if !self.poll(now) {
            return false;
        }
        store.save_or_warn(&session.snapshot());
        true
    }
}
