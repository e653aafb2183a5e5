use std::{env, path::PathBuf, time::Duration};

use crate::{keymap::KeyMap, project::TrackDescriptor};

pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(1);

/// Runtime settings. The binary starts from [`Config::default`] and applies
/// its command line and environment on top.
#[derive(Debug, Clone)]
pub struct Config {
    /// Holds the session slot and the log file
    pub state_dir: PathBuf,
    /// Where project files are saved
    pub project_dir: PathBuf,
    pub autosave_interval: Duration,
    pub keymap: KeyMap,
    /// Settings for newly added tracks; the title is generated
    pub default_track: TrackDescriptor,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            project_dir: PathBuf::from("."),
            autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
            keymap: KeyMap::default(),
            default_track: TrackDescriptor::default(),
        }
    }
}

fn default_state_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "freq")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| env::temp_dir().join("freq"))
}
