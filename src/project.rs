//! Project files: a titled, ordered list of track descriptors as JSON.
//!
//! ```json
//! {"projectTitle":"Beats","tracks":[
//!   {"title":"Track 1","waveform":"sine","volume":0.5,"frequency":440}
//! ]}
//! ```
//!
//! Volume and frequency are written as numbers but also read from numeric
//! strings, which is how older project files store them.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::{dsp::Waveform, error::ProjectError, MAX_TRACKS};

pub const FILE_EXTENSION: &str = "freq.json";

pub const DEFAULT_PROJECT_TITLE: &str = "Untitled";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub waveform: Waveform,
    #[serde(default = "default_volume", deserialize_with = "number_or_string")]
    pub volume: f64,
    #[serde(default = "default_frequency", deserialize_with = "number_or_string")]
    pub frequency: f64,
}

impl Default for TrackDescriptor {
    fn default() -> Self {
        Self {
            title: String::new(),
            waveform: Waveform::Sine,
            volume: default_volume(),
            frequency: default_frequency(),
        }
    }
}

impl TrackDescriptor {
    pub fn new(title: impl Into<String>, waveform: Waveform, volume: f64, frequency: f64) -> Self {
        Self {
            title: title.into(),
            waveform,
            volume,
            frequency,
        }
    }

    /// Check volume and frequency; `index` is only used in the error.
    pub fn validate(&self, index: usize) -> Result<(), ProjectError> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(ProjectError::VolumeOutOfRange {
                index,
                volume: self.volume,
            });
        }
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            return Err(ProjectError::InvalidFrequency {
                index,
                frequency: self.frequency,
            });
        }
        Ok(())
    }
}

fn default_volume() -> f64 {
    0.5
}

fn default_frequency() -> f64 {
    440.0
}

fn default_project_title() -> String {
    DEFAULT_PROJECT_TITLE.to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("expected a number, found {s:?}"))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default = "default_project_title")]
    pub project_title: String,
    pub tracks: Vec<TrackDescriptor>,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            project_title: default_project_title(),
            tracks: Vec::new(),
        }
    }
}

impl Project {
    pub fn new(project_title: impl Into<String>, tracks: Vec<TrackDescriptor>) -> Self {
        Self {
            project_title: project_title.into(),
            tracks,
        }
    }

    pub fn to_json(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate. Nothing is returned unless every track is valid.
    pub fn from_json(json: &str) -> Result<Self, ProjectError> {
        let project: Project = serde_json::from_str(json)?;
        project.validate()?;
        Ok(project)
    }

    pub fn validate(&self) -> Result<(), ProjectError> {
        if self.tracks.len() > MAX_TRACKS {
            return Err(ProjectError::TooManyTracks {
                count: self.tracks.len(),
                max: MAX_TRACKS,
            });
        }
        self.tracks
            .iter()
            .enumerate()
            .try_for_each(|(index, track)| track.validate(index))
    }

    /// `<projectTitle>.freq.json`, with path separators replaced so the
    /// file always lands in the directory it is saved to.
    pub fn file_name(&self) -> String {
        let stem: String = self
            .project_title
            .trim()
            .chars()
            .map(|c| match c {
                '/' | '\\' | '\0' => '_',
                c => c,
            })
            .collect();
        let stem = match stem.as_str() {
            "" | "." | ".." => "untitled",
            s => s,
        };
        format!("{stem}.{FILE_EXTENSION}")
    }

    /// Write to `dir/<file_name>` and return the path written.
    pub fn save_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ProjectError> {
        let path = dir.as_ref().join(self.file_name());
        let json = self.to_json()?;
        fs::write(&path, json).map_err(|source| ProjectError::Io {
            path: path.clone(),
            source,
        })?;
        log::info!("saved project '{}' to {}", self.project_title, path.display());
        Ok(path)
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let project = Self::from_json(&json)?;
        log::info!(
            "loaded project '{}' ({} tracks) from {}",
            project.project_title,
            project.tracks.len(),
            path.display()
        );
        Ok(project)
    }
}
