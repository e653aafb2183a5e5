use std::{io, path::PathBuf};

use thiserror::Error;

use crate::engine::TrackId;

/// Failure to read, write or validate a project.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("malformed project: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("track {index}: volume {volume} is outside 0..=1")]
    VolumeOutOfRange { index: usize, volume: f64 },

    #[error("track {index}: frequency {frequency} must be a positive number")]
    InvalidFrequency { index: usize, frequency: f64 },

    #[error("project has {count} tracks, at most {max} are supported")]
    TooManyTracks { count: usize, max: usize },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure to apply a command to the session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no track with id {0}")]
    UnknownTrack(TrackId),

    #[error("track limit of {0} reached")]
    TrackLimit(usize),

    #[error("frequency {0} must be a positive number")]
    InvalidFrequency(f64),

    #[error("volume {0} is not a number")]
    InvalidVolume(f64),

    #[error("audio engine is busy, try again")]
    EngineQueueFull,

    #[error(transparent)]
    Project(#[from] ProjectError),
}
