use crate::{dsp::Waveform, engine::TrackId, project::Project};

/// Every user action the front end can take, as plain data.
///
/// The front end translates its own input events into these and hands them
/// to [`Session::apply`](super::Session::apply); nothing else mutates the
/// session.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddTrack,
    RemoveTrack(TrackId),
    Play(TrackId),
    Stop(TrackId),
    /// Play if stopped, stop if playing
    TogglePlay(TrackId),
    PlayAll,
    StopAll,
    SetWaveform(TrackId, Waveform),
    CycleWaveform(TrackId),
    SetVolume(TrackId, f64),
    SetFrequency(TrackId, f64),
    SetTrackTitle(TrackId, String),
    SetProjectTitle(String),
    /// Global offset in semitones from C4
    SetGlobalOffset(f64),
    /// A mapped piano key went down: set the offset and play everything
    KeyDown(i32),
    /// A mapped piano key came up: stop everything
    KeyUp,
    /// Replace all tracks with a loaded project
    Load(Project),
}
