//! Session - the UI-thread model of the open project
//!
//! Holds what the user sees (project title, ordered tracks, global offset)
//! and mirrors every change to the audio thread as [`EngineMessage`]s. The
//! engine owns the oscillators; the session only records whether each track
//! should be playing, so everything here runs without an audio device.

mod command;

pub use command::Command;

use crate::{
    dsp::Waveform,
    engine::{EngineMessage, MessageSender, ToneParams, TrackId},
    error::SessionError,
    pitch,
    project::{Project, TrackDescriptor, DEFAULT_PROJECT_TITLE},
    MAX_TRACKS,
};

/// A live track as shown on screen
#[derive(Debug, Clone, PartialEq)]
pub struct TrackState {
    pub id: TrackId,
    pub title: String,
    pub waveform: Waveform,
    /// Linear gain, 0.0-1.0
    pub volume: f64,
    /// Base frequency in Hz
    pub frequency: f64,
    pub playing: bool,
}

impl TrackState {
    pub fn descriptor(&self) -> TrackDescriptor {
        TrackDescriptor::new(self.title.clone(), self.waveform, self.volume, self.frequency)
    }

    fn tone_params(&self) -> ToneParams {
        ToneParams {
            waveform: self.waveform,
            volume: self.volume as f32,
            frequency: self.frequency,
        }
    }
}

pub struct Session<S> {
    tx: S,
    project_title: String,
    tracks: Vec<TrackState>,
    next_id: u32,
    /// Semitones from C4
    global_offset: f64,
    default_track: TrackDescriptor,
}

impl<S: MessageSender> Session<S> {
    pub fn new(tx: S) -> Self {
        Self {
            tx,
            project_title: DEFAULT_PROJECT_TITLE.to_string(),
            tracks: Vec::new(),
            next_id: 0,
            global_offset: 0.0,
            default_track: TrackDescriptor::default(),
        }
    }

    /// Settings used by [`Session::add_track`]; the title is ignored.
    pub fn with_default_track(mut self, default_track: TrackDescriptor) -> Self {
        self.default_track = default_track;
        self
    }

    pub fn project_title(&self) -> &str {
        &self.project_title
    }

    pub fn tracks(&self) -> &[TrackState] {
        &self.tracks
    }

    pub fn track(&self, id: TrackId) -> Option<&TrackState> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Position of a track in on-screen order
    pub fn position(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    pub fn any_playing(&self) -> bool {
        self.tracks.iter().any(|t| t.playing)
    }

    /// Global offset in semitones
    pub fn global_offset(&self) -> f64 {
        self.global_offset
    }

    /// Global offset as the hertz delta added to every track
    pub fn global_offset_hz(&self) -> f64 {
        pitch::offset_hz_or_zero(self.global_offset)
    }

    pub fn sender(&self) -> &S {
        &self.tx
    }

    pub fn sender_mut(&mut self) -> &mut S {
        &mut self.tx
    }

    /// Map one user action onto the session.
    pub fn apply(&mut self, command: Command) -> Result<(), SessionError> {
        match command {
            Command::AddTrack => self.add_track().map(|_| ()),
            Command::RemoveTrack(id) => self.remove_track(id),
            Command::Play(id) => self.play(id),
            Command::Stop(id) => self.stop(id),
            Command::TogglePlay(id) => {
                if self.track_ref(id)?.playing {
                    self.stop(id)
                } else {
                    self.play(id)
                }
            }
            Command::PlayAll => {
                self.play_all();
                Ok(())
            }
            Command::StopAll => {
                self.stop_all();
                Ok(())
            }
            Command::SetWaveform(id, waveform) => self.set_waveform(id, waveform),
            Command::CycleWaveform(id) => {
                let next = self.track_ref(id)?.waveform.next();
                self.set_waveform(id, next)
            }
            Command::SetVolume(id, volume) => self.set_volume(id, volume),
            Command::SetFrequency(id, frequency) => self.set_frequency(id, frequency),
            Command::SetTrackTitle(id, title) => self.set_track_title(id, title),
            Command::SetProjectTitle(title) => {
                self.set_project_title(title);
                Ok(())
            }
            Command::SetGlobalOffset(semitones) => self.set_global_offset(semitones),
            Command::KeyDown(offset) => self.key_down(offset),
            Command::KeyUp => {
                self.key_up();
                Ok(())
            }
            Command::Load(project) => self.load(project),
        }
    }

    /// Add a stopped track with the default settings, titled `Track N`.
    pub fn add_track(&mut self) -> Result<TrackId, SessionError> {
        let mut descriptor = self.default_track.clone();
        descriptor.title = format!("Track {}", self.tracks.len() + 1);
        self.add_track_with(descriptor)
    }

    /// Add a stopped track from a descriptor, keeping its title.
    pub fn add_track_with(&mut self, descriptor: TrackDescriptor) -> Result<TrackId, SessionError> {
        if self.tracks.len() >= MAX_TRACKS {
            return Err(SessionError::TrackLimit(MAX_TRACKS));
        }
        descriptor.validate(self.tracks.len())?;
        self.insert(descriptor)
    }

    pub fn remove_track(&mut self, id: TrackId) -> Result<(), SessionError> {
        let idx = self.position(id).ok_or(SessionError::UnknownTrack(id))?;
        self.send(EngineMessage::Remove { id })?;
        let track = self.tracks.remove(idx);
        log::debug!("removed track {} '{}'", id, track.title);
        Ok(())
    }

    pub fn play(&mut self, id: TrackId) -> Result<(), SessionError> {
        self.track_ref(id)?;
        self.send(EngineMessage::Play { id })?;
        self.track_mut(id)?.playing = true;
        Ok(())
    }

    pub fn stop(&mut self, id: TrackId) -> Result<(), SessionError> {
        self.track_ref(id)?;
        self.send(EngineMessage::Stop { id })?;
        self.track_mut(id)?.playing = false;
        Ok(())
    }

    pub fn play_all(&mut self) {
        let ids: Vec<TrackId> = self.tracks.iter().map(|t| t.id).collect();
        for id in ids {
            let _ = self.play(id);
        }
    }

    pub fn stop_all(&mut self) {
        let ids: Vec<TrackId> = self.tracks.iter().map(|t| t.id).collect();
        for id in ids {
            let _ = self.stop(id);
        }
    }

    pub fn set_waveform(&mut self, id: TrackId, waveform: Waveform) -> Result<(), SessionError> {
        self.track_ref(id)?;
        self.send(EngineMessage::SetWaveform { id, waveform })?;
        self.track_mut(id)?.waveform = waveform;
        Ok(())
    }

    /// Set volume, clamped to 0.0-1.0. NaN is rejected.
    pub fn set_volume(&mut self, id: TrackId, volume: f64) -> Result<(), SessionError> {
        if volume.is_nan() {
            return Err(SessionError::InvalidVolume(volume));
        }
        let volume = volume.clamp(0.0, 1.0);
        self.track_ref(id)?;
        self.send(EngineMessage::SetVolume {
            id,
            volume: volume as f32,
        })?;
        self.track_mut(id)?.volume = volume;
        Ok(())
    }

    /// Set base frequency. Must be finite and above zero.
    pub fn set_frequency(&mut self, id: TrackId, frequency: f64) -> Result<(), SessionError> {
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(SessionError::InvalidFrequency(frequency));
        }
        self.track_ref(id)?;
        self.send(EngineMessage::SetFrequency { id, frequency })?;
        self.track_mut(id)?.frequency = frequency;
        Ok(())
    }

    pub fn set_track_title(&mut self, id: TrackId, title: impl Into<String>) -> Result<(), SessionError> {
        self.track_mut(id)?.title = title.into();
        Ok(())
    }

    pub fn set_project_title(&mut self, title: impl Into<String>) {
        self.project_title = title.into();
    }

    /// Set the global offset in semitones. NaN counts as no offset.
    pub fn set_global_offset(&mut self, semitones: f64) -> Result<(), SessionError> {
        let semitones = if semitones.is_nan() { 0.0 } else { semitones };
        let hz = pitch::offset_hz_or_zero(semitones);
        self.send(EngineMessage::SetOffset { hz })?;
        self.global_offset = semitones;
        Ok(())
    }

    pub fn key_down(&mut self, offset: i32) -> Result<(), SessionError> {
        self.set_global_offset(offset as f64)?;
        self.play_all();
        Ok(())
    }

    pub fn key_up(&mut self) {
        self.stop_all();
    }

    /// Current state as a saveable project, tracks in on-screen order.
    pub fn snapshot(&self) -> Project {
        Project::new(
            self.project_title.clone(),
            self.tracks.iter().map(TrackState::descriptor).collect(),
        )
    }

    /// Replace every track with the project's.
    ///
    /// The project is validated first; on a validation error, or if the
    /// engine cannot take the `Clear`, the session is untouched. If the
    /// queue fills while inserting, the tracks queued so far are kept.
    pub fn load(&mut self, project: Project) -> Result<(), SessionError> {
        project.validate()?;

        self.send(EngineMessage::Clear)?;
        self.tracks.clear();
        self.project_title = project.project_title;
        for descriptor in project.tracks {
            self.insert(descriptor)?;
        }
        log::info!(
            "loaded '{}' with {} tracks",
            self.project_title,
            self.tracks.len()
        );
        Ok(())
    }

    fn insert(&mut self, descriptor: TrackDescriptor) -> Result<TrackId, SessionError> {
        let id = TrackId(self.next_id);
        let track = TrackState {
            id,
            title: descriptor.title,
            waveform: descriptor.waveform,
            volume: descriptor.volume,
            frequency: descriptor.frequency,
            playing: false,
        };
        self.send(EngineMessage::Insert {
            id,
            params: track.tone_params(),
        })?;
        self.next_id += 1;
        log::debug!("added track {} '{}'", id, track.title);
        self.tracks.push(track);
        Ok(id)
    }

    fn track_ref(&self, id: TrackId) -> Result<&TrackState, SessionError> {
        self.track(id).ok_or(SessionError::UnknownTrack(id))
    }

    fn track_mut(&mut self, id: TrackId) -> Result<&mut TrackState, SessionError> {
        self.tracks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(SessionError::UnknownTrack(id))
    }

    /// Queue `msg` for the engine. State changes only after this succeeds.
    fn send(&mut self, msg: EngineMessage) -> Result<(), SessionError> {
        self.tx.send(msg).map_err(|msg| {
            log::warn!("engine queue full, dropped {msg:?}");
            SessionError::EngineQueueFull
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    type TestSession = Session<VecDeque<EngineMessage>>;

    fn session() -> TestSession {
        Session::new(VecDeque::new())
    }

    fn drain(session: &mut TestSession) -> Vec<EngineMessage> {
        session.sender_mut().drain(..).collect()
    }

    #[test]
    fn new_tracks_use_defaults_and_numbered_titles() {
        let mut s = session();
        let a = s.add_track().unwrap();
        let b = s.add_track().unwrap();
        assert_ne!(a, b);

        let titles: Vec<&str> = s.tracks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["Track 1", "Track 2"]);

        let track = s.track(a).unwrap();
        assert_eq!(track.waveform, Waveform::Sine);
        assert_eq!(track.volume, 0.5);
        assert_eq!(track.frequency, 440.0);
        assert!(!track.playing);

        assert_eq!(
            drain(&mut s)[0],
            EngineMessage::Insert {
                id: a,
                params: ToneParams::default()
            }
        );
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut s = session();
        let a = s.add_track().unwrap();
        s.remove_track(a).unwrap();
        let b = s.add_track().unwrap();
        assert_ne!(a, b);
        assert!(matches!(s.remove_track(a), Err(SessionError::UnknownTrack(_))));
    }

    #[test]
    fn play_and_stop_are_mirrored_to_engine() {
        let mut s = session();
        let id = s.add_track().unwrap();
        drain(&mut s);

        s.apply(Command::TogglePlay(id)).unwrap();
        assert!(s.track(id).unwrap().playing);
        s.apply(Command::TogglePlay(id)).unwrap();
        assert!(!s.any_playing());

        assert_eq!(
            drain(&mut s),
            [EngineMessage::Play { id }, EngineMessage::Stop { id }]
        );
    }

    #[test]
    fn invalid_values_leave_track_unchanged() {
        let mut s = session();
        let id = s.add_track().unwrap();
        drain(&mut s);

        assert!(matches!(
            s.set_frequency(id, f64::NAN),
            Err(SessionError::InvalidFrequency(_))
        ));
        assert!(s.set_frequency(id, -5.0).is_err());
        assert!(matches!(
            s.set_volume(id, f64::NAN),
            Err(SessionError::InvalidVolume(_))
        ));
        assert_eq!(s.track(id).unwrap().frequency, 440.0);
        assert!(drain(&mut s).is_empty());

        s.set_volume(id, 4.0).unwrap();
        assert_eq!(s.track(id).unwrap().volume, 1.0);
    }

    #[test]
    fn key_down_sets_offset_and_plays_all() {
        let mut s = session();
        let a = s.add_track().unwrap();
        let b = s.add_track().unwrap();
        drain(&mut s);

        s.apply(Command::KeyDown(12)).unwrap();
        assert_eq!(s.global_offset(), 12.0);
        assert!(s.tracks().iter().all(|t| t.playing));
        let msgs = drain(&mut s);
        assert_eq!(msgs[0], EngineMessage::SetOffset { hz: 261.63 });
        assert!(msgs.contains(&EngineMessage::Play { id: a }));
        assert!(msgs.contains(&EngineMessage::Play { id: b }));

        s.apply(Command::KeyUp).unwrap();
        assert!(!s.any_playing());
    }

    #[test]
    fn nan_offset_counts_as_zero() {
        let mut s = session();
        s.set_global_offset(f64::NAN).unwrap();
        assert_eq!(s.global_offset(), 0.0);
        assert_eq!(drain(&mut s), [EngineMessage::SetOffset { hz: 0.0 }]);
    }

    #[test]
    fn snapshot_preserves_order_and_values() {
        let mut s = session();
        let a = s.add_track().unwrap();
        let b = s.add_track().unwrap();
        s.set_waveform(b, Waveform::Triangle).unwrap();
        s.set_frequency(a, 261.63).unwrap();
        s.set_track_title(b, "drone").unwrap();
        s.set_project_title("Chords");

        let project = s.snapshot();
        assert_eq!(project.project_title, "Chords");
        assert_eq!(
            project.tracks,
            vec![
                TrackDescriptor::new("Track 1", Waveform::Sine, 0.5, 261.63),
                TrackDescriptor::new("drone", Waveform::Triangle, 0.5, 440.0),
            ]
        );
    }

    #[test]
    fn load_replaces_all_tracks() {
        let mut s = session();
        let old = s.add_track().unwrap();
        s.play(old).unwrap();
        drain(&mut s);

        let project = Project::new(
            "Loaded",
            vec![
                TrackDescriptor::new("one", Waveform::Square, 0.1, 100.0),
                TrackDescriptor::new("two", Waveform::Sawtooth, 0.2, 200.0),
            ],
        );
        s.apply(Command::Load(project.clone())).unwrap();

        assert_eq!(s.snapshot(), project);
        assert!(s.track(old).is_none());
        let msgs = drain(&mut s);
        assert_eq!(msgs[0], EngineMessage::Clear);
        assert_eq!(msgs.len(), 3);
    }

    #[test]
    fn failed_load_leaves_session_untouched() {
        let mut s = session();
        s.add_track().unwrap();
        s.set_project_title("Keep me");
        let before = s.snapshot();
        drain(&mut s);

        let bad = Project::new(
            "Broken",
            vec![
                TrackDescriptor::default(),
                TrackDescriptor::new("bad", Waveform::Sine, 0.5, -1.0),
            ],
        );
        assert!(s.load(bad).is_err());
        assert_eq!(s.snapshot(), before);
        assert!(drain(&mut s).is_empty());
    }

    /// Sender whose queue can be made to reject everything
    #[derive(Default)]
    struct Gate {
        closed: bool,
        sent: Vec<EngineMessage>,
    }

    impl MessageSender for Gate {
        fn send(&mut self, msg: EngineMessage) -> Result<(), EngineMessage> {
            if self.closed {
                return Err(msg);
            }
            self.sent.push(msg);
            Ok(())
        }
    }

    #[test]
    fn full_engine_queue_leaves_state_unchanged() {
        let mut s = Session::new(Gate::default());
        let id = s.add_track().unwrap();
        s.set_project_title("Keep me");
        let before = s.snapshot();
        s.sender_mut().closed = true;

        let replacement = Project::new("Other", vec![TrackDescriptor::default(); 2]);
        assert!(matches!(
            s.apply(Command::Load(replacement)),
            Err(SessionError::EngineQueueFull)
        ));
        assert_eq!(s.snapshot(), before);

        assert!(s.remove_track(id).is_err());
        assert!(s.track(id).is_some());
        assert!(s.play(id).is_err());
        assert!(!s.any_playing());
        assert!(s.set_frequency(id, 220.0).is_err());
        assert!(s.apply(Command::KeyDown(3)).is_err());
        assert_eq!(s.global_offset(), 0.0);
        assert!(s.add_track().is_err());
        assert_eq!(s.snapshot(), before);

        // nothing was lost: the next change goes through once there is room
        s.sender_mut().closed = false;
        s.remove_track(id).unwrap();
        assert_eq!(s.sender().sent.last(), Some(&EngineMessage::Remove { id }));
    }

    #[test]
    fn track_limit_is_enforced() {
        let mut s = session();
        for _ in 0..MAX_TRACKS {
            s.add_track().unwrap();
        }
        assert!(matches!(s.add_track(), Err(SessionError::TrackLimit(_))));
    }
}
