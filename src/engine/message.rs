use std::{collections::VecDeque, fmt};

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer};

use crate::{dsp::Waveform, engine::tone::ToneParams};

/// Identity of a live track within one session. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(pub u32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Commands sent from the UI thread to the audio thread
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum EngineMessage {
    /// Create a stopped tone for a new track
    Insert { id: TrackId, params: ToneParams },
    /// Stop and drop a track's tone
    Remove { id: TrackId },
    Play { id: TrackId },
    Stop { id: TrackId },
    SetWaveform { id: TrackId, waveform: Waveform },
    SetVolume { id: TrackId, volume: f32 },
    SetFrequency { id: TrackId, frequency: f64 },
    /// Global offset in hertz, applied to every tone
    SetOffset { hz: f64 },
    /// Drop every tone
    Clear,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<EngineMessage>;
}

pub trait MessageSender {
    /// Returns the message back if it could not be queued.
    fn send(&mut self, msg: EngineMessage) -> Result<(), EngineMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<EngineMessage> {
    fn pop(&mut self) -> Option<EngineMessage> {
        Consumer::pop(self).ok()
    }
}

#[cfg(feature = "rtrb")]
impl MessageSender for Producer<EngineMessage> {
    fn send(&mut self, msg: EngineMessage) -> Result<(), EngineMessage> {
        self.push(msg).map_err(|rtrb::PushError::Full(msg)| msg)
    }
}

impl MessageReceiver for VecDeque<EngineMessage> {
    fn pop(&mut self) -> Option<EngineMessage> {
        self.pop_front()
    }
}

impl MessageSender for VecDeque<EngineMessage> {
    fn send(&mut self, msg: EngineMessage) -> Result<(), EngineMessage> {
        self.push_back(msg);
        Ok(())
    }
}

/// Discards every message; for sessions with no audio attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSender;

impl MessageSender for NullSender {
    fn send(&mut self, _msg: EngineMessage) -> Result<(), EngineMessage> {
        Ok(())
    }
}
