//! Audio-thread side of the tone generator.
//!
//! The [`Engine`] owns one [`Tone`] per track and is driven only by
//! [`EngineMessage`]s popped at the start of each block. The UI thread never
//! touches a tone directly, so the audio callback needs no locks.
//!
//! # Example
//!
//! ```
//! use std::collections::VecDeque;
//! use freq::engine::{Engine, EngineMessage, ToneParams, TrackId};
//!
//! let mut rx = VecDeque::new();
//! rx.push_back(EngineMessage::Insert { id: TrackId(0), params: ToneParams::default() });
//! rx.push_back(EngineMessage::Play { id: TrackId(0) });
//!
//! let mut engine = Engine::new(48_000.0, rx);
//! let mut block = [0.0f32; 256];
//! engine.render_block(&mut block);
//! assert!(block.iter().any(|s| *s != 0.0));
//! ```

mod message;
mod tone;

pub use message::{EngineMessage, MessageReceiver, MessageSender, NullSender, TrackId};
pub use tone::{Tone, ToneParams};

use crate::{MAX_BLOCK_SIZE, MAX_TRACKS};

pub struct Engine<R> {
    rx: R,
    sample_rate: f32,
    /// Tones in track order
    tones: Vec<(TrackId, Tone)>,
    offset_hz: f64,
    scratch: Vec<f32>,
}

impl<R: MessageReceiver> Engine<R> {
    pub fn new(sample_rate: f32, rx: R) -> Self {
        Self {
            rx,
            sample_rate,
            tones: Vec::with_capacity(MAX_TRACKS),
            offset_hz: 0.0,
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Apply all pending messages, then mix every playing tone into `out`.
    ///
    /// Blocks longer than [`MAX_BLOCK_SIZE`] are rendered in chunks.
    pub fn render_block(&mut self, out: &mut [f32]) {
        self.drain_messages();

        out.fill(0.0);
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let scratch = &mut self.scratch[..chunk.len()];
            for (_, tone) in self.tones.iter_mut().filter(|(_, t)| t.is_playing()) {
                tone.render(scratch, self.sample_rate);
                for (o, &s) in chunk.iter_mut().zip(scratch.iter()) {
                    *o += s;
                }
            }
            for o in chunk.iter_mut() {
                *o = o.clamp(-1.0, 1.0);
            }
        }
    }

    /// Number of tones currently producing sound
    pub fn playing_count(&self) -> usize {
        self.tones.iter().filter(|(_, t)| t.is_playing()).count()
    }

    pub fn tone_count(&self) -> usize {
        self.tones.len()
    }

    pub fn tone(&self, id: TrackId) -> Option<&Tone> {
        self.tones.iter().find(|(tid, _)| *tid == id).map(|(_, t)| t)
    }

    fn drain_messages(&mut self) {
        while let Some(msg) = self.rx.pop() {
            self.handle(msg);
        }
    }

    fn handle(&mut self, msg: EngineMessage) {
        let sample_rate = self.sample_rate;
        match msg {
            EngineMessage::Insert { id, params } => {
                // Capacity is reserved up front; never grow on the audio thread
                if self.tones.len() < MAX_TRACKS && self.tone(id).is_none() {
                    self.tones.push((id, Tone::new(params, self.offset_hz)));
                }
            }
            EngineMessage::Remove { id } => {
                if let Some(idx) = self.tones.iter().position(|(tid, _)| *tid == id) {
                    let (_, mut tone) = self.tones.remove(idx);
                    tone.stop(sample_rate);
                }
            }
            EngineMessage::Play { id } => {
                if let Some(tone) = self.tone_mut(id) {
                    tone.play(sample_rate);
                }
            }
            EngineMessage::Stop { id } => {
                if let Some(tone) = self.tone_mut(id) {
                    tone.stop(sample_rate);
                }
            }
            EngineMessage::SetWaveform { id, waveform } => {
                if let Some(tone) = self.tone_mut(id) {
                    tone.set_waveform(waveform);
                }
            }
            EngineMessage::SetVolume { id, volume } => {
                if let Some(tone) = self.tone_mut(id) {
                    tone.set_volume(volume);
                }
            }
            EngineMessage::SetFrequency { id, frequency } => {
                if let Some(tone) = self.tone_mut(id) {
                    tone.set_frequency(frequency);
                }
            }
            EngineMessage::SetOffset { hz } => {
                self.offset_hz = if hz.is_nan() { 0.0 } else { hz };
                for (_, tone) in &mut self.tones {
                    tone.set_offset_hz(self.offset_hz);
                }
            }
            EngineMessage::Clear => {
                for (_, tone) in &mut self.tones {
                    tone.stop(sample_rate);
                }
                self.tones.clear();
            }
        }
    }

    fn tone_mut(&mut self, id: TrackId) -> Option<&mut Tone> {
        self.tones
            .iter_mut()
            .find(|(tid, _)| *tid == id)
            .map(|(_, t)| t)
    }
}
