//! Tone - the sound source behind one track
//!
//! Simple model: one track = one oscillator through one gain stage.
//! The oscillator only exists while the track is playing.

use crate::{
    dsp::Waveform,
    graph::{
        gain::GainNode,
        node::{GraphNode, RenderCtx},
        oscillator::OscNode,
    },
};

/// Settings a tone is created with (Copy so it can cross the ring buffer)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneParams {
    pub waveform: Waveform,
    /// Linear gain, 0.0-1.0
    pub volume: f32,
    /// Base frequency in Hz, before the global offset
    pub frequency: f64,
}

impl Default for ToneParams {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            volume: 0.5,
            frequency: 440.0,
        }
    }
}

pub struct Tone {
    params: ToneParams,
    /// Global offset in Hz
    offset_hz: f64,
    /// Live oscillator, `None` while stopped
    node: Option<GainNode<OscNode>>,
}

impl Tone {
    pub fn new(params: ToneParams, offset_hz: f64) -> Self {
        Self {
            params,
            offset_hz,
            node: None,
        }
    }

    pub fn params(&self) -> ToneParams {
        self.params
    }

    /// Start the oscillator. Does nothing if already playing.
    pub fn play(&mut self, sample_rate: f32) {
        if self.node.is_some() {
            return;
        }
        let mut node = GainNode::new(OscNode::new(self.params.waveform), self.params.volume);
        node.note_on(&self.ctx(sample_rate));
        self.node = Some(node);
    }

    /// Stop and release the oscillator. Does nothing if already stopped.
    pub fn stop(&mut self, sample_rate: f32) {
        if let Some(mut node) = self.node.take() {
            node.note_off(&self.ctx(sample_rate));
        }
    }

    pub fn is_playing(&self) -> bool {
        self.node.is_some()
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.params.waveform = waveform;
        if let Some(node) = &mut self.node {
            node.signal.set_waveform(waveform);
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        if volume.is_nan() {
            return;
        }
        self.params.volume = volume.clamp(0.0, 1.0);
        if let Some(node) = &mut self.node {
            node.set_volume(self.params.volume);
        }
    }

    pub fn set_frequency(&mut self, frequency: f64) {
        if frequency.is_finite() {
            self.params.frequency = frequency;
        }
    }

    pub fn set_offset_hz(&mut self, offset_hz: f64) {
        self.offset_hz = if offset_hz.is_nan() { 0.0 } else { offset_hz };
    }

    /// Base frequency plus global offset, never below 0 Hz.
    pub fn effective_frequency(&self) -> f64 {
        (self.params.frequency + self.offset_hz).max(0.0)
    }

    /// Render into `out`, or write silence when stopped.
    pub fn render(&mut self, out: &mut [f32], sample_rate: f32) {
        let ctx = self.ctx(sample_rate);
        match &mut self.node {
            Some(node) => node.render_block(out, &ctx),
            None => out.fill(0.0),
        }
    }

    /// Rendered pitch is capped at Nyquist; larger values would not fit an f32.
    fn ctx(&self, sample_rate: f32) -> RenderCtx {
        let nyquist = f64::from(sample_rate) / 2.0;
        let frequency = self.effective_frequency().min(nyquist);
        RenderCtx::from_freq(sample_rate, frequency as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn peak(buffer: &[f32]) -> f32 {
        buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn stopped_tone_is_silent() {
        let mut tone = Tone::new(ToneParams::default(), 0.0);
        let mut out = vec![1.0f32; 256];
        tone.render(&mut out, SAMPLE_RATE);
        assert_eq!(peak(&out), 0.0);
        assert!(!tone.is_playing());
    }

    #[test]
    fn playing_tone_respects_volume() {
        let params = ToneParams {
            waveform: Waveform::Square,
            volume: 0.5,
            frequency: 100.0,
        };
        let mut tone = Tone::new(params, 0.0);
        tone.play(SAMPLE_RATE);
        let mut out = vec![0.0f32; 1024];
        tone.render(&mut out, SAMPLE_RATE);
        let p = peak(&out);
        assert!((p - 0.5).abs() < 0.01, "peak {p}");

        tone.stop(SAMPLE_RATE);
        tone.render(&mut out, SAMPLE_RATE);
        assert_eq!(peak(&out), 0.0);
    }

    #[test]
    fn play_is_idempotent() {
        let mut tone = Tone::new(ToneParams::default(), 0.0);
        tone.play(SAMPLE_RATE);
        let mut out = vec![0.0f32; 10];
        tone.render(&mut out, SAMPLE_RATE);
        // a second play must not restart the oscillator
        tone.play(SAMPLE_RATE);
        let mut next = [0.0f32; 1];
        tone.render(&mut next, SAMPLE_RATE);
        assert!(next[0] != 0.0);
    }

    #[test]
    fn offset_adds_to_base_frequency() {
        let mut tone = Tone::new(ToneParams::default(), 0.0);
        tone.set_offset_hz(15.56);
        assert!((tone.effective_frequency() - 455.56).abs() < 1e-9);

        tone.set_offset_hz(f64::NAN);
        assert_eq!(tone.effective_frequency(), 440.0);

        tone.set_offset_hz(-1_000.0);
        assert_eq!(tone.effective_frequency(), 0.0);
    }

    #[test]
    fn huge_frequency_renders_finite_samples() {
        let params = ToneParams {
            waveform: Waveform::Sawtooth,
            volume: 1.0,
            frequency: 1e39,
        };
        let mut tone = Tone::new(params, 0.0);
        tone.play(SAMPLE_RATE);
        let mut out = vec![0.0f32; 256];
        tone.render(&mut out, SAMPLE_RATE);
        assert!(out.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn settings_survive_stop_and_play() {
        let mut tone = Tone::new(ToneParams::default(), 0.0);
        tone.set_waveform(Waveform::Triangle);
        tone.set_volume(0.8);
        tone.set_frequency(220.0);
        tone.set_frequency(f64::NAN);
        tone.play(SAMPLE_RATE);
        assert_eq!(
            tone.params(),
            ToneParams {
                waveform: Waveform::Triangle,
                volume: 0.8,
                frequency: 220.0,
            }
        );
    }
}
