use crate::dsp::oscillator::{OscillatorBlock, Waveform};
use crate::graph::node::{GraphNode, RenderCtx};

/*
Audio Oscillator
================

An oscillator is the whole sound source of a track. It generates a repeating
waveform at the track's frequency; the only shaping applied afterwards is the
track's volume.

Waveform Types and Their Character:
-----------------------------------

Sine: The purest tone - a single frequency with no harmonics.
  - Sound: Smooth, hollow, flute-like
  - Harmonics: Fundamental only (no overtones)
  - Use: Reference tones, beating between close frequencies

Sawtooth: The richest waveform - contains all harmonics.
  - Sound: Bright, buzzy, brassy
  - Harmonics: All harmonics (1st, 2nd, 3rd, 4th, ...)
             Amplitude falls off as 1/n

Square: Hollow but powerful - only odd harmonics.
  - Sound: Hollow, woody, clarinet-like
  - Harmonics: Odd harmonics only (1st, 3rd, 5th, 7th, ...)
             Amplitude falls off as 1/n

Triangle: Mellow and soft - weak odd harmonics.
  - Sound: Soft, between sine and square
  - Harmonics: Odd harmonics only, but fall off as 1/n²

Layering tracks
---------------

Two tracks a few hertz apart beat against each other at the difference
frequency: 440 Hz and 443 Hz pulse three times per second. Tracks at simple
ratios (2:1, 3:2, 5:4) fuse into intervals and chords.

Example usage:
  let osc = OscNode::new(Waveform::Sawtooth);
*/

pub struct OscNode {
    osc: OscillatorBlock,
}

impl OscNode {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            osc: OscillatorBlock::new(waveform),
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.osc.waveform()
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.osc.set_waveform(waveform);
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.osc.render(out, ctx);
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        // A freshly started oscillator begins at phase zero
        self.osc.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let block_size = 128;

        let ctx = RenderCtx::from_freq(sample_rate, 440.0);
        let mut synth = OscNode::new(Waveform::Sine);

        let mut buffer = vec![0.0f32; block_size];
        synth.render_block(&mut buffer, &ctx);

        // sample n should be sin(2pi f n / sr)
        let sample_index = 12;
        let expected = (TAU * ctx.frequency * sample_index as f32 / sample_rate).sin();
        let actual = buffer[sample_index];
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn note_on_restarts_phase() {
        let ctx = RenderCtx::from_freq(48_000.0, 1_000.0);
        let mut synth = OscNode::new(Waveform::Square);
        let mut buffer = vec![0.0f32; 37];
        synth.render_block(&mut buffer, &ctx);

        synth.note_on(&ctx);
        let mut first = [0.0f32; 1];
        synth.render_block(&mut first, &ctx);
        // phase 0 sits on the rising edge, which PolyBLEP pulls to zero
        assert!(first[0].abs() < 1e-6, "got {}", first[0]);
        assert_eq!(synth.waveform(), Waveform::Square);
    }
}
