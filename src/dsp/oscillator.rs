//! Phase-accumulator oscillator with band-limited edges.

use std::{f32::consts::TAU, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::graph::node::RenderCtx;

/*
Phase Accumulation
==================

Every waveform here is a function of a single phase value in [0, 1). Each
sample the phase advances by

    increment = frequency / sample_rate

and wraps back into range. The waveform then maps phase to amplitude:

    sine       sin(2π · phase)
    sawtooth   2 · phase − 1                 (ramp up, snap down)
    square     +1 for phase < 0.5, else −1
    triangle   4 · phase − 1 rising, 3 − 4 · phase falling

Changing frequency only changes the increment, and changing waveform only
changes the mapping, so neither causes a jump in phase.

Aliasing
--------

The sawtooth and square have instantaneous jumps. A naive jump contains
energy above Nyquist that folds back as inharmonic noise, most audible on
high notes. PolyBLEP subtracts a two-sample polynomial residual around each
jump, which removes most of it for almost no cost. Near a corrected edge the
output may overshoot ±1 slightly.

The triangle has no jumps (only corners), so it is left as-is.
*/

/// Waveform shape of a track's oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Triangle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }

    /// Next waveform in [`Waveform::ALL`], wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&w| w == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownWaveform(pub String);

impl fmt::Display for UnknownWaveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown waveform '{}'", self.0)
    }
}

impl std::error::Error for UnknownWaveform {}

impl FromStr for Waveform {
    type Err = UnknownWaveform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|w| w.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownWaveform(s.to_string()))
    }
}

pub struct OscillatorBlock {
    waveform: Waveform,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(Waveform::Sine)
    }

    pub fn square() -> Self {
        Self::new(Waveform::Square)
    }

    pub fn sawtooth() -> Self {
        Self::new(Waveform::Sawtooth)
    }

    pub fn triangle() -> Self {
        Self::new(Waveform::Triangle)
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Switch shape without resetting phase.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Render one block. The per-sample increment is limited to half a
    /// cycle, so frequencies above Nyquist alias instead of corrupting phase.
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let inc = ctx.frequency / ctx.sample_rate;
        let inc = if inc.is_finite() { inc.clamp(0.0, 0.5) } else { 0.0 };
        if !self.phase.is_finite() {
            self.phase = 0.0;
        }
        for sample in out.iter_mut() {
            *sample = self.value(inc);
            self.phase += inc;
            if self.phase >= 1.0 {
                self.phase -= self.phase.floor();
            }
        }
    }

    #[inline]
    fn value(&self, inc: f32) -> f32 {
        let t = self.phase;
        match self.waveform {
            Waveform::Sine => (TAU * t).sin(),
            Waveform::Sawtooth => (2.0 * t - 1.0) - poly_blep(t, inc),
            Waveform::Square => {
                let naive = if t < 0.5 { 1.0 } else { -1.0 };
                naive + poly_blep(t, inc) - poly_blep((t + 0.5) % 1.0, inc)
            }
            Waveform::Triangle => {
                if t < 0.5 {
                    4.0 * t - 1.0
                } else {
                    3.0 - 4.0 * t
                }
            }
        }
    }
}

/// Polynomial band-limited step residual for a discontinuity at phase 0.
///
/// `t` is the phase in [0, 1), `dt` the per-sample increment.
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        0.0
    } else if t < dt {
        let t = t / dt;
        2.0 * t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn render(osc: &mut OscillatorBlock, frequency: f32, len: usize) -> Vec<f32> {
        let ctx = RenderCtx::from_freq(SAMPLE_RATE, frequency);
        let mut buffer = vec![0.0f32; len];
        osc.render(&mut buffer, &ctx);
        buffer
    }

    #[test]
    fn sine_follows_phase() {
        let mut osc = OscillatorBlock::sine();
        let buffer = render(&mut osc, 440.0, 128);

        let n = 12;
        let expected = (TAU * 440.0 * n as f32 / SAMPLE_RATE).sin();
        assert!(
            (buffer[n] - expected).abs() < 1e-4,
            "expected {expected}, got {}",
            buffer[n]
        );
        assert_eq!(buffer[0], 0.0);
    }

    #[test]
    fn waveforms_stay_in_range() {
        for waveform in Waveform::ALL {
            let mut osc = OscillatorBlock::new(waveform);
            let buffer = render(&mut osc, 1_234.5, 48_000);
            let peak = buffer.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
            assert!(peak <= 1.01, "{waveform} peaked at {peak}");
            assert!(peak > 0.9, "{waveform} too quiet: {peak}");
        }
    }

    #[test]
    fn triangle_hits_corners() {
        let mut osc = OscillatorBlock::triangle();
        // 480 Hz at 48 kHz = 100 samples per cycle
        let buffer = render(&mut osc, 480.0, 100);
        assert!((buffer[0] + 1.0).abs() < 1e-4);
        assert!((buffer[50] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn waveform_switch_keeps_phase() {
        let mut osc = OscillatorBlock::sine();
        render(&mut osc, 480.0, 25);
        osc.set_waveform(Waveform::Triangle);
        let buffer = render(&mut osc, 480.0, 1);
        // a quarter cycle in: triangle is at 4 * 0.25 - 1 = 0
        assert!(buffer[0].abs() < 1e-3, "got {}", buffer[0]);
    }

    #[test]
    fn zero_frequency_is_silent_dc() {
        let mut osc = OscillatorBlock::sine();
        let buffer = render(&mut osc, 0.0, 64);
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn non_finite_frequency_keeps_output_finite() {
        for waveform in Waveform::ALL {
            let mut osc = OscillatorBlock::new(waveform);
            for frequency in [f32::INFINITY, f32::NAN, 1e30] {
                let buffer = render(&mut osc, frequency, 256);
                assert!(
                    buffer.iter().all(|s| s.is_finite() && s.abs() <= 1.0),
                    "{waveform} at {frequency} Hz"
                );
            }
            // and recovers once the frequency is sane again
            let buffer = render(&mut osc, 440.0, 256);
            assert!(buffer.iter().any(|&s| s != 0.0));
        }
    }

    #[test]
    fn waveform_names() {
        assert_eq!("Sawtooth".parse::<Waveform>(), Ok(Waveform::Sawtooth));
        assert!("noise".parse::<Waveform>().is_err());
        assert_eq!(Waveform::Triangle.next(), Waveform::Sine);
        assert_eq!(
            serde_json::to_string(&Waveform::Square).unwrap(),
            "\"square\""
        );
    }
}
