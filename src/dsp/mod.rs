//! Low-level DSP primitives used by the graph nodes.
//!
//! These components are allocation-free and realtime-safe, so they can live
//! directly inside the per-track tone owned by the audio thread.

/// Oscillator waveforms.
pub mod oscillator;

pub use oscillator::{OscillatorBlock, Waveform};
