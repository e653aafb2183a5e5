//! Composable building blocks for a track's signal path.
//!
//! Graph nodes wrap the low-level DSP primitives with the note lifecycle and
//! block-based rendering the engine drives.

/// Volume stage with per-block smoothing.
pub mod gain;
/// Core traits shared by all graph nodes.
pub mod node;
/// Audio-band oscillators.
pub mod oscillator;
