//! Semitone offsets expressed as a hertz delta from C4.

/*
Twelve-Tone Equal Temperament
=============================

An octave doubles the frequency. Equal temperament splits that doubling into
twelve identical steps, so each semitone multiplies the frequency by the
twelfth root of two:

    ratio = 2^(1/12) ≈ 1.059463

Moving `n` semitones away from a reference pitch gives

    frequency = reference × ratio^n

The keyboard does not set a pitch directly. It sets an offset that is added
to every track's own base frequency, so what we need is the *difference*
between the shifted reference and the reference itself:

    delta = reference × ratio^n − reference

    n = 0    →  delta = 0
    n = 12   →  delta = reference        (one octave up)
    n = -12  →  delta = -reference / 2   (one octave down)

The reference is C4 (261.63 Hz). Deltas are rounded to hundredths of a hertz.
*/

/// C4, the zero point for offsets.
pub const REFERENCE_PITCH: f64 = 261.63;

/// Hertz delta for an offset of `semitones` from [`REFERENCE_PITCH`],
/// rounded to two decimal places (half away from zero).
///
/// NaN in, NaN out. Use [`offset_hz_or_zero`] where NaN means "no offset".
pub fn offset_hz(semitones: f64) -> f64 {
    let ratio = 2.0_f64.powf(1.0 / 12.0);
    let frequency = REFERENCE_PITCH * ratio.powf(semitones);
    round_hundredths(frequency - REFERENCE_PITCH)
}

/// Like [`offset_hz`] but treats a NaN result as no offset.
pub fn offset_hz_or_zero(semitones: f64) -> f64 {
    let delta = offset_hz(semitones);
    if delta.is_nan() {
        0.0
    } else {
        delta
    }
}

#[inline]
fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
