//! Benchmarks for the oscillator and the track mixer.
//!
//! Run with: cargo bench
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline

use std::collections::VecDeque;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use freq::dsp::{OscillatorBlock, Waveform};
use freq::engine::{Engine, EngineMessage, ToneParams, TrackId};
use freq::graph::node::RenderCtx;

/// Common buffer sizes used in audio applications.
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let ctx = RenderCtx::from_freq(48_000.0, 440.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for waveform in Waveform::ALL {
            let mut osc = OscillatorBlock::new(waveform);
            group.bench_with_input(BenchmarkId::new(waveform.as_str(), size), &size, |b, _| {
                b.iter(|| {
                    osc.render(black_box(&mut buffer), black_box(&ctx));
                })
            });
        }
    }

    group.finish();
}

/// An engine with `tracks` playing tones spread over a few octaves
fn playing_engine(tracks: u32) -> Engine<VecDeque<EngineMessage>> {
    let mut rx = VecDeque::new();
    for i in 0..tracks {
        let id = TrackId(i);
        let params = ToneParams {
            waveform: Waveform::ALL[i as usize % Waveform::ALL.len()],
            volume: 1.0 / tracks as f32,
            frequency: 110.0 * (1.0 + i as f64 * 0.5),
        };
        rx.push_back(EngineMessage::Insert { id, params });
        rx.push_back(EngineMessage::Play { id });
    }
    rx.push_back(EngineMessage::SetOffset { hz: 15.56 });
    Engine::new(48_000.0, rx)
}

fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/mix");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for tracks in [1u32, 4, 16, 64] {
            let mut engine = playing_engine(tracks);
            group.bench_with_input(
                BenchmarkId::new(format!("{tracks}_track"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        engine.render_block(black_box(&mut buffer));
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_oscillator, bench_mix);
criterion_main!(benches);
