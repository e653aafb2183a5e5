pub mod config;
pub mod dsp;
pub mod engine; // Audio-thread side: one tone per track
pub mod error;
pub mod graph; // Block-rendered oscillator and gain nodes
pub mod keymap;
pub mod pitch;
pub mod project; // Save/load format
pub mod session; // UI-thread state and commands
pub mod store; // Session slot and autosave

pub const MAX_BLOCK_SIZE: usize = 2048;
/// Upper bound on live tracks; the engine preallocates its tone table to this.
pub const MAX_TRACKS: usize = 64;
