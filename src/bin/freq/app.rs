//! Freq - application builder and runner

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{PushError, RingBuffer};
use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    time::Instant,
};

use super::ui::UiApp;

use freq::{
    config::Config,
    engine::{Engine, EngineMessage},
    project::Project,
    session::Session,
    store::{Autosave, SessionStore},
    MAX_BLOCK_SIZE,
};

/// UI → audio command ring capacity
const MESSAGE_RING_SIZE: usize = 1024;
/// Audio → UI scope ring capacity, in samples
const SCOPE_RING_SIZE: usize = 16 * 1024;

const LOG_FILE_NAME: &str = "freq.log";

/// Main application builder
pub struct Freq {
    config: Config,
    project: Option<PathBuf>,
}

impl Freq {
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            project: None,
        }
    }

    /// Project file to open after restoring the previous session
    pub fn project(mut self, path: impl Into<PathBuf>) -> Self {
        self.project = Some(path.into());
        self
    }

    /// Run the application (takes over the terminal, plays audio)
    pub fn run(self) -> EyreResult<()> {
        init_logging(&self.config.state_dir)?;

        // Without an output device no track could ever sound, so fail here
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        log::info!("audio output: {sample_rate} Hz, {channels} channels");

        // --- Cross-thread rings ---
        let (msg_tx, msg_rx) = RingBuffer::<EngineMessage>::new(MESSAGE_RING_SIZE);
        let (scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_RING_SIZE);

        // Buffer reused by audio callback
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device
            .build_output_stream(
                &config.into(),
                {
                    let mut engine = Engine::new(sample_rate, msg_rx);
                    let mut scope_tx = scope_tx;
                    move |data: &mut [f32], _| {
                        let total_frames = data.len() / channels;
                        let mut frames_written = 0;
                        while frames_written < total_frames {
                            let frames_remaining = total_frames - frames_written;
                            let frames_to_render = frames_remaining.min(MAX_BLOCK_SIZE);

                            let block = &mut render_buf[..frames_to_render];
                            engine.render_block(block);

                            // Duplicate mono to all channels
                            let out_off = frames_written * channels;
                            for (i, &s) in block.iter().enumerate() {
                                for ch in 0..channels {
                                    data[out_off + i * channels + ch] = s;
                                }
                            }

                            // Feed the scope, dropping the remainder if the UI falls behind
                            for &s in block.iter() {
                                if let Err(PushError::Full(_)) = scope_tx.push(s) {
                                    break;
                                }
                            }

                            frames_written += frames_to_render;
                        }
                    }
                },
                |err| log::error!("audio stream error: {err}"),
                None,
            )
            .wrap_err("failed to build output stream")?;

        stream.play().wrap_err("failed to start output stream")?;

        // --- Session ---
        let mut session =
            Session::new(msg_tx).with_default_track(self.config.default_track.clone());
        let store = SessionStore::new(&self.config.state_dir);

        if let Some(previous) = store.restore() {
            if let Err(e) = session.load(previous) {
                log::warn!("could not restore previous session: {e}");
            }
        }
        if let Some(path) = &self.project {
            let project = Project::load_file(path)
                .wrap_err_with(|| format!("failed to open {}", path.display()))?;
            session.load(project)?;
        }
        session.set_global_offset(0.0)?;

        let mut autosave = Autosave::new(self.config.autosave_interval);
        autosave.start(Instant::now());

        // --- UI ---
        let mut terminal = ratatui::init();
        let mut app = UiApp::new(
            session,
            store,
            autosave,
            self.config.keymap,
            self.config.project_dir,
            scope_rx,
            sample_rate,
        );
        let res = app.run(&mut terminal);
        ratatui::restore();

        app.shutdown();
        drop(stream);
        res
    }
}

/// Log to a file in the state directory; stderr belongs to the TUI.
fn init_logging(state_dir: &Path) -> EyreResult<()> {
    fs::create_dir_all(state_dir)
        .wrap_err_with(|| format!("failed to create {}", state_dir.display()))?;
    let log_path = state_dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .wrap_err_with(|| format!("failed to open {}", log_path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .wrap_err("failed to initialise logging")?;
    Ok(())
}
