//! TUI module for freq
//!
//! Translates terminal key events into session commands and draws the
//! tracks, transport and oscilloscope.

mod prompt;
mod tracks;
mod transport;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::{
    io,
    path::PathBuf,
    time::{Duration, Instant},
};

use freq::{
    engine::EngineMessage,
    keymap::KeyMap,
    project::Project,
    session::{Command, Session},
    store::{Autosave, SessionStore},
};

use prompt::{render_prompt, Prompt, PromptKind, PromptOutcome};
use tracks::render_tracks;
use transport::{render_transport, AudioStats, TransportInfo};
use waveform::render_waveform;

/// Samples shown by the scope
const SCOPE_WINDOW: usize = 1024;
/// Samples kept for the scope; the extra half leaves room to find a trigger
const SCOPE_HISTORY: usize = SCOPE_WINDOW * 2;
/// Without key-release reporting, a piano note stops this long after the
/// last press or auto-repeat
const NOTE_HOLD: Duration = Duration::from_millis(500);
const STATUS_TIMEOUT: Duration = Duration::from_secs(4);
const FREQUENCY_STEP: f64 = 1.0;
const FREQUENCY_STEP_COARSE: f64 = 10.0;
const VOLUME_STEP: f64 = 0.05;

struct Status {
    text: String,
    is_error: bool,
    at: Instant,
}

/// UI application state
pub struct UiApp {
    session: Session<Producer<EngineMessage>>,
    store: SessionStore,
    autosave: Autosave,
    keymap: KeyMap,
    project_dir: PathBuf,
    /// Ring buffer receiver for audio samples
    scope_rx: Consumer<f32>,
    scope_buffer: Vec<f32>,
    sample_rate: f32,
    /// Index into the session's tracks
    selected: usize,
    prompt: Option<Prompt>,
    status: Option<Status>,
    /// Terminal reports key releases (kitty keyboard protocol)
    releases_reported: bool,
    /// Pending note-off when releases are not reported
    held_until: Option<Instant>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        session: Session<Producer<EngineMessage>>,
        store: SessionStore,
        autosave: Autosave,
        keymap: KeyMap,
        project_dir: PathBuf,
        scope_rx: Consumer<f32>,
        sample_rate: f32,
    ) -> Self {
        Self {
            session,
            store,
            autosave,
            keymap,
            project_dir,
            scope_rx,
            scope_buffer: vec![0.0; SCOPE_HISTORY],
            sample_rate,
            selected: 0,
            prompt: None,
            status: None,
            releases_reported: false,
            held_until: None,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        self.releases_reported = enable_key_releases();
        log::info!("key release reporting: {}", self.releases_reported);

        let res = self.event_loop(terminal);

        if self.releases_reported {
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        }
        res
    }

    /// Stop everything and write the session slot one last time
    pub fn shutdown(mut self) {
        self.session.stop_all();
        self.autosave.stop();
        self.store.save_or_warn(&self.session.snapshot());
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            let now = Instant::now();
            self.autosave.tick(now, &self.session, &self.store);
            self.release_held_note(now);
            self.expire_status(now);

            self.poll_scope();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// Poll for new audio samples from ring buffer
    fn poll_scope(&mut self) {
        let mut received = false;
        while let Ok(sample) = self.scope_rx.pop() {
            self.scope_buffer.push(sample);
            received = true;
        }
        if received && self.scope_buffer.len() > SCOPE_HISTORY {
            let excess = self.scope_buffer.len() - SCOPE_HISTORY;
            self.scope_buffer.drain(0..excess);
        }
    }

    fn release_held_note(&mut self, now: Instant) {
        if let Some(until) = self.held_until {
            if now >= until {
                self.held_until = None;
                self.apply(Command::KeyUp);
            }
        }
    }

    fn expire_status(&mut self, now: Instant) {
        if let Some(status) = &self.status {
            if now.duration_since(status.at) >= STATUS_TIMEOUT {
                self.status = None;
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if let Some(prompt) = &mut self.prompt {
            if key.kind == KeyEventKind::Release {
                return;
            }
            match prompt.handle_key(key.code) {
                PromptOutcome::Pending => {}
                PromptOutcome::Cancel => self.prompt = None,
                PromptOutcome::Submit => {
                    if let Some(prompt) = self.prompt.take() {
                        self.submit_prompt(prompt);
                    }
                }
            }
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if let KeyCode::Char(c) = key.code {
            if !ctrl {
                if let Some(offset) = self.keymap.offset(c) {
                    self.piano_key(key.kind, offset);
                    return;
                }
            }
        }

        if key.kind == KeyEventKind::Release {
            return;
        }

        let coarse = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('s') if ctrl => self.save_project(),
            KeyCode::Char('o') if ctrl => {
                let name = self.session.snapshot().file_name();
                self.prompt = Some(Prompt::new(PromptKind::LoadPath, name));
            }
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                let last = self.session.tracks().len().saturating_sub(1);
                self.selected = (self.selected + 1).min(last);
            }
            KeyCode::Enter => {
                if let Some(id) = self.selected_id() {
                    self.apply(Command::TogglePlay(id));
                }
            }
            KeyCode::Char(' ') => {
                let command = if self.session.any_playing() {
                    Command::StopAll
                } else {
                    Command::PlayAll
                };
                self.apply(command);
            }
            KeyCode::Char('+') | KeyCode::Insert => {
                if self.apply(Command::AddTrack) {
                    self.selected = self.session.tracks().len() - 1;
                }
            }
            KeyCode::Char('-') | KeyCode::Delete => {
                if let Some(id) = self.selected_id() {
                    self.apply(Command::RemoveTrack(id));
                    self.clamp_selection();
                }
            }
            KeyCode::Tab => {
                if let Some(id) = self.selected_id() {
                    self.apply(Command::CycleWaveform(id));
                }
            }
            KeyCode::Left | KeyCode::Right => {
                let step = if coarse { FREQUENCY_STEP_COARSE } else { FREQUENCY_STEP };
                let step = if key.code == KeyCode::Left { -step } else { step };
                if let Some(track) = self.selected_track() {
                    let frequency = track.frequency + step;
                    let id = track.id;
                    if frequency > 0.0 {
                        self.apply(Command::SetFrequency(id, frequency));
                    }
                }
            }
            KeyCode::PageUp | KeyCode::PageDown => {
                let step = if key.code == KeyCode::PageUp { VOLUME_STEP } else { -VOLUME_STEP };
                if let Some(track) = self.selected_track() {
                    // Snap to the step grid so repeated presses land on round values
                    let volume = ((track.volume + step) / VOLUME_STEP).round() * VOLUME_STEP;
                    let id = track.id;
                    self.apply(Command::SetVolume(id, volume));
                }
            }
            KeyCode::Char(',') => {
                let offset = self.session.global_offset() - 1.0;
                self.apply(Command::SetGlobalOffset(offset));
            }
            KeyCode::Char('.') => {
                let offset = self.session.global_offset() + 1.0;
                self.apply(Command::SetGlobalOffset(offset));
            }
            KeyCode::Char('0') => {
                self.apply(Command::SetGlobalOffset(0.0));
            }
            KeyCode::F(2) => {
                let title = self.session.project_title().to_string();
                self.prompt = Some(Prompt::new(PromptKind::ProjectTitle, title));
            }
            KeyCode::F(n @ 3..=5) => {
                if let Some(track) = self.selected_track() {
                    let prompt = match n {
                        3 => Prompt::new(PromptKind::TrackTitle(track.id), track.title.clone()),
                        4 => Prompt::new(
                            PromptKind::Frequency(track.id),
                            track.frequency.to_string(),
                        ),
                        _ => Prompt::new(PromptKind::Volume(track.id), track.volume.to_string()),
                    };
                    self.prompt = Some(prompt);
                }
            }
            _ => {}
        }
    }

    fn piano_key(&mut self, kind: KeyEventKind, offset: i32) {
        match kind {
            KeyEventKind::Press => {
                self.apply(Command::KeyDown(offset));
                if !self.releases_reported {
                    self.held_until = Some(Instant::now() + NOTE_HOLD);
                }
            }
            // Already sounding
            KeyEventKind::Repeat => {}
            KeyEventKind::Release => {
                self.apply(Command::KeyUp);
            }
        }
    }

    fn submit_prompt(&mut self, prompt: Prompt) {
        let input = prompt.input.trim().to_string();
        match prompt.kind {
            PromptKind::ProjectTitle => {
                self.apply(Command::SetProjectTitle(input));
            }
            PromptKind::TrackTitle(id) => {
                self.apply(Command::SetTrackTitle(id, input));
            }
            PromptKind::Frequency(id) => match input.parse::<f64>() {
                Ok(frequency) => {
                    self.apply(Command::SetFrequency(id, frequency));
                }
                Err(_) => self.set_error(format!("'{input}' is not a frequency")),
            },
            PromptKind::Volume(id) => match input.parse::<f64>() {
                Ok(volume) => {
                    self.apply(Command::SetVolume(id, volume));
                }
                Err(_) => self.set_error(format!("'{input}' is not a volume")),
            },
            PromptKind::LoadPath => {
                let path = self.project_dir.join(input);
                self.load_project(path);
            }
        }
    }

    fn save_project(&mut self) {
        match self.session.snapshot().save_to_dir(&self.project_dir) {
            Ok(path) => self.set_info(format!("Saved {}", path.display())),
            Err(e) => {
                log::error!("save failed: {e}");
                self.set_error(e.to_string());
            }
        }
    }

    /// Nothing changes unless the whole file parses and validates
    fn load_project(&mut self, path: PathBuf) {
        let project = match Project::load_file(&path) {
            Ok(project) => project,
            Err(e) => {
                log::error!("load failed: {e}");
                self.set_error(e.to_string());
                return;
            }
        };
        if self.apply(Command::Load(project)) {
            self.selected = 0;
            self.set_info(format!("Opened {}", path.display()));
        }
    }

    /// Apply a command, surfacing any error in the status line.
    fn apply(&mut self, command: Command) -> bool {
        match self.session.apply(command) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{e}");
                self.set_error(e.to_string());
                false
            }
        }
    }

    fn selected_track(&self) -> Option<&freq::session::TrackState> {
        self.session.tracks().get(self.selected)
    }

    fn selected_id(&self) -> Option<freq::engine::TrackId> {
        self.selected_track().map(|t| t.id)
    }

    fn clamp_selection(&mut self) {
        let last = self.session.tracks().len().saturating_sub(1);
        self.selected = self.selected.min(last);
    }

    fn set_info(&mut self, text: String) {
        self.status = Some(Status {
            text,
            is_error: false,
            at: Instant::now(),
        });
    }

    fn set_error(&mut self, text: String) {
        self.status = Some(Status {
            text,
            is_error: true,
            at: Instant::now(),
        });
    }

    /// Render the UI
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Main layout: transport, tracks, scope, status, help
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Min(4),    // Tracks
                Constraint::Length(8), // Scope
                Constraint::Length(1), // Status / prompt
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        let tracks = self.session.tracks();
        let recent = &self.scope_buffer[self.scope_buffer.len().saturating_sub(SCOPE_WINDOW)..];
        let info = TransportInfo {
            project_title: self.session.project_title(),
            offset_semitones: self.session.global_offset(),
            offset_hz: self.session.global_offset_hz(),
            playing: tracks.iter().filter(|t| t.playing).count(),
            tracks: tracks.len(),
            sample_rate: self.sample_rate,
            autosave_secs: self
                .autosave
                .is_running()
                .then(|| self.autosave.interval().as_secs_f32()),
        };
        render_transport(frame, chunks[0], &info, &AudioStats::from_buffer(recent));

        render_tracks(
            frame,
            chunks[1],
            tracks,
            self.selected,
            self.session.global_offset_hz(),
        );

        render_waveform(frame, chunks[2], &self.scope_buffer, SCOPE_WINDOW);

        if let Some(prompt) = &self.prompt {
            render_prompt(frame, chunks[3], prompt);
        } else if let Some(status) = &self.status {
            let color = if status.is_error { Color::Red } else { Color::Green };
            let line = Paragraph::new(format!(" {}", status.text))
                .style(Style::default().fg(color));
            frame.render_widget(line, chunks[3]);
        }

        let help = Paragraph::new(
            " [Q-P/A-L] Play offset  [Space] All  [Enter] Track  [+/-] Add/Del  [Tab] Wave  \
             [←/→] Hz  [PgUp/PgDn] Vol  [,/.] Offset  [F2-F5] Edit  [^S/^O] Save/Open  [Esc] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }
}

/// Ask the terminal to report key releases. Returns whether it will.
fn enable_key_releases() -> bool {
    if !matches!(crossterm::terminal::supports_keyboard_enhancement(), Ok(true)) {
        return false;
    }
    execute!(
        io::stdout(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    )
    .is_ok()
}
