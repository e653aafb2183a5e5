//! Single-line text entry for titles, numbers and file paths

use crossterm::event::KeyCode;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use freq::engine::TrackId;

/// What the entered text will be used for
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PromptKind {
    ProjectTitle,
    TrackTitle(TrackId),
    Frequency(TrackId),
    Volume(TrackId),
    LoadPath,
}

pub enum PromptOutcome {
    Pending,
    Submit,
    Cancel,
}

pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

impl Prompt {
    pub fn new(kind: PromptKind, initial: impl Into<String>) -> Self {
        Self {
            kind,
            input: initial.into(),
        }
    }

    fn label(&self) -> &'static str {
        match self.kind {
            PromptKind::ProjectTitle => "Project title",
            PromptKind::TrackTitle(_) => "Track title",
            PromptKind::Frequency(_) => "Frequency (Hz)",
            PromptKind::Volume(_) => "Volume (0-1)",
            PromptKind::LoadPath => "Open project",
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self.kind, PromptKind::Frequency(_) | PromptKind::Volume(_))
    }

    /// Numeric prompts take digits and a single decimal point
    fn accepts(&self, c: char) -> bool {
        if c.is_control() {
            return false;
        }
        if !self.is_numeric() {
            return true;
        }
        c.is_ascii_digit() || (c == '.' && !self.input.contains('.'))
    }

    pub fn handle_key(&mut self, code: KeyCode) -> PromptOutcome {
        match code {
            KeyCode::Enter => PromptOutcome::Submit,
            KeyCode::Esc => PromptOutcome::Cancel,
            KeyCode::Backspace => {
                self.input.pop();
                PromptOutcome::Pending
            }
            KeyCode::Char(c) if self.accepts(c) => {
                self.input.push(c);
                PromptOutcome::Pending
            }
            _ => PromptOutcome::Pending,
        }
    }
}

pub fn render_prompt(frame: &mut Frame, area: Rect, prompt: &Prompt) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {}: ", prompt.label()),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(prompt.input.as_str()),
        Span::styled("▏", Style::default().fg(Color::Yellow)),
        Span::styled(
            "   [Enter] OK  [Esc] Cancel",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
