//! Transport bar widget - project title, offset, autosave state and audio stats

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// Everything the transport bar shows, gathered by the app each frame
pub struct TransportInfo<'a> {
    pub project_title: &'a str,
    pub offset_semitones: f64,
    pub offset_hz: f64,
    pub playing: usize,
    pub tracks: usize,
    pub sample_rate: f32,
    /// `None` when autosave is stopped
    pub autosave_secs: Option<f32>,
}

/// Render the transport bar
pub fn render_transport(frame: &mut Frame, area: Rect, info: &TransportInfo, stats: &AudioStats) {
    let block = Block::default()
        .title(format!(" {} ", info.project_title))
        .borders(Borders::ALL);

    let play_symbol = if info.playing > 0 { "▶" } else { "■" };
    let sample_rate_khz = info.sample_rate / 1000.0;
    let autosave = match info.autosave_secs {
        Some(secs) => format!("autosave {secs:.0}s  "),
        None => "autosave off  ".to_string(),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} {}/{} playing  ", play_symbol, info.playing, info.tracks),
            Style::default().fg(if info.playing > 0 {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::styled(
            format!(
                "Offset {:+} st ({:+.2} Hz)  ",
                info.offset_semitones, info.offset_hz
            ),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{:.1}kHz  ", sample_rate_khz),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(autosave, Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", stats.peak, stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
