//! Track list widget - one row per track, in project order

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use freq::session::TrackState;

const TITLE_WIDTH: usize = 16;
const VOLUME_BAR_WIDTH: usize = 10;

pub fn render_tracks(
    frame: &mut Frame,
    area: Rect,
    tracks: &[TrackState],
    selected: usize,
    offset_hz: f64,
) {
    let block = Block::default().title(" Tracks ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if tracks.is_empty() {
        let hint = Paragraph::new(" No tracks. Press [+] to add one.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(hint, inner);
        return;
    }

    // Keep the selected row visible
    let visible = inner.height.max(1) as usize;
    let first = selected.saturating_sub(visible - 1);

    let lines: Vec<Line> = tracks
        .iter()
        .enumerate()
        .skip(first)
        .take(visible)
        .map(|(idx, track)| track_line(track, idx == selected, offset_hz))
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn track_line(track: &TrackState, selected: bool, offset_hz: f64) -> Line<'static> {
    let base = if selected {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };

    let (marker, marker_color) = if track.playing {
        ("▶", Color::Green)
    } else {
        ("■", Color::DarkGray)
    };

    let title = if track.title.chars().count() > TITLE_WIDTH {
        let cut: String = track.title.chars().take(TITLE_WIDTH - 1).collect();
        format!("{cut}…")
    } else {
        format!("{:width$}", track.title, width = TITLE_WIDTH)
    };

    let filled = (track.volume * VOLUME_BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(VOLUME_BAR_WIDTH);
    let volume_bar = format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(VOLUME_BAR_WIDTH - filled)
    );

    let effective = (track.frequency + offset_hz).max(0.0);

    Line::from(vec![
        Span::styled(format!(" {marker} "), base.fg(marker_color)),
        Span::styled(format!("{title}  "), base.fg(Color::White)),
        Span::styled(format!("{:<9}", track.waveform.as_str()), base.fg(Color::Cyan)),
        Span::styled(format!("{:>9.2} Hz", track.frequency), base.fg(Color::White)),
        Span::styled(format!(" → {:>9.2} Hz  ", effective), base.fg(Color::DarkGray)),
        Span::styled(volume_bar, base.fg(Color::Magenta)),
        Span::styled(format!(" {:.2}", track.volume), base.fg(Color::Magenta)),
    ])
}
