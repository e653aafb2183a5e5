//! Oscilloscope widget with rising-edge trigger

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Index of the first upward zero crossing in the first half of `buffer`,
/// so successive frames line up. Falls back to the start.
fn trigger_index(buffer: &[f32]) -> usize {
    let search = buffer.len() / 2;
    buffer[..search.min(buffer.len())]
        .windows(2)
        .position(|w| w[0] <= 0.0 && w[1] > 0.0)
        .map(|i| i + 1)
        .unwrap_or(0)
}

/// Render the oscilloscope, showing `window` samples after the trigger point
pub fn render_waveform(frame: &mut Frame, area: Rect, audio_buffer: &[f32], window: usize) {
    let block = Block::default().title(" Scope ").borders(Borders::ALL);

    let start = trigger_index(audio_buffer);
    let end = (start + window).min(audio_buffer.len());
    let shown = &audio_buffer[start..end];

    let data: Vec<(f64, f64)> = shown
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64 / window.max(1) as f64, sample as f64))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
