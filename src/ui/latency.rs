//! End-to-end latency chart.

use ratatui::{
    layout::Rect,
    style::Style,
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use crate::app::App;
use crate::ui::render_placeholder;

/// Render latency samples over arrival time.
///
/// Shows "Waiting for data..." until the first sample arrives.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(Span::styled(" End-to-end Latency (ms) ", app.theme.header))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let series = &app.latency;
    if series.is_empty() {
        render_placeholder(frame, block, "Waiting for data...", &app.theme, area);
        return;
    }

    let last = series.points.last().map(|(_, y)| *y).unwrap_or_default();
    let dataset = Dataset::default()
        .name(format!("latency {:.0} ms", last))
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(app.theme.latency))
        .graph_type(GraphType::Line)
        .data(&series.points);

    let x_labels = vec![Span::raw("0s"), Span::raw(format!("{:.0}s", series.x_max))];
    let y_labels = vec![
        Span::raw("0"),
        Span::raw(format!("{:.0}", series.y_max / 2.0)),
        Span::raw(format!("{:.0}", series.y_max)),
    ];

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(Axis::default().bounds([0.0, series.x_max]).labels(x_labels))
        .y_axis(Axis::default().bounds([0.0, series.y_max]).labels(y_labels));

    frame.render_widget(chart, area);
}
