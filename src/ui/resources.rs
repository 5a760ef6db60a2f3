//! Entity list and per-entity resource charts.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, List, ListItem, ListState},
    Frame,
};

use crate::app::App;
use crate::data::Metric;
use crate::ui::render_placeholder;

const METRICS: [Metric; 4] = [Metric::Cpu, Metric::Memory, Metric::NetRx, Metric::NetTx];

/// Render the entity list beside a 2x2 grid of resource charts.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let [list_area, charts_area] =
        Layout::horizontal([Constraint::Length(32), Constraint::Min(20)]).areas(area);

    render_entity_list(frame, app, list_area);

    let [top, bottom] =
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(charts_area);
    let [cpu, mem] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(top);
    let [rx, tx] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(bottom);

    for (metric, chart_area) in METRICS.into_iter().zip([cpu, mem, rx, tx]) {
        render_metric(frame, app, metric, chart_area);
    }
}

fn render_entity_list(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" Entities ({}) ", app.entities.len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if app.entities.is_empty() {
        render_placeholder(frame, block, "No containers or processes found", &app.theme, area);
        return;
    }

    let items: Vec<ListItem> = app.entities.iter().map(|e| ListItem::new(e.as_str())).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    state.select(app.selected_index);
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_metric(frame: &mut Frame, app: &App, metric: Metric, area: Rect) {
    let value = app.metric_display(metric);
    let title = Line::from(vec![
        Span::styled(format!(" {} ", metric.title()), app.theme.header),
        Span::raw(format!("{} ", value)),
    ]);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let Some(series) = app.resource_series(metric) else {
        render_placeholder(frame, block, "Select a process to monitor", &app.theme, area);
        return;
    };
    if series.len() < 2 {
        render_placeholder(frame, block, "Collecting data...", &app.theme, area);
        return;
    }

    let dataset = Dataset::default()
        .name(metric.unit())
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(app.theme.metric_color(metric)))
        .graph_type(GraphType::Line)
        .data(&series.points);

    let x_labels = vec![Span::raw("0s"), Span::raw(format!("{:.0}s", series.x_max))];
    let y_labels = vec![Span::raw("0"), Span::raw(format!("{:.0}", series.y_max))];

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(Axis::default().bounds([0.0, series.x_max]).labels(x_labels))
        .y_axis(Axis::default().bounds([0.0, series.y_max]).labels(y_labels));

    frame.render_widget(chart, area);
}
