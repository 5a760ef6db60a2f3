//! Common UI components shared across panels.
//!
//! This module contains the header bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::host::RuntimeStatus;

/// Render the header bar.
///
/// Displays: connection badge, subscribed broker, introspection source.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let bus = &app.context().settings().bus;
    let connected = app.connection.connected;

    let mut spans = vec![
        Span::styled(" ● ", app.theme.connection_style(connected)),
        Span::styled("BENCHWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(app.connection.badge(), app.theme.connection_style(connected)),
        Span::raw(" │ "),
        Span::styled(bus.describe(), Style::default().add_modifier(Modifier::DIM)),
        Span::raw(" │ "),
    ];

    match &app.runtime_status {
        RuntimeStatus::Available => spans.push(Span::raw("docker")),
        RuntimeStatus::Unavailable(_) => {
            spans.push(Span::styled("ps fallback", Style::default().fg(app.theme.warning)))
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the container runtime alert shown while docker is unusable.
pub fn render_runtime_alert(frame: &mut Frame, app: &App, area: Rect) {
    let Some(reason) = app.runtime_status.reason() else {
        return;
    };

    let line = Line::from(vec![
        Span::styled(" ⚠ ", Style::default().fg(app.theme.warning)),
        Span::styled(
            format!("{} - showing host processes instead of containers", reason),
            Style::default().fg(app.theme.warning),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
///
/// Shows: latency sample count, selected entity, available controls.
/// Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let selected = app.selected_entity().unwrap_or("none");
    let status = format!(
        " {} latency samples | {} entities | selected: {} | ↑↓:select r:refresh ?:help q:quit",
        app.latency_points,
        app.entities.len(),
        selected,
    );

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the dashboard.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Entities",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ↑/↓ j/k     Select entity"),
        Line::from("  r           Refresh entity list"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ?           Toggle help"),
        Line::from("  q Esc       Quit"),
        Line::from("  Ctrl-C      Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 40u16.min(area.width.saturating_sub(4));
    let help_height = 16u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(ratatui::widgets::Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
