//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::Metric;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for degraded states such as a missing container runtime.
    pub warning: Color,
    /// Color for errors and a lost broker connection.
    pub critical: Color,
    /// Color for a live broker connection.
    pub healthy: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Line color of the latency chart.
    pub latency: Color,
    /// Line colors of the CPU, memory, RX and TX charts.
    pub metrics: [Color; 4],
    /// Style for titles and headers.
    pub header: Style,
    /// Style for the selected entity.
    pub selected: Style,
    /// Style for placeholder text inside empty charts.
    pub placeholder: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::Gray,
            latency: Color::Cyan,
            metrics: [Color::LightRed, Color::LightBlue, Color::LightGreen, Color::LightMagenta],
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            placeholder: Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            warning: Color::Yellow,
            critical: Color::Red,
            healthy: Color::Green,
            border: Color::DarkGray,
            latency: Color::Blue,
            metrics: [Color::Red, Color::Blue, Color::Green, Color::Magenta],
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            placeholder: Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Style for the broker connection badge
    pub fn connection_style(&self, connected: bool) -> Style {
        if connected {
            Style::default().fg(self.healthy)
        } else {
            Style::default().fg(self.critical).add_modifier(Modifier::BOLD)
        }
    }

    pub fn metric_color(&self, metric: Metric) -> Color {
        match metric {
            Metric::Cpu => self.metrics[0],
            Metric::Memory => self.metrics[1],
            Metric::NetRx => self.metrics[2],
            Metric::NetTx => self.metrics[3],
        }
    }
}
