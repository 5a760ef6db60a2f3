//! Terminal rendering.
//!
//! - [`common`]: header with the connection badge, status bar, help overlay
//! - [`latency`]: end-to-end latency chart
//! - [`resources`]: entity list and per-entity resource charts
//! - [`theme`]: light/dark color themes

pub mod common;
pub mod latency;
pub mod resources;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Rect},
    text::Line,
    widgets::{Block, Paragraph},
    Frame,
};

/// Render a bordered block holding a centered placeholder message.
pub(crate) fn render_placeholder(frame: &mut Frame, block: Block, message: &str, theme: &Theme, area: Rect) {
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let y = inner.y + inner.height / 2;
    let line_area = Rect::new(inner.x, y, inner.width, 1.min(inner.height));
    let paragraph = Paragraph::new(Line::from(message))
        .style(theme.placeholder)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, line_area);
}
