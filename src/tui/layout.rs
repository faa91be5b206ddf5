//! Root layout, viewport classification and overlay placement.

use ratatui::layout::{Constraint, Layout, Rect};

/// Default width (columns) below which the viewport counts as narrow.
pub const DEFAULT_NARROW_BELOW: u16 = 80;
/// Maximum modal width on wide viewports.
pub const MODAL_MAX_WIDTH: u16 = 100;
/// Drawer height as a percentage of the terminal.
pub const DRAWER_HEIGHT_PERCENT: u16 = 95;

/// Narrow vs. wide presentation, derived from the terminal width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportClass {
    Narrow,
    Wide,
}

impl ViewportClass {
    pub fn classify(width: u16, narrow_below: u16) -> Self {
        if width < narrow_below {
            Self::Narrow
        } else {
            Self::Wide
        }
    }

    pub fn is_narrow(self) -> bool {
        self == Self::Narrow
    }
}

/// Computed layout regions for a single frame.
pub struct AppLayout {
    /// Title row.
    pub header: Rect,
    /// Main content area.
    pub main: Rect,
    /// Status bar (bottom row).
    pub status: Rect,
}

impl AppLayout {
    pub fn compute(area: Rect) -> Self {
        let rows = Layout::vertical([
            Constraint::Length(1), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        AppLayout {
            header: rows[0],
            main: rows[1],
            status: rows[2],
        }
    }
}

/// Centered dialog: up to `MODAL_MAX_WIDTH` wide, ~80% tall.
pub fn modal_rect(area: Rect) -> Rect {
    let width = (area.width * 90 / 100).clamp(area.width.min(40), MODAL_MAX_WIDTH.min(area.width));
    let height = (area.height * 80 / 100).max(area.height.min(12));
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

/// Bottom-anchored drawer spanning the full width.
pub fn drawer_rect(area: Rect) -> Rect {
    let height = (area.height * DRAWER_HEIGHT_PERCENT / 100).max(1).min(area.height);
    Rect::new(area.x, area.y + area.height - height, area.width, height)
}

/// Where an overlay surface goes for the given viewport.
pub fn overlay_rect(area: Rect, viewport: ViewportClass) -> Rect {
    match viewport {
        ViewportClass::Wide => modal_rect(area),
        ViewportClass::Narrow => drawer_rect(area),
    }
}

/// Calculate a centered rect using percentage of parent area.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}
