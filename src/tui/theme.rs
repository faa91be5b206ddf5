//! Centralized color theme for the invoicer TUI.
//!
//! All color constants are RGB truecolor. Views import from here
//! instead of using inline `Color::*` literals.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};

// ── Primary palette ─────────────────────────────────────────────────────────

/// Indigo: primary accent and focused borders.
pub const PRIMARY: Color = Color::Rgb(0x5C, 0x6B, 0xC0);
/// Light indigo: highlights, hints.
pub const PRIMARY_LIGHT: Color = Color::Rgb(0x9F, 0xA8, 0xDA);

// ── Accent ──────────────────────────────────────────────────────────────────

/// Amber: calls to action, prices.
pub const ACCENT: Color = Color::Rgb(0xFF, 0xB3, 0x00);

// ── Backgrounds ─────────────────────────────────────────────────────────────

pub const BG_BASE: Color = Color::Rgb(0x12, 0x12, 0x1C);
/// Badge background.
pub const BG_BADGE: Color = Color::Rgb(0x2A, 0x2D, 0x3E);

// ── Text ────────────────────────────────────────────────────────────────────

pub const TEXT: Color = Color::Rgb(0xE6, 0xE6, 0xE6);
/// Secondary labels, descriptions.
pub const TEXT_MUTED: Color = Color::Rgb(0x8A, 0x8A, 0x8A);
/// Disabled items, faint hints.
pub const TEXT_DIM: Color = Color::Rgb(0x55, 0x55, 0x55);

// ── Semantic ────────────────────────────────────────────────────────────────

pub const ERROR: Color = Color::Rgb(0xEF, 0x53, 0x50);
pub const SUCCESS: Color = Color::Rgb(0x66, 0xBB, 0x6A);
pub const WARNING: Color = Color::Rgb(0xFF, 0xA7, 0x26);
pub const INFO: Color = Color::Rgb(0x42, 0xA5, 0xF5);

// ── Domain ──────────────────────────────────────────────────────────────────

/// Product icon tint.
pub const PRODUCT: Color = Color::Rgb(0x4D, 0xB6, 0xAC);
/// Service icon tint.
pub const SERVICE: Color = Color::Rgb(0xBA, 0x68, 0xC8);

// ── Style helpers ───────────────────────────────────────────────────────────

/// Bold accent text (titles).
pub fn title() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

/// Section header style.
pub fn heading() -> Style {
    Style::default().fg(PRIMARY_LIGHT).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(PRIMARY)
}

pub fn border_default() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Highlighted/selected item.
pub fn highlight() -> Style {
    Style::default()
        .fg(BG_BASE)
        .bg(PRIMARY_LIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(TEXT_MUTED)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Key hint style (e.g., "Ctrl+V").
pub fn key_hint() -> Style {
    Style::default().fg(PRIMARY_LIGHT)
}

/// Category badge.
pub fn badge() -> Style {
    Style::default().fg(TEXT).bg(BG_BADGE)
}

/// Price text.
pub fn price() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

/// Facet button, selected or not.
pub fn facet(active: bool) -> Style {
    if active {
        Style::default()
            .fg(BG_BASE)
            .bg(PRIMARY)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_MUTED)
    }
}

/// Status bar brand badge.
pub fn brand_badge() -> Style {
    Style::default()
        .fg(BG_BASE)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

// ── Block builders ──────────────────────────────────────────────────────────

/// A bordered block with focused styling.
pub fn block_focused(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_focused())
}

/// A bordered block with default (unfocused) styling.
pub fn block_default(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_default())
}
