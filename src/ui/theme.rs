//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

use crate::story::actions::ExcludedEffect;

/// Central theme; change colours here and they propagate everywhere.
pub struct Theme;

impl Theme {
    // ── narrative ──────────────────────────────────────────────
    pub fn heading_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn section_title_style(current: bool) -> Style {
        let style = Style::default().add_modifier(Modifier::BOLD);
        if current {
            style.fg(Color::Cyan)
        } else {
            style.fg(Color::Gray)
        }
    }

    pub fn text_style(current: bool) -> Style {
        if current {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    }

    // ── map ────────────────────────────────────────────────────
    pub fn marker_color() -> Color {
        Color::Yellow
    }

    /// Markers outside the active filter, per the entry action's effect.
    pub fn excluded_marker_color(effect: ExcludedEffect) -> Color {
        if effect.opacity < 0.5 {
            Color::DarkGray
        } else if effect.grayscale >= 0.5 {
            Color::Gray
        } else {
            Self::marker_color()
        }
    }

    pub fn route_color() -> Color {
        Color::LightRed
    }

    /// Trails stand out from the access roads leading to them.
    pub fn hiking_color(kind: Option<&str>) -> Color {
        match kind {
            Some("trail") => Color::LightGreen,
            _ => Color::Green,
        }
    }

    pub fn bookmark_label_style() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::ITALIC)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }

    pub fn status_message_style() -> Style {
        Style::default().fg(Color::Yellow)
    }
}
