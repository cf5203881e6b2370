//! Debug overlay: the latest section survey and the outcome of the last tick.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::story::engine::{SeekOutcome, StoryController, TickOutcome};
use crate::story::survey::ACTIVATION_THRESHOLD;

use super::theme::Theme;

const WIDTH: u16 = 38;

pub struct SurveyWidget<'a> {
    pub controller: &'a StoryController,
    pub last_outcome: Option<&'a TickOutcome>,
    pub last_seek: Option<&'a SeekOutcome>,
}

/// One-line summary of a feature-id resolution.
pub fn describe_seek(seek: Option<&SeekOutcome>) -> String {
    match seek {
        None => "no seek yet".into(),
        Some(SeekOutcome::Applied { feature, progress }) => {
            format!("route #{feature} drawn to {:.0}%", progress * 100.0)
        }
        Some(SeekOutcome::Stale) => "stale answer dropped".into(),
        Some(SeekOutcome::Skipped) => "seek skipped".into(),
    }
}

/// One-line summary of a tick outcome.
pub fn describe_outcome(outcome: Option<&TickOutcome>) -> String {
    match outcome {
        None | Some(TickOutcome::Idle) => "idle".into(),
        Some(TickOutcome::Entered { section, applied: true }) => format!("entered {section}"),
        Some(TickOutcome::Entered { section, applied: false }) => {
            format!("entered {section} (no action)")
        }
        Some(TickOutcome::ProgressRequested { section, ordinal }) => {
            format!("{section}: seek feature #{ordinal}")
        }
        Some(TickOutcome::NoAnimation { section }) => format!("{section}: static"),
        Some(TickOutcome::AnimationPending { section }) => format!("{section}: route pending"),
    }
}

impl Widget for SurveyWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let registry = self.controller.registry();
        let height = (registry.len().max(1) as u16 + 8).min(area.height);
        let width = WIDTH.min(area.width);
        let rect = Rect::new(area.right().saturating_sub(width), area.y, width, height);
        Clear.render(rect, buf);

        let block = Block::default()
            .title(Span::styled(" Survey ", Theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border_style());
        let inner = block.inner(rect);
        block.render(rect, buf);

        let current = self.controller.current_section();
        let mut lines: Vec<Line> = registry
            .sections
            .iter()
            .map(|s| {
                let is_current = current == Some(s.id.as_str());
                let marker = if is_current { "▸" } else { " " };
                let style = if is_current {
                    Style::default().fg(Color::Cyan)
                } else if s.percentage_top < ACTIVATION_THRESHOLD {
                    Style::default().fg(Color::White)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                Line::from(Span::styled(
                    format!("{marker} {:<14} {:>5.0} {:>7.1}%", s.id, s.top, s.percentage_top * 100.0),
                    style,
                ))
            })
            .collect();

        let dim = Style::default().fg(Color::DarkGray);
        if registry.is_empty() {
            lines.push(Line::from(Span::styled("no sections measured yet", dim)));
        }
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            describe_outcome(self.last_outcome),
            Theme::status_message_style(),
        )));
        lines.push(Line::from(Span::styled(describe_seek(self.last_seek), dim)));
        lines.push(Line::from(Span::styled(
            format!("last entry: {}", self.controller.previous_section().unwrap_or("-")),
            dim,
        )));
        lines.push(Line::from(Span::styled(
            format!(
                "gen {} · stale seeks {}",
                self.controller.generation(),
                if self.controller.discard_stale_seeks() { "dropped" } else { "kept" },
            ),
            dim,
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_outcome() {
        assert_eq!(describe_outcome(None), "idle");
        assert_eq!(
            describe_outcome(Some(&TickOutcome::ProgressRequested {
                section: "a".into(),
                ordinal: 0,
            })),
            "a: seek feature #0"
        );
        assert_eq!(
            describe_outcome(Some(&TickOutcome::Entered {
                section: "b".into(),
                applied: false,
            })),
            "entered b (no action)"
        );
    }

    #[test]
    fn test_describe_seek() {
        assert_eq!(describe_seek(None), "no seek yet");
        assert_eq!(
            describe_seek(Some(&SeekOutcome::Applied { feature: 1, progress: 0.25 })),
            "route #1 drawn to 25%"
        );
        assert_eq!(describe_seek(Some(&SeekOutcome::Stale)), "stale answer dropped");
    }
}
