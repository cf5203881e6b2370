//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! This layer takes the app state and turns it into cells on the terminal.
//! Nothing here mutates the story.

pub mod layout;
pub mod map_widget;
pub mod popup;
pub mod spinner;
pub mod story_widget;
pub mod survey_widget;
pub mod theme;

use ratatui::{widgets::Paragraph, Frame};

use crate::app::state::{ActiveView, AppState};

use self::layout::AppLayout;
use self::map_widget::MapWidget;
use self::story_widget::StoryWidget;
use self::survey_widget::SurveyWidget;
use self::theme::Theme;

/// Draw one frame.
pub fn draw(frame: &mut Frame, state: &AppState) {
    let layout = AppLayout::from_area(frame.area());

    let current = state
        .controller
        .current_section()
        .and_then(|id| state.document.section_index(id));
    frame.render_widget(
        StoryWidget {
            document: &state.document,
            scroll: state.scroll,
            current,
        },
        layout.story_area,
    );

    frame.render_widget(
        MapWidget {
            map: &state.map,
            pois: &state.script.pois,
            hiking: &state.script.hiking,
            route: state.controller.animated_layer(),
            tick: state.tick,
        },
        layout.map_area,
    );

    if state.config.show_survey {
        frame.render_widget(
            SurveyWidget {
                controller: &state.controller,
                last_outcome: state.last_outcome.as_ref(),
                last_seek: state.last_seek.as_ref(),
            },
            layout.story_area,
        );
    }

    let hint = state.config.status_bar_hint();
    let status_text = match state.active_view {
        ActiveView::Story => state.status_message.as_deref().unwrap_or(&hint),
        ActiveView::SettingsMenu | ActiveView::ControlsSubmenu => "",
    };
    frame.render_widget(
        Paragraph::new(status_text).style(Theme::status_bar_style()),
        layout.status_area,
    );

    match state.active_view {
        ActiveView::SettingsMenu => {
            frame.render_widget(popup::SettingsPopup { state }, frame.area());
        }
        ActiveView::ControlsSubmenu => {
            frame.render_widget(
                popup::ControlsPopup {
                    config: &state.config,
                    selected: state.controls_selected,
                    awaiting_rebind: state.awaiting_rebind,
                },
                frame.area(),
            );
        }
        ActiveView::Story => {}
    }
}
