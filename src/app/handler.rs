//! Input handling: maps key/mouse events to state mutations.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

use crate::config::{Action, KeyBind};

use super::map_runtime::MapUpdate;
use super::settings::{set_show_survey, SettingsItem, SETTINGS_ITEMS};
use super::state::{ActiveView, AppState};

/// Share of the window scrolled by a page step.
const PAGE_FRACTION: f64 = 0.8;

/// Total selectable rows in the controls submenu (actions + "Reset").
pub fn controls_item_count() -> usize {
    Action::ALL.len() + 1
}

/// Process a key event, dispatching based on the active view.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    // Ctrl+c always quits, regardless of view.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    match state.active_view {
        ActiveView::Story => handle_story_key(state, key),
        ActiveView::SettingsMenu => handle_settings_key(state, key),
        ActiveView::ControlsSubmenu => {
            if state.awaiting_rebind {
                handle_rebind_key(state, key);
            } else {
                handle_controls_key(state, key);
            }
        }
    }
}

/// Route a map-side answer back into the state.
pub fn handle_map_update(state: &mut AppState, update: MapUpdate) {
    state.apply_map_update(update);
}

// ── Story view (configurable bindings) ──────────────────────────

fn page_rows(state: &AppState) -> isize {
    let rows = (f64::from(state.window_rows) * PAGE_FRACTION).round() as isize;
    rows.max(1)
}

fn handle_story_key(state: &mut AppState, key: KeyEvent) {
    // Document ends are fixed keys, not rebindable.
    match key.code {
        KeyCode::Home => {
            state.scroll_to(0);
            return;
        }
        KeyCode::End => {
            state.scroll_to(usize::MAX);
            return;
        }
        _ => {}
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };
    let step = state.config.scroll_step as isize;
    match action {
        Action::ScrollDown => state.scroll_by(step),
        Action::ScrollUp => state.scroll_by(-step),
        Action::PageDown => {
            let rows = page_rows(state);
            state.scroll_by(rows);
        }
        Action::PageUp => {
            let rows = page_rows(state);
            state.scroll_by(-rows);
        }
        Action::NextSection => state.jump_section(true),
        Action::PrevSection => state.jump_section(false),
        Action::ToggleSurvey => {
            let show = !state.config.show_survey;
            set_show_survey(state, show);
        }
        Action::OpenSettings => {
            state.active_view = ActiveView::SettingsMenu;
            state.settings_selected = 0;
        }
        Action::Quit => state.should_quit = true,
    }
}

// ── Settings menu (hardcoded keys) ──────────────────────────────

fn handle_settings_key(state: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            state.active_view = ActiveView::Story;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.settings_selected = state.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.settings_selected + 1 < SETTINGS_ITEMS.len() {
                state.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
            if let Some(item) = SETTINGS_ITEMS.get(state.settings_selected) {
                match item {
                    SettingsItem::Submenu { view, .. } => {
                        state.active_view = *view;
                        state.controls_selected = 0;
                    }
                    SettingsItem::Toggle { get, set, .. } => {
                        let current = get(state);
                        set(state, !current);
                    }
                    SettingsItem::Cycle { cycle, .. } => cycle(state),
                }
            }
        }
        _ => {}
    }
}

// ── Controls submenu (hardcoded navigation, interactive rebinding) ──

fn save_config(state: &mut AppState) {
    if let Err(err) = state.config.save() {
        tracing::warn!("cannot save config: {err:#}");
        state.status_message = Some(format!("Config not saved: {err}"));
    }
}

fn handle_controls_key(state: &mut AppState, key: KeyEvent) {
    let item_count = controls_item_count();

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            state.active_view = ActiveView::Story;
        }
        KeyCode::Left | KeyCode::Char('h') => {
            state.active_view = ActiveView::SettingsMenu;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.controls_selected = state.controls_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.controls_selected + 1 < item_count {
                state.controls_selected += 1;
            }
        }
        KeyCode::Enter => {
            if state.controls_selected < Action::ALL.len() {
                state.awaiting_rebind = true;
            } else {
                state.config.reset_defaults();
                save_config(state);
            }
        }
        KeyCode::Delete | KeyCode::Backspace => {
            if let Some(&action) = Action::ALL.get(state.controls_selected) {
                state.config.bindings.insert(action, Vec::new());
                save_config(state);
            }
        }
        _ => {}
    }
}

/// Capture the next key press as a new binding.
fn handle_rebind_key(state: &mut AppState, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.code == KeyCode::Esc {
        state.awaiting_rebind = false;
        return;
    }
    // Ctrl+C stays reserved for quitting.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return;
    }

    if let Some(&action) = Action::ALL.get(state.controls_selected) {
        state.config.add_binding(action, KeyBind::from_key_event(key));
        save_config(state);
    }
    state.awaiting_rebind = false;
}

// ── Mouse ───────────────────────────────────────────────────────

/// Process a mouse event.  Only the wheel does anything, and only in the
/// story view.
pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    if state.active_view != ActiveView::Story {
        return;
    }
    let step = state.config.scroll_step as isize;
    match mouse.kind {
        MouseEventKind::ScrollDown => state.scroll_by(step),
        MouseEventKind::ScrollUp => state.scroll_by(-step),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::story::script::StoryScript;
    use crossterm::event::{KeyEventState, MouseButton};
    use ratatui::layout::Rect;
    use std::sync::Once;
    use tokio::sync::mpsc;

    /// Keep config writes out of the user's real config directory.
    fn isolate_config_home() {
        static ONCE: Once = Once::new();
        ONCE.call_once(|| {
            let dir = std::env::temp_dir().join(format!("scroll-story-test-{}", std::process::id()));
            std::env::set_var("XDG_CONFIG_HOME", dir);
        });
    }

    fn state() -> AppState {
        isolate_config_home();
        let (tx, _rx) = mpsc::unbounded_channel();
        let script = StoryScript::builtin().unwrap();
        AppState::new(script, AppConfig::default(), Rect::new(0, 0, 100, 41), tx)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn wheel(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_scroll_keys_move_by_step() {
        let mut state = state();
        handle_key(&mut state, press(KeyCode::Char('j')));
        assert_eq!(state.scroll, 2);
        handle_key(&mut state, press(KeyCode::Up));
        assert_eq!(state.scroll, 0);
        handle_key(&mut state, press(KeyCode::End));
        assert_eq!(state.scroll, state.document.max_scroll(state.window_rows));
        handle_key(&mut state, press(KeyCode::Home));
        assert_eq!(state.scroll, 0);
    }

    #[test]
    fn test_page_down_moves_most_of_a_window() {
        let mut state = state();
        handle_key(&mut state, press(KeyCode::PageDown));
        assert_eq!(state.scroll, 32);
    }

    #[test]
    fn test_mouse_wheel_scrolls_only_in_story_view() {
        let mut state = state();
        handle_mouse(&mut state, wheel(MouseEventKind::ScrollDown));
        assert_eq!(state.scroll, 2);
        handle_mouse(&mut state, wheel(MouseEventKind::Down(MouseButton::Left)));
        assert_eq!(state.scroll, 2);

        state.active_view = ActiveView::SettingsMenu;
        handle_mouse(&mut state, wheel(MouseEventKind::ScrollDown));
        assert_eq!(state.scroll, 2);
    }

    #[test]
    fn test_settings_navigation() {
        let mut state = state();
        handle_key(&mut state, press(KeyCode::Char('?')));
        assert_eq!(state.active_view, ActiveView::SettingsMenu);
        handle_key(&mut state, press(KeyCode::Enter));
        assert_eq!(state.active_view, ActiveView::ControlsSubmenu);
        handle_key(&mut state, press(KeyCode::Left));
        assert_eq!(state.active_view, ActiveView::SettingsMenu);
        handle_key(&mut state, press(KeyCode::Esc));
        assert_eq!(state.active_view, ActiveView::Story);
    }

    #[test]
    fn test_survey_toggle_and_quit() {
        let mut state = state();
        handle_key(&mut state, press(KeyCode::Char('s')));
        assert!(state.config.show_survey);
        // The key toggle persists just like the settings menu entry.
        assert!(AppConfig::load().show_survey);
        assert_eq!(state.status_message, None);
        handle_key(&mut state, press(KeyCode::Char('q')));
        assert!(state.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_from_any_view() {
        let mut state = state();
        state.active_view = ActiveView::ControlsSubmenu;
        state.awaiting_rebind = true;
        let key = KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        };
        handle_key(&mut state, key);
        assert!(state.should_quit);
    }
}
