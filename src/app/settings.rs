//! Settings menu model (data only).
//!
//! Keeping these definitions outside the input handler lets both the handler
//! and UI renderers consume the same source of truth without cross-importing.

use super::state::{ActiveView, AppState};

/// A single item in the settings menu.
pub enum SettingsItem {
    /// Opens a submenu.
    Submenu {
        label: &'static str,
        view: ActiveView,
    },
    /// Boolean toggle: reads/writes via accessors on `AppState`.
    Toggle {
        label: &'static str,
        get: fn(&AppState) -> bool,
        set: fn(&mut AppState, bool),
    },
    /// Cycles through a finite set of values.
    Cycle {
        label: &'static str,
        value: fn(&AppState) -> String,
        cycle: fn(&mut AppState),
    },
}

impl SettingsItem {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Submenu { label, .. }
            | Self::Toggle { label, .. }
            | Self::Cycle { label, .. } => label,
        }
    }
}

fn save(state: &mut AppState) {
    if let Err(err) = state.config.save() {
        tracing::warn!("cannot save config: {err:#}");
        state.status_message = Some(format!("Config not saved: {err}"));
    }
}

/// Show or hide the survey overlay and remember the choice.
pub fn set_show_survey(state: &mut AppState, show: bool) {
    state.config.show_survey = show;
    save(state);
}

/// All items shown in the settings popup, in display order.
pub static SETTINGS_ITEMS: &[SettingsItem] = &[
    SettingsItem::Submenu {
        label: "Controls",
        view: ActiveView::ControlsSubmenu,
    },
    SettingsItem::Toggle {
        label: "Discard Stale Seeks",
        get: |s| s.config.discard_stale_seeks,
        set: |s, v| {
            s.set_discard_stale_seeks(v);
            save(s);
        },
    },
    SettingsItem::Toggle {
        label: "Survey Overlay",
        get: |s| s.config.show_survey,
        set: set_show_survey,
    },
    SettingsItem::Cycle {
        label: "Scroll Step",
        value: |s| format!("{} rows", s.config.scroll_step),
        cycle: |s| {
            const STEPS: &[u16] = &[1, 2, 3, 5, 8];
            let idx = STEPS
                .iter()
                .position(|&w| w == s.config.scroll_step)
                .unwrap_or(1);
            let next = STEPS[(idx + 1) % STEPS.len()];
            s.config.scroll_step = next;
            save(s);
            s.status_message = Some(format!("Scroll step: {next} rows"));
        },
    },
];
