//! User configuration: keybindings, scroll behaviour and persistence.
//!
//! Settings are stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/scroll-story/config.toml` (default
//! `~/.config/scroll-story/config.toml`).

use std::collections::HashMap;
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions in the story view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    NextSection,
    PrevSection,
    ToggleSurvey,
    OpenSettings,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used for the controls menu).
    pub const ALL: &[Action] = &[
        Action::ScrollDown,
        Action::ScrollUp,
        Action::PageDown,
        Action::PageUp,
        Action::NextSection,
        Action::PrevSection,
        Action::ToggleSurvey,
        Action::OpenSettings,
        Action::Quit,
    ];

    /// Human-readable label for the UI.
    pub fn label(self) -> &'static str {
        match self {
            Action::ScrollDown => "Scroll Down",
            Action::ScrollUp => "Scroll Up",
            Action::PageDown => "Page Down",
            Action::PageUp => "Page Up",
            Action::NextSection => "Next Section",
            Action::PrevSection => "Previous Section",
            Action::ToggleSurvey => "Survey Overlay",
            Action::OpenSettings => "Open Settings",
            Action::Quit => "Quit",
        }
    }

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::ScrollDown => "scroll_down",
            Action::ScrollUp => "scroll_up",
            Action::PageDown => "page_down",
            Action::PageUp => "page_up",
            Action::NextSection => "next_section",
            Action::PrevSection => "prev_section",
            Action::ToggleSurvey => "toggle_survey",
            Action::OpenSettings => "open_settings",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding: key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

/// Only these modifiers take part in matching.
fn modifier_mask() -> KeyModifiers {
    KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT
}

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Does this binding match a key event?  SHIFT is ignored for character
    /// keys since the character already carries it (`?` arrives as Shift+?),
    /// and for BackTab, which terminals only send as Shift+Tab.
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mut mask = modifier_mask();
        if matches!(self.code, KeyCode::Char(_) | KeyCode::BackTab) {
            mask.remove(KeyModifiers::SHIFT);
        }
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// Create a binding from a raw key event (used during rebinding).
    pub fn from_key_event(event: KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers & modifier_mask(),
        }
    }

    /// User-friendly display string (e.g. `"Ctrl+d"`, `"↓"`).
    pub fn display(&self) -> String {
        self.render(true)
    }

    /// Config-file form (e.g. `"Ctrl+d"`, `"Down"`).
    fn to_config_string(&self) -> String {
        self.render(false)
    }

    fn render(&self, arrows: bool) -> String {
        let mut s = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            s.push_str("Ctrl+");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            s.push_str("Alt+");
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            s.push_str("Shift+");
        }
        let key = match (self.code, arrows) {
            (KeyCode::Char(' '), _) => "Space".to_string(),
            (KeyCode::Char(c), _) => c.to_string(),
            (KeyCode::Up, true) => "↑".into(),
            (KeyCode::Down, true) => "↓".into(),
            (KeyCode::Up, false) => "Up".into(),
            (KeyCode::Down, false) => "Down".into(),
            (KeyCode::Left, _) => "Left".into(),
            (KeyCode::Right, _) => "Right".into(),
            (KeyCode::Enter, _) => "Enter".into(),
            (KeyCode::Esc, _) => "Esc".into(),
            (KeyCode::Tab, _) => "Tab".into(),
            (KeyCode::BackTab, _) => "BackTab".into(),
            (KeyCode::Home, _) => "Home".into(),
            (KeyCode::End, _) => "End".into(),
            (KeyCode::PageUp, true) => "PgUp".into(),
            (KeyCode::PageDown, true) => "PgDn".into(),
            (KeyCode::PageUp, false) => "PageUp".into(),
            (KeyCode::PageDown, false) => "PageDown".into(),
            (KeyCode::F(n), _) => format!("F{n}"),
            (other, _) => format!("{other:?}"),
        };
        s.push_str(&key);
        s
    }

    /// Parse a key string like `"Ctrl+d"`, `"Down"`, `"j"`, `"PageDown"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let parts: Vec<&str> = s.split('+').collect();
        let key_part = parts.last()?;

        for &part in &parts[..parts.len() - 1] {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            k if k.starts_with('f') && k.len() > 1 => KeyCode::F(k[1..].parse().ok()?),
            // Single characters keep their case ("J" differs from "j").
            _ if key_part.chars().count() == 1 => KeyCode::Char(key_part.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── config ────────────

const DEFAULT_SCROLL_STEP: u16 = 2;

/// Application configuration: keybindings and story settings.
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Rows scrolled per key press or wheel notch.
    pub scroll_step: u16,
    /// Drop feature-id answers issued before the latest section entry.
    pub discard_stale_seeks: bool,
    /// Show the per-section survey overlay.
    pub show_survey: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            scroll_step: DEFAULT_SCROLL_STEP,
            discard_stale_seeks: false,
            show_survey: false,
        }
    }
}

impl AppConfig {
    /// Built-in bindings.
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let ctrl = KeyModifiers::CONTROL;
        let mut m = HashMap::new();

        m.insert(Action::ScrollDown, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(Action::ScrollUp, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(
            Action::PageDown,
            vec![KeyBind::new(PageDown, n), KeyBind::new(Char(' '), n), KeyBind::new(Char('d'), ctrl)],
        );
        m.insert(Action::PageUp, vec![KeyBind::new(PageUp, n), KeyBind::new(Char('u'), ctrl)]);
        m.insert(Action::NextSection, vec![KeyBind::new(Char('n'), n), KeyBind::new(Tab, n)]);
        m.insert(Action::PrevSection, vec![KeyBind::new(Char('p'), n), KeyBind::new(BackTab, n)]);
        m.insert(Action::ToggleSurvey, vec![KeyBind::new(Char('s'), n)]);
        m.insert(Action::OpenSettings, vec![KeyBind::new(Char('?'), n)]);
        m.insert(Action::Quit, vec![KeyBind::new(Char('q'), n)]);

        m
    }

    /// Find the action that matches a key event.  When multiple bindings
    /// match, the one with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        let mut best: Option<Action> = None;
        let mut best_mod_count = 0;

        for (&action, binds) in &self.bindings {
            for bind in binds {
                if bind.matches(event) {
                    let mc = bind.modifiers.bits().count_ones();
                    if best.is_none() || mc > best_mod_count {
                        best = Some(action);
                        best_mod_count = mc;
                    }
                }
            }
        }
        best
    }

    /// Add a binding for `action`, removing the same key from any other action.
    pub fn add_binding(&mut self, action: Action, bind: KeyBind) {
        for binds in self.bindings.values_mut() {
            binds.retain(|b| b != &bind);
        }
        self.bindings.entry(action).or_default().push(bind);
    }

    /// Restore all bindings to the built-in defaults.
    pub fn reset_defaults(&mut self) {
        self.bindings = Self::default_bindings();
    }

    /// Format the binding list for a given action (e.g. `"↓/j"`).
    pub fn display_bindings(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => {
                binds.iter().map(|b| b.display()).collect::<Vec<_>>().join("/")
            }
            _ => "unbound".into(),
        }
    }

    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}/{}: scroll | {}: next section | {}: survey | {}: settings | {}: quit",
            self.short_binding(Action::ScrollDown),
            self.short_binding(Action::ScrollUp),
            self.short_binding(Action::NextSection),
            self.short_binding(Action::ToggleSurvey),
            self.short_binding(Action::OpenSettings),
            self.short_binding(Action::Quit),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk, falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse_config(&contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(err) => {
                tracing::warn!("cannot read {}: {err}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Persist current config to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.serialise())?;
        Ok(())
    }

    fn parse_config(s: &str) -> Self {
        let mut config = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "scroll_step" => {
                    match value.parse::<u16>() {
                        Ok(v) => config.scroll_step = v.clamp(1, 20),
                        Err(_) => tracing::warn!("ignoring scroll_step = {value}"),
                    }
                    continue;
                }
                "discard_stale_seeks" => {
                    config.discard_stale_seeks = value == "true";
                    continue;
                }
                "show_survey" => {
                    config.show_survey = value == "true";
                    continue;
                }
                _ => {}
            }

            let Some(action) = Action::from_config_key(key) else {
                tracing::warn!("ignoring unknown config key `{key}`");
                continue;
            };

            let parsed: Vec<KeyBind> = value
                .split(',')
                .map(|part| part.trim().trim_matches('"'))
                .filter_map(KeyBind::parse)
                .collect();
            if !parsed.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }

        config
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# scroll-story configuration".to_string(),
            String::new(),
            "# Story settings".to_string(),
            format!("scroll_step = {}", self.scroll_step),
            format!("discard_stale_seeks = {}", self.discard_stale_seeks),
            format!("show_survey = {}", self.show_survey),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            "# Special keys: Up, Down, Left, Right, Enter, Esc, Tab, BackTab,".to_string(),
            "#   Home, End, PageUp, PageDown, Space, F1-F12".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(|b| b.to_config_string()).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/scroll-story/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("scroll-story").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_default_bindings_match() {
        let config = AppConfig::default();
        assert_eq!(config.match_key(key(KeyCode::Char('j'), KeyModifiers::NONE)), Some(Action::ScrollDown));
        assert_eq!(
            config.match_key(key(KeyCode::Char('d'), KeyModifiers::CONTROL)),
            Some(Action::PageDown)
        );
        assert_eq!(config.match_key(key(KeyCode::Char('x'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_shift_tab_reaches_previous_section() {
        let config = AppConfig::default();
        assert_eq!(
            config.match_key(key(KeyCode::BackTab, KeyModifiers::SHIFT)),
            Some(Action::PrevSection)
        );
        assert_eq!(config.match_key(key(KeyCode::BackTab, KeyModifiers::NONE)), Some(Action::PrevSection));
        assert_eq!(config.match_key(key(KeyCode::PageUp, KeyModifiers::NONE)), Some(Action::PageUp));
        assert_eq!(config.match_key(key(KeyCode::PageDown, KeyModifiers::NONE)), Some(Action::PageDown));
    }

    #[test]
    fn test_add_binding_steals_key() {
        let mut config = AppConfig::default();
        config.add_binding(Action::Quit, KeyBind::new(KeyCode::Char('j'), KeyModifiers::NONE));
        assert_eq!(config.match_key(key(KeyCode::Char('j'), KeyModifiers::NONE)), Some(Action::Quit));
        assert_eq!(config.display_bindings(Action::ScrollDown), "↓");
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = AppConfig::default();
        config.scroll_step = 5;
        config.discard_stale_seeks = true;
        config.add_binding(Action::NextSection, KeyBind::new(KeyCode::PageDown, KeyModifiers::ALT));

        let parsed = AppConfig::parse_config(&config.serialise());
        assert_eq!(parsed.scroll_step, 5);
        assert!(parsed.discard_stale_seeks);
        assert!(!parsed.show_survey);
        assert_eq!(
            parsed.match_key(key(KeyCode::PageDown, KeyModifiers::ALT)),
            Some(Action::NextSection)
        );
    }

    #[test]
    fn test_parse_clamps_and_ignores_garbage() {
        let parsed = AppConfig::parse_config("scroll_step = 99\nnonsense\nwarp = x\nquit = Ctrl+q\n");
        assert_eq!(parsed.scroll_step, 20);
        assert_eq!(parsed.match_key(key(KeyCode::Char('q'), KeyModifiers::CONTROL)), Some(Action::Quit));
        assert_eq!(parsed.match_key(key(KeyCode::Char('q'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_keybind_parse() {
        assert_eq!(
            KeyBind::parse("Shift+Tab"),
            Some(KeyBind::new(KeyCode::Tab, KeyModifiers::SHIFT))
        );
        assert_eq!(KeyBind::parse("F5"), Some(KeyBind::new(KeyCode::F(5), KeyModifiers::NONE)));
        assert_eq!(KeyBind::parse("Hyper+x"), None);
    }
}
