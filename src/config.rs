//! User configuration: reader knobs, keybindings and persistence.
//!
//! Settings are stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/verse-scroll/config.toml` (default
//! `~/.config/verse-scroll/config.toml`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::reconciler::ReconcilerConfig;
use crate::core::scroll::{ScrollCommander, DEFAULT_UPWARD_SHIFT_PX};

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions in the reader view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    PrevVerse,
    NextVerse,
    GotoVerse,
    Quit,
}

impl Action {
    pub const ALL: &[Action] = &[
        Action::ScrollUp,
        Action::ScrollDown,
        Action::PageUp,
        Action::PageDown,
        Action::PrevVerse,
        Action::NextVerse,
        Action::GotoVerse,
        Action::Quit,
    ];

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::ScrollUp => "scroll_up",
            Action::ScrollDown => "scroll_down",
            Action::PageUp => "page_up",
            Action::PageDown => "page_down",
            Action::PrevVerse => "prev_verse",
            Action::NextVerse => "next_verse",
            Action::GotoVerse => "goto_verse",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding (key code + modifier combination).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

const MODIFIER_MASK: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SHIFT);

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Only CTRL/ALT/SHIFT are compared.  SHIFT is ignored for character
    /// bindings that do not ask for it, since many terminals report `:` or `?`
    /// with SHIFT held.
    pub fn matches(&self, event: KeyEvent) -> bool {
        let mask = match self.code {
            KeyCode::Char(_) if !self.modifiers.contains(KeyModifiers::SHIFT) => {
                MODIFIER_MASK.difference(KeyModifiers::SHIFT)
            }
            _ => MODIFIER_MASK,
        };
        self.code == event.code && (self.modifiers & mask) == (event.modifiers & mask)
    }

    /// Short form for the status bar (`"↓"`, `"Ctrl+d"`).
    pub fn display(&self) -> String {
        self.render(true)
    }

    /// Config-file form (`"Down"`, `"Ctrl+d"`).
    fn to_config_string(&self) -> String {
        self.render(false)
    }

    fn render(&self, pretty: bool) -> String {
        let mut s = String::new();
        for (flag, name) in [
            (KeyModifiers::CONTROL, "Ctrl+"),
            (KeyModifiers::ALT, "Alt+"),
            (KeyModifiers::SHIFT, "Shift+"),
        ] {
            if self.modifiers.contains(flag) {
                s.push_str(name);
            }
        }
        let name = match (self.code, pretty) {
            (KeyCode::Char(' '), _) => "Space".into(),
            (KeyCode::Char(c), _) => c.to_string(),
            (KeyCode::Up, true) => "↑".into(),
            (KeyCode::Down, true) => "↓".into(),
            (KeyCode::Left, true) => "←".into(),
            (KeyCode::Right, true) => "→".into(),
            (KeyCode::PageUp, true) => "PgUp".into(),
            (KeyCode::PageDown, true) => "PgDn".into(),
            (KeyCode::F(n), _) => format!("F{n}"),
            (other, _) => format!("{other:?}"),
        };
        s.push_str(&name);
        s
    }

    /// Parse a key string like `"Ctrl+d"`, `"PageDown"`, `"j"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let (mods, key_part) = match s.rsplit_once('+') {
            // A lone "+" is the plus key itself.
            Some((mods, "")) => (mods.strip_suffix('+').unwrap_or(mods), "+"),
            Some((mods, key)) => (mods, key),
            None => ("", s),
        };

        for part in mods.split('+').filter(|p| !p.is_empty()) {
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
            "backspace" => KeyCode::Backspace,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            k if k.starts_with('f') && k.len() > 1 => KeyCode::F(k[1..].parse().ok()?),
            _ => {
                let mut chars = key_part.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                KeyCode::Char(c)
            }
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── reader ────────────

/// Knobs of the reading session.  Values are clamped on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderSettings {
    /// Verses per fetched page.
    pub items_per_page: u32,
    /// Upward shift applied to every verse scroll.
    pub scroll_offset_px: u32,
    /// Delay of the single fallback correction.
    pub fallback_delay_ms: u64,
    /// How many pixels one terminal row stands for.
    pub px_per_row: u32,
    /// Base latency of the simulated page source.
    pub fetch_latency_ms: u64,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            items_per_page: 10,
            scroll_offset_px: DEFAULT_UPWARD_SHIFT_PX,
            fallback_delay_ms: 1000,
            px_per_row: 35,
            fetch_latency_ms: 400,
        }
    }
}

impl ReaderSettings {
    pub fn reconciler_config(&self) -> ReconcilerConfig {
        ReconcilerConfig::new(self.items_per_page)
            .with_fallback_delay(Duration::from_millis(self.fallback_delay_ms))
    }

    pub fn commander(&self) -> ScrollCommander {
        ScrollCommander::with_upward_shift(self.scroll_offset_px)
    }

    pub fn fetch_latency(&self) -> Duration {
        Duration::from_millis(self.fetch_latency_ms)
    }

    /// Apply one `key = value` line.  Returns `false` for unknown keys.
    fn apply(&mut self, key: &str, value: &str) -> bool {
        match key {
            "items_per_page" => {
                if let Ok(v) = value.parse::<u32>() {
                    self.items_per_page = v.clamp(1, 100);
                }
            }
            "scroll_offset_px" => {
                if let Ok(v) = value.parse::<u32>() {
                    self.scroll_offset_px = v.clamp(1, 1000);
                }
            }
            "fallback_delay_ms" => {
                if let Ok(v) = value.parse::<u64>() {
                    self.fallback_delay_ms = v.clamp(50, 10_000);
                }
            }
            "px_per_row" => {
                if let Ok(v) = value.parse::<u32>() {
                    self.px_per_row = v.clamp(1, 200);
                }
            }
            "fetch_latency_ms" => {
                if let Ok(v) = value.parse::<u64>() {
                    self.fetch_latency_ms = v.min(10_000);
                }
            }
            _ => return false,
        }
        true
    }
}

// ───────────────────────────────────────── config ────────────

/// Application configuration: reader settings and keybindings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    pub reader: ReaderSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            reader: ReaderSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let ctrl = KeyModifiers::CONTROL;
        let mut m = HashMap::new();

        m.insert(ScrollUp, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(ScrollDown, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(
            Action::PageUp,
            vec![KeyBind::new(KeyCode::PageUp, n), KeyBind::new(Char('u'), ctrl)],
        );
        m.insert(
            Action::PageDown,
            vec![KeyBind::new(KeyCode::PageDown, n), KeyBind::new(Char('d'), ctrl)],
        );
        m.insert(PrevVerse, vec![KeyBind::new(Char('p'), n), KeyBind::new(Left, n)]);
        m.insert(NextVerse, vec![KeyBind::new(Char('n'), n), KeyBind::new(Right, n)]);
        m.insert(GotoVerse, vec![KeyBind::new(Char(':'), n), KeyBind::new(Char('g'), n)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n)]);

        m
    }

    /// Find the action that matches a key event.  The binding with the most
    /// modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .flat_map(|(&action, binds)| binds.iter().map(move |b| (action, b)))
            .filter(|(_, b)| b.matches(event))
            .max_by_key(|(_, b)| b.modifiers.bits().count_ones())
            .map(|(action, _)| action)
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
            "{}/{}: scroll | {}/{}: verse | {}: go to | {}: quit",
            self.short_binding(Action::ScrollUp),
            self.short_binding(Action::ScrollDown),
            self.short_binding(Action::PrevVerse),
            self.short_binding(Action::NextVerse),
            self.short_binding(Action::GotoVerse),
            self.short_binding(Action::Quit),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "using default config");
                Self::default()
            }
        }
    }

    /// Persist current config to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.serialise())?;
        Ok(())
    }

    fn parse(s: &str) -> Self {
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

            if config.reader.apply(key, value) {
                continue;
            }

            let Some(action) = Action::from_config_key(key) else {
                tracing::debug!(key, "unknown config key");
                continue;
            };

            let parsed: Vec<KeyBind> = value
                .split(',')
                .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                .collect();
            if !parsed.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }

        config
    }

    fn serialise(&self) -> String {
        let r = &self.reader;
        let mut lines = vec![
            "# verse-scroll configuration".to_string(),
            String::new(),
            "# Reader".to_string(),
            format!("items_per_page = {}", r.items_per_page),
            format!("scroll_offset_px = {}", r.scroll_offset_px),
            format!("fallback_delay_ms = {}", r.fallback_delay_ms),
            format!("px_per_row = {}", r.px_per_row),
            format!("fetch_latency_ms = {}", r.fetch_latency_ms),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(KeyBind::to_config_string).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/verse-scroll/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("verse-scroll").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn reader_values_are_clamped() {
        let config = AppConfig::parse(
            "items_per_page = 0\nscroll_offset_px = 90\nfallback_delay_ms = 5\npx_per_row = nope\n",
        );
        assert_eq!(config.reader.items_per_page, 1);
        assert_eq!(config.reader.scroll_offset_px, 90);
        assert_eq!(config.reader.fallback_delay_ms, 50);
        assert_eq!(config.reader.px_per_row, ReaderSettings::default().px_per_row);
    }

    #[test]
    fn bindings_override_defaults() {
        let config = AppConfig::parse("# comment\n[keys]\nnext_verse = Ctrl+n, \"l\"\nbogus = x\n");
        assert_eq!(
            config.match_key(key(KeyCode::Char('n'), KeyModifiers::CONTROL)),
            Some(Action::NextVerse)
        );
        assert_eq!(
            config.match_key(key(KeyCode::Char('l'), KeyModifiers::NONE)),
            Some(Action::NextVerse)
        );
        // The default 'n' binding was replaced.
        assert_eq!(config.match_key(key(KeyCode::Char('n'), KeyModifiers::NONE)), None);
        assert_eq!(
            config.match_key(key(KeyCode::Char('q'), KeyModifiers::NONE)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn key_parse_edge_cases() {
        assert_eq!(
            KeyBind::parse("Ctrl+d"),
            Some(KeyBind::new(KeyCode::Char('d'), KeyModifiers::CONTROL))
        );
        assert_eq!(KeyBind::parse("F5"), Some(KeyBind::new(KeyCode::F(5), KeyModifiers::NONE)));
        assert_eq!(KeyBind::parse("+"), Some(KeyBind::new(KeyCode::Char('+'), KeyModifiers::NONE)));
        assert_eq!(KeyBind::parse(":"), Some(KeyBind::new(KeyCode::Char(':'), KeyModifiers::NONE)));
        assert_eq!(KeyBind::parse("Hyper+x"), None);
        assert_eq!(KeyBind::parse("xy"), None);
    }

    #[test]
    fn shifted_punctuation_still_matches() {
        let config = AppConfig::default();
        assert_eq!(
            config.match_key(key(KeyCode::Char(':'), KeyModifiers::SHIFT)),
            Some(Action::GotoVerse)
        );
        let shift_g = KeyBind::new(KeyCode::Char('G'), KeyModifiers::SHIFT);
        assert!(!shift_g.matches(key(KeyCode::Char('G'), KeyModifiers::NONE)));
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = std::env::temp_dir().join(format!("verse-scroll-test-{}", std::process::id()));
        let path = dir.join("config.toml");

        let mut config = AppConfig::default();
        config.reader.items_per_page = 15;
        config.reader.fallback_delay_ms = 750;
        config.bindings.insert(
            Action::GotoVerse,
            vec![KeyBind::new(KeyCode::Char('G'), KeyModifiers::SHIFT)],
        );
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.reader, config.reader);
        assert_eq!(loaded.bindings.get(&Action::GotoVerse), config.bindings.get(&Action::GotoVerse));
        assert_eq!(loaded.bindings.get(&Action::PageDown), config.bindings.get(&Action::PageDown));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/verse-scroll/config.toml"));
        assert_eq!(config.reader, ReaderSettings::default());
    }
}
