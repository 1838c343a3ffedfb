//! YAML configuration for per-mode binding tables
//!
//! Parses bindings.yaml files into per-mode [`BindingTable`]s and provides
//! the [`BindingSource`] seam the parser reads its tables through.
//!
//! Key notation: a binding key is one or more space-separated keystroke
//! tokens, each token a `mod+...+key` combination like `ctrl+a`, a named
//! key like `enter`, or a single character. `"g g"` is the two-key chord
//! g-then-g; `"ctrl+x s"` is ctrl+x followed by s.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::bindings::BindingTable;
use crate::keys::{KeyCode, KeyPress, KeySequence, Modifiers};

/// Source of per-mode binding tables, as seen by the parser.
///
/// Implemented by [`KeymapConfig`]; embedders with their own configuration
/// store can implement it directly.
pub trait BindingSource {
    /// The binding table for a mode, or `None` if the mode is unknown
    fn bindings_for(&self, mode: &str) -> Option<BindingTable>;
}

/// Root structure of a bindings YAML file
#[derive(Debug, Deserialize)]
struct KeymapFile {
    #[serde(default)]
    modes: BTreeMap<String, ModeSection>,
}

/// One mode's section in the YAML file
#[derive(Debug, Default, Deserialize)]
struct ModeSection {
    #[serde(default)]
    bindings: BTreeMap<String, String>,
    #[serde(default, rename = "key-mappings")]
    key_mappings: BTreeMap<String, String>,
}

/// Default bindings embedded at compile time
const DEFAULT_BINDINGS_YAML: &str = include_str!("../bindings.yaml");

/// Per-mode keymap configuration loaded from YAML
#[derive(Debug, Clone, Default)]
pub struct KeymapConfig {
    modes: HashMap<String, BindingTable>,
}

impl KeymapConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<KeymapConfig, KeymapError> {
        let file: KeymapFile =
            serde_yaml::from_str(yaml).map_err(|e| KeymapError::ParseError(e.to_string()))?;

        let mut modes = HashMap::new();
        for (mode, section) in file.modes {
            let mut table = BindingTable::new();
            for (key, command) in &section.bindings {
                table.bind(parse_sequence_string(key)?, command.clone());
            }
            for (key, replacement) in &section.key_mappings {
                table.map_key(parse_key_string(key)?, parse_sequence_string(replacement)?);
            }
            modes.insert(mode, table);
        }
        Ok(KeymapConfig { modes })
    }

    /// Load a configuration from a YAML file
    pub fn load(path: &Path) -> Result<KeymapConfig, KeymapError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| KeymapError::IoError(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// The default configuration embedded in the library
    pub fn default_config() -> KeymapConfig {
        match Self::from_yaml(DEFAULT_BINDINGS_YAML) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to parse embedded bindings.yaml: {}", e);
                KeymapConfig::new()
            }
        }
    }

    /// Merge another configuration over this one.
    ///
    /// Later layers override: a binding in `other` replaces one for the
    /// same sequence here, and a binding with an empty command string
    /// removes the base binding instead.
    pub fn merge(&mut self, other: KeymapConfig) {
        for (mode, table) in other.modes {
            let base = self.modes.entry(mode).or_default();
            for (sequence, command) in table.iter() {
                if command.is_empty() {
                    base.unbind(sequence);
                } else {
                    base.bind(sequence.clone(), command);
                }
            }
            for (press, replacement) in table.iter_mappings() {
                base.map_key(*press, replacement.clone());
            }
        }
    }

    /// Bind a sequence to a command in a mode, creating the mode if needed
    pub fn bind(&mut self, mode: &str, sequence: KeySequence, command: impl Into<String>) {
        self.modes
            .entry(mode.to_string())
            .or_default()
            .bind(sequence, command);
    }

    /// Remove a binding from a mode
    pub fn unbind(&mut self, mode: &str, sequence: &KeySequence) -> Option<String> {
        self.modes.get_mut(mode)?.unbind(sequence)
    }

    /// The binding table for a mode
    pub fn table_for(&self, mode: &str) -> Option<&BindingTable> {
        self.modes.get(mode)
    }

    /// Names of all configured modes
    pub fn modes(&self) -> impl Iterator<Item = &str> {
        self.modes.keys().map(String::as_str)
    }
}

impl BindingSource for KeymapConfig {
    fn bindings_for(&self, mode: &str) -> Option<BindingTable> {
        self.modes.get(mode).cloned()
    }
}

/// Get the user's bindings configuration path
///
/// Returns `~/.config/chordkey/bindings.yaml` on Unix
/// Returns `%APPDATA%\chordkey\bindings.yaml` on Windows
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join("chordkey").join("bindings.yaml"))
}

/// Load and merge configurations: embedded defaults + user overrides
pub fn load_user_config() -> KeymapConfig {
    let mut config = KeymapConfig::default_config();

    if let Some(user_path) = user_config_path() {
        if user_path.exists() {
            match KeymapConfig::load(&user_path) {
                Ok(user_config) => {
                    tracing::info!("Merging user bindings from {}", user_path.display());
                    config.merge(user_config);
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to load user bindings from {}: {}",
                        user_path.display(),
                        e
                    );
                }
            }
        }
    }

    config
}

/// Parse a sequence string of space-separated keystroke tokens
pub fn parse_sequence_string(sequence_str: &str) -> Result<KeySequence, KeymapError> {
    let mut presses = Vec::new();
    for token in sequence_str.split_whitespace() {
        presses.push(parse_key_string(token)?);
    }
    if presses.is_empty() {
        return Err(KeymapError::InvalidKey(format!(
            "Empty key sequence: '{}'",
            sequence_str
        )));
    }
    Ok(presses.into())
}

/// Parse a key string like "ctrl+shift+s" into a KeyPress
pub fn parse_key_string(key_str: &str) -> Result<KeyPress, KeymapError> {
    let mut mods = Modifiers::NONE;
    let mut key_part = None;

    for part in key_str.split('+') {
        let part_lower = part.to_lowercase();
        match part_lower.as_str() {
            "ctrl" | "control" => {
                mods = mods | Modifiers::CTRL;
            }
            "shift" => {
                mods = mods | Modifiers::SHIFT;
            }
            "alt" | "option" | "opt" => {
                mods = mods | Modifiers::ALT;
            }
            "meta" | "super" | "win" => {
                mods = mods | Modifiers::META;
            }
            _ => {
                // This should be the key itself
                if key_part.is_some() {
                    return Err(KeymapError::InvalidKey(format!(
                        "Multiple keys in binding: {}",
                        key_str
                    )));
                }
                key_part = Some(parse_key_code(&part_lower)?);
            }
        }
    }

    let code = key_part
        .ok_or_else(|| KeymapError::InvalidKey(format!("No key found in binding: {}", key_str)))?;

    Ok(KeyPress::new(code, mods))
}

/// Parse a key code from string
fn parse_key_code(key: &str) -> Result<KeyCode, KeymapError> {
    // Single character
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c.to_ascii_lowercase()));
    }

    // Named keys
    match key {
        "enter" | "return" => Ok(KeyCode::Enter),
        "escape" | "esc" => Ok(KeyCode::Escape),
        "tab" => Ok(KeyCode::Tab),
        "backspace" | "back" => Ok(KeyCode::Backspace),
        "delete" | "del" => Ok(KeyCode::Delete),
        "space" => Ok(KeyCode::Space),

        "up" | "arrowup" => Ok(KeyCode::Up),
        "down" | "arrowdown" => Ok(KeyCode::Down),
        "left" | "arrowleft" => Ok(KeyCode::Left),
        "right" | "arrowright" => Ok(KeyCode::Right),

        "home" => Ok(KeyCode::Home),
        "end" => Ok(KeyCode::End),
        "pageup" | "pgup" => Ok(KeyCode::PageUp),
        "pagedown" | "pgdown" | "pgdn" => Ok(KeyCode::PageDown),
        "insert" | "ins" => Ok(KeyCode::Insert),

        _ => {
            // Function keys: f1-f24
            if let Some(n) = key.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                if (1..=24).contains(&n) {
                    return Ok(KeyCode::F(n));
                }
            }
            Err(KeymapError::InvalidKey(format!("Unknown key: {}", key)))
        }
    }
}

/// Errors from keymap configuration and mode setup
#[derive(Debug, Clone)]
pub enum KeymapError {
    IoError(String),
    ParseError(String),
    InvalidKey(String),
    /// Mode setup was requested with no mode given and none set so far
    NoModeSet,
}

impl std::fmt::Display for KeymapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeymapError::IoError(e) => write!(f, "IO error: {}", e),
            KeymapError::ParseError(e) => write!(f, "Parse error: {}", e),
            KeymapError::InvalidKey(k) => write!(f, "Invalid key: {}", k),
            KeymapError::NoModeSet => {
                write!(
                    f,
                    "Mode setup requested with no mode given and none set so far"
                )
            }
        }
    }
}

impl std::error::Error for KeymapError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_key() {
        let press = parse_key_string("a").unwrap();
        assert_eq!(press.code, KeyCode::Char('a'));
        assert!(press.mods.is_empty());
    }

    #[test]
    fn test_parse_key_with_modifier() {
        let press = parse_key_string("ctrl+s").unwrap();
        assert_eq!(press.code, KeyCode::Char('s'));
        assert!(press.mods.ctrl());
    }

    #[test]
    fn test_parse_key_with_multiple_modifiers() {
        let press = parse_key_string("ctrl+shift+s").unwrap();
        assert_eq!(press.code, KeyCode::Char('s'));
        assert!(press.mods.ctrl());
        assert!(press.mods.shift());
    }

    #[test]
    fn test_parse_named_key() {
        assert_eq!(parse_key_string("enter").unwrap().code, KeyCode::Enter);
        assert_eq!(parse_key_string("escape").unwrap().code, KeyCode::Escape);
        assert_eq!(parse_key_string("up").unwrap().code, KeyCode::Up);
        assert_eq!(parse_key_string("f5").unwrap().code, KeyCode::F(5));
    }

    #[test]
    fn test_parse_non_ascii_key() {
        let press = parse_key_string("ü").unwrap();
        assert_eq!(press.code, KeyCode::Char('ü'));
    }

    #[test]
    fn test_parse_invalid_key() {
        assert!(parse_key_string("notakey").is_err());
        assert!(parse_key_string("ctrl+").is_err());
        assert!(parse_key_string("a+b").is_err());
    }

    #[test]
    fn test_parse_sequence() {
        let seq = parse_sequence_string("g g").unwrap();
        assert_eq!(seq.len(), 2);

        let seq = parse_sequence_string("ctrl+x s").unwrap();
        assert_eq!(seq.len(), 2);
        assert!(seq.iter().next().unwrap().mods.ctrl());

        assert!(parse_sequence_string("  ").is_err());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
modes:
  normal:
    bindings:
      "b a": "message-info ba"
      "ctrl+a": "message-info ctrla"
    key-mappings:
      "x": "a"
"#;
        let config = KeymapConfig::from_yaml(yaml).unwrap();
        let table = config.table_for("normal").unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.contains(&parse_sequence_string("b a").unwrap()));
        assert_eq!(
            table.mapped(KeyPress::char('x')),
            Some(&parse_sequence_string("a").unwrap())
        );
        assert!(config.table_for("insert").is_none());
    }

    #[test]
    fn test_parse_yaml_invalid_key() {
        let yaml = r#"
modes:
  normal:
    bindings:
      "notakey": "command"
"#;
        assert!(KeymapConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_default_config_parses() {
        let config = KeymapConfig::default_config();
        assert!(config.table_for("normal").is_some());
    }

    #[test]
    fn test_merge_overrides_and_unbinds() {
        let mut base = KeymapConfig::from_yaml(
            r#"
modes:
  normal:
    bindings:
      "a": "message-info a"
      "b": "message-info b"
"#,
        )
        .unwrap();

        let overlay = KeymapConfig::from_yaml(
            r#"
modes:
  normal:
    bindings:
      "a": "message-info changed"
      "b": ""
      "c": "message-info c"
"#,
        )
        .unwrap();

        base.merge(overlay);
        let table = base.table_for("normal").unwrap();
        let a = parse_sequence_string("a").unwrap();
        let b = parse_sequence_string("b").unwrap();
        let c = parse_sequence_string("c").unwrap();

        assert_eq!(table.command_for(&a), Some("message-info changed"));
        assert_eq!(table.command_for(&b), None);
        assert_eq!(table.command_for(&c), Some("message-info c"));
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
modes:
  normal:
    bindings:
      "g g": "scroll to-top"
"#
        )
        .unwrap();

        let config = KeymapConfig::load(file.path()).unwrap();
        assert!(config.table_for("normal").is_some());

        assert!(KeymapConfig::load(Path::new("/nonexistent/bindings.yaml")).is_err());
    }

    #[test]
    fn test_bind_and_unbind() {
        let mut config = KeymapConfig::new();
        let seq = parse_sequence_string("n e w").unwrap();

        config.bind("normal", seq.clone(), "message-info new");
        assert!(config.table_for("normal").unwrap().contains(&seq));

        assert_eq!(
            config.unbind("normal", &seq),
            Some("message-info new".into())
        );
        assert!(!config.table_for("normal").unwrap().contains(&seq));
    }
}
