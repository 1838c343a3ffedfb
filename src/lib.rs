//! chordkey - modal key-chord parsing
//!
//! Turns a stream of normalized key presses into commands: vim-style
//! multi-key chains ("g g"), numeric count prefixes ("12 d d"), per-mode
//! binding tables loaded from YAML, and key remapping.
//!
//! The central type is [`ChordParser`]: feed it one [`KeyPress`] at a time
//! via [`ChordParser::handle`] and it dispatches matched commands to a
//! [`CommandSink`] while reporting keystring changes to a
//! [`KeystringObserver`].

pub mod bindings;
pub mod config;
pub mod keys;
pub mod parser;

pub use bindings::{BindingTable, LookupResult};
pub use config::{
    load_user_config, parse_key_string, parse_sequence_string, user_config_path, BindingSource,
    KeymapConfig, KeymapError,
};
pub use keys::{KeyCode, KeyPress, KeySequence, Modifiers};
pub use parser::{ChordParser, CommandSink, KeyAction, KeystringObserver};
