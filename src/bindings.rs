//! Binding tables: chord-to-command bindings and key mappings for one mode

use std::collections::HashMap;

use crate::keys::{KeyPress, KeySequence};

/// Result of classifying a tentative sequence against a binding table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    /// Some bound sequence equals the tentative sequence exactly
    Match(String),
    /// The tentative sequence is a proper prefix of at least one binding
    Prefix,
    /// No binding equals or extends the tentative sequence
    None,
}

/// Bindings for a single mode: chord sequences mapped to command strings,
/// plus key mappings applied before chord matching.
///
/// The parser never mutates a table in place; the configuration layer
/// builds a fresh table and the parser replaces its owned copy wholesale.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    /// Chord sequence -> command string
    bindings: HashMap<KeySequence, String>,
    /// Typed key -> replacement sequence, consulted only when no literal
    /// binding matches (bindings win over mappings)
    mappings: HashMap<KeyPress, KeySequence>,
}

impl BindingTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a sequence to a command, replacing any existing binding
    pub fn bind(&mut self, sequence: KeySequence, command: impl Into<String>) {
        if sequence.is_empty() {
            return;
        }
        self.bindings.insert(sequence, command.into());
    }

    /// Remove a binding, returning the command it was bound to
    pub fn unbind(&mut self, sequence: &KeySequence) -> Option<String> {
        self.bindings.remove(sequence)
    }

    /// Map a typed key to a replacement sequence
    pub fn map_key(&mut self, press: KeyPress, replacement: KeySequence) {
        self.mappings.insert(press, replacement);
    }

    /// The replacement sequence for a typed key, if one is mapped
    pub fn mapped(&self, press: KeyPress) -> Option<&KeySequence> {
        self.mappings.get(&press)
    }

    /// Check if an exact binding exists for a sequence
    pub fn contains(&self, sequence: &KeySequence) -> bool {
        self.bindings.contains_key(sequence)
    }

    /// The command bound to an exact sequence
    pub fn command_for(&self, sequence: &KeySequence) -> Option<&str> {
        self.bindings.get(sequence).map(String::as_str)
    }

    /// Number of bindings in the table
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if the table has no bindings
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterate over all (sequence, command) bindings
    pub fn iter(&self) -> impl Iterator<Item = (&KeySequence, &str)> {
        self.bindings.iter().map(|(seq, cmd)| (seq, cmd.as_str()))
    }

    /// Iterate over all (typed key, replacement) mappings
    pub fn iter_mappings(&self) -> impl Iterator<Item = (&KeyPress, &KeySequence)> {
        self.mappings.iter()
    }

    /// Classify a tentative sequence against the table.
    ///
    /// An exact binding always wins: a full match is reported even when a
    /// longer binding would also accept the sequence as a prefix.
    pub fn classify(&self, sequence: &KeySequence) -> LookupResult {
        if sequence.is_empty() {
            return LookupResult::None;
        }
        if let Some(command) = self.bindings.get(sequence) {
            return LookupResult::Match(command.clone());
        }
        let is_prefix = self
            .bindings
            .keys()
            .any(|bound| sequence.len() < bound.len() && sequence.is_prefix_of(bound));
        if is_prefix {
            LookupResult::Prefix
        } else {
            LookupResult::None
        }
    }
}
