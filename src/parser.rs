//! Incremental chord parser: turns a stream of key presses into commands
//!
//! The parser owns the active mode's [`BindingTable`] plus two accumulators:
//! a numeric count prefix and the chord typed so far. Each press is resolved
//! synchronously against the table with full-match-beats-partial precedence;
//! key mappings are consulted only when no literal binding matches.

use crate::bindings::{BindingTable, LookupResult};
use crate::config::{BindingSource, KeymapError};
use crate::keys::{KeyPress, KeySequence};

/// Execution sink receiving dispatched commands.
///
/// Invoked synchronously from [`ChordParser::handle`]; the parser ignores
/// anything the sink does with the command (fire-and-forget).
pub trait CommandSink {
    fn execute(&mut self, command: &str, count: Option<u32>);
}

/// Observer notified whenever the displayed keystring (count + chord)
/// changes, for status-bar style feedback.
pub trait KeystringObserver {
    fn keystring_changed(&mut self, keystring: &str);
}

/// Result of handling one key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// A chord completed and this command was dispatched
    Execute {
        command: String,
        count: Option<u32>,
    },
    /// The digit was folded into the count prefix
    CountDigit,
    /// The key extended a chord; awaiting more input
    Pending,
    /// The key matched nothing; chord state was discarded
    NoMatch,
    /// Modifier-only press, ignored entirely
    Ignored,
}

/// Stateful key-chord parser for one input mode at a time.
///
/// Drive it with [`handle`](Self::handle) once per normalized key press,
/// on a single thread. Mode changes and configuration reloads replace the
/// owned binding table wholesale via [`set_mode`](Self::set_mode) and
/// [`bindings_changed`](Self::bindings_changed).
pub struct ChordParser {
    mode: Option<String>,
    bindings: BindingTable,
    count: String,
    sequence: KeySequence,
    supports_count: bool,
    label: String,
    /// Per-instance switch for diagnostic logging
    pub do_log: bool,
    sink: Option<Box<dyn CommandSink>>,
    observer: Option<Box<dyn KeystringObserver>>,
}

impl std::fmt::Debug for ChordParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChordParser")
            .field("mode", &self.mode)
            .field("count", &self.count)
            .field("sequence", &self.sequence)
            .field("supports_count", &self.supports_count)
            .field("label", &self.label)
            .finish()
    }
}

impl ChordParser {
    /// Create a parser with no mode set and an empty binding table.
    ///
    /// `supports_count` fixes for the parser's lifetime whether leading
    /// digits accumulate a count prefix; `label` tags diagnostic logs.
    pub fn new(supports_count: bool, label: impl Into<String>) -> Self {
        Self {
            mode: None,
            bindings: BindingTable::new(),
            count: String::new(),
            sequence: KeySequence::new(),
            supports_count,
            label: label.into(),
            do_log: true,
            sink: None,
            observer: None,
        }
    }

    /// Install the execution sink commands are dispatched to
    pub fn set_sink(&mut self, sink: Box<dyn CommandSink>) {
        self.sink = Some(sink);
    }

    /// Install the keystring-changed observer
    pub fn set_observer(&mut self, observer: Box<dyn KeystringObserver>) {
        self.observer = Some(observer);
    }

    /// The active mode, if one has been set
    pub fn mode(&self) -> Option<&str> {
        self.mode.as_deref()
    }

    /// The active binding table
    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    /// The accumulated count digits (empty when no count is pending)
    pub fn count(&self) -> &str {
        &self.count
    }

    /// The chord typed so far
    pub fn sequence(&self) -> &KeySequence {
        &self.sequence
    }

    /// The display text for the pending count + chord
    pub fn keystring(&self) -> String {
        format!("{}{}", self.count, self.sequence)
    }

    /// Bind the parser to a mode, replacing the owned binding table with
    /// the mode's table from `source`.
    ///
    /// `None` re-reads the current mode (configuration reload) and fails
    /// with [`KeymapError::NoModeSet`] if no mode was ever set. Unknown
    /// modes get an empty table.
    pub fn set_mode(
        &mut self,
        mode: Option<&str>,
        source: &dyn BindingSource,
    ) -> Result<(), KeymapError> {
        let mode = match mode {
            Some(m) => m.to_string(),
            None => self.mode.clone().ok_or(KeymapError::NoModeSet)?,
        };
        let table = source.bindings_for(&mode).unwrap_or_default();
        self.debug_log(format!(
            "Loaded {} bindings for mode '{}'",
            table.len(),
            mode
        ));
        self.bindings = table;
        self.mode = Some(mode);
        Ok(())
    }

    /// React to a "bindings for this mode changed" notification.
    ///
    /// Refreshes the owned table only when `mode` is the active mode;
    /// notifications for other modes are ignored.
    pub fn bindings_changed(&mut self, mode: &str, source: &dyn BindingSource) {
        if self.mode.as_deref() != Some(mode) {
            return;
        }
        self.bindings = source.bindings_for(mode).unwrap_or_default();
        self.debug_log(format!("Refreshed bindings for mode '{}'", mode));
    }

    /// Handle one key press.
    ///
    /// With `dry_run` set, the press is evaluated against a tentative copy
    /// of the state: nothing is committed, no command is dispatched and no
    /// notification fires, but the returned [`KeyAction`] reports what the
    /// press would do.
    pub fn handle(&mut self, press: KeyPress, dry_run: bool) -> KeyAction {
        self.debug_log(format!(
            "Got key {} (dry_run: {})",
            press.display_string(),
            dry_run
        ));

        if press.is_modifier_only() {
            self.debug_log("Ignoring, only modifier");
            return KeyAction::Ignored;
        }

        if self.try_count_digit(press, dry_run) {
            return KeyAction::CountDigit;
        }

        let had_sequence = !self.sequence.is_empty();
        let (tentative, result) = self.match_with_mappings(press);

        match result {
            LookupResult::Match(command) => {
                self.debug_log(format!("Definitive match for '{}'", tentative));
                let count = if self.supports_count && !self.count.is_empty() {
                    self.count.parse::<u32>().ok()
                } else {
                    None
                };
                if !dry_run {
                    if let Some(sink) = self.sink.as_mut() {
                        sink.execute(&command, count);
                    }
                    self.clear_keystring();
                }
                KeyAction::Execute { command, count }
            }
            LookupResult::Prefix => {
                self.debug_log(format!("Partial match for '{}'", tentative));
                if !dry_run {
                    self.sequence = tentative;
                    self.notify_keystring();
                }
                KeyAction::Pending
            }
            LookupResult::None => {
                self.debug_log(format!("Giving up with '{}'", tentative));
                // An invalid continuation discards count and chord alike;
                // a stray key with no chord in progress leaves the count.
                if !dry_run && had_sequence {
                    self.clear_keystring();
                }
                KeyAction::NoMatch
            }
        }
    }

    /// Reset count and chord, notifying the observer iff the keystring
    /// was non-empty beforehand.
    pub fn clear_keystring(&mut self) {
        if self.count.is_empty() && self.sequence.is_empty() {
            return;
        }
        self.debug_log(format!("Clearing keystring '{}'", self.keystring()));
        self.count.clear();
        self.sequence = KeySequence::new();
        self.notify_keystring();
    }

    /// Capture a digit into the count prefix. Returns false when the
    /// press must fall through to chord matching.
    fn try_count_digit(&mut self, press: KeyPress, dry_run: bool) -> bool {
        if !self.supports_count || !self.sequence.is_empty() {
            return false;
        }
        let Some(digit) = press.as_count_digit() else {
            return false;
        };
        // A leading '0' is a chord key ("0" is commonly bound), never the
        // start of a count.
        if digit == '0' && self.count.is_empty() {
            return false;
        }
        if !dry_run {
            self.count.push(digit);
            self.notify_keystring();
        }
        true
    }

    /// Classify the press appended to the current chord.
    ///
    /// Literal bindings are tried first; only a literal no-match falls
    /// back to the key-mapping substitution, so bindings shadow mappings.
    fn match_with_mappings(&self, press: KeyPress) -> (KeySequence, LookupResult) {
        let tentative = self.sequence.append(press);
        let result = self.bindings.classify(&tentative);
        if result != LookupResult::None {
            return (tentative, result);
        }
        if let Some(replacement) = self.bindings.mapped(press) {
            let mapped = self.sequence.extend(replacement);
            let result = self.bindings.classify(&mapped);
            return (mapped, result);
        }
        (tentative, LookupResult::None)
    }

    fn notify_keystring(&mut self) {
        if self.observer.is_some() {
            let keystring = self.keystring();
            if let Some(observer) = self.observer.as_mut() {
                observer.keystring_changed(&keystring);
            }
        }
    }

    /// Diagnostic logging, active only while `do_log` is set
    fn debug_log(&self, message: impl AsRef<str>) {
        if self.do_log {
            tracing::debug!(parser = %self.label, "{}", message.as_ref());
        }
    }
}
