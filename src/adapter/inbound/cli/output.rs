//! Terminal output for CLI handlers.
//!
//! Human mode prints coloured `✓`/`⚠`/`×` lines; JSON mode prints one
//! `{"type": ..., "payload": ...}` object per line for scripting. The mode is
//! an explicit [`Output`] value handed to every handler.

use std::fmt::Display;

use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::json;

/// Output mode selected by the global CLI flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Output {
    /// Emit machine-readable JSON lines instead of text.
    pub json: bool,
    /// Suppress non-essential text output. Warnings and errors still print.
    pub quiet: bool,
}

impl Output {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }

    fn suppressed(&self) -> bool {
        !self.json && self.quiet
    }

    fn emit(kind: &str, payload: serde_json::Value) {
        println!("{}", json!({ "type": kind, "payload": payload }));
    }

    /// Print the application name and version.
    pub fn header(&self, version: &str) {
        if self.json {
            Self::emit("header", json!({ "app": "closet-sync", "version": version }));
            return;
        }
        if self.suppressed() {
            return;
        }
        println!("{} {}", "closet-sync".bold(), version.dimmed());
        println!();
    }

    pub fn section(&self, title: &str) {
        if self.json {
            Self::emit("section", json!({ "title": title }));
            return;
        }
        if self.suppressed() {
            return;
        }
        println!();
        println!("{}", title.bold());
    }

    /// Print a labeled value.
    pub fn field(&self, label: &str, value: impl Display) {
        let value = value.to_string();
        if self.json {
            Self::emit("field", json!({ "label": label, "value": value }));
            return;
        }
        if self.suppressed() {
            return;
        }
        println!("  {:<28} {}", label.dimmed(), value);
    }

    pub fn success(&self, message: &str) {
        if self.json {
            Self::emit("success", json!({ "message": message }));
            return;
        }
        if self.suppressed() {
            return;
        }
        println!("  {} {}", "✓".green(), message);
    }

    pub fn warning(&self, message: &str) {
        if self.json {
            Self::emit("warning", json!({ "message": message }));
            return;
        }
        println!("  {} {}", "⚠".yellow(), message);
    }

    /// Print an error line on stderr.
    pub fn error(&self, message: &str) {
        if self.json {
            eprintln!("{}", json!({ "type": "error", "payload": { "message": message } }));
            return;
        }
        eprintln!("  {} {}", "×".red(), message);
    }

    pub fn note(&self, message: &str) {
        if self.json {
            Self::emit("note", json!({ "message": message }));
            return;
        }
        if self.suppressed() {
            return;
        }
        println!("  {}", message.dimmed());
    }

    /// A structured result; only printed in JSON mode.
    pub fn data<T: Serialize>(&self, kind: &str, payload: &T) {
        if !self.json {
            return;
        }
        match serde_json::to_value(payload) {
            Ok(value) => Self::emit(kind, value),
            Err(err) => self.error(&format!("failed to serialize {kind}: {err}")),
        }
    }

    /// Print `message` as a success or an error line depending on `ok`.
    pub fn status(&self, ok: bool, message: &str) {
        if ok {
            self.success(message);
        } else {
            self.error(message);
        }
    }
}

/// Format a value in cyan, or plain text in JSON mode.
#[must_use]
pub fn highlight(output: &Output, value: impl Display) -> String {
    let value = value.to_string();
    if output.json {
        return value;
    }
    format!("{}", value.cyan())
}
