//! Lifecycle listener contracts.
//!
//! The host announces foreground lifecycle events through listener
//! chains resolved once at initialization: each registered listener
//! holds the listener that preceded it and delegates exactly once.

use crate::spindle::DriverHandle;

/// Snapshot of parser modal state at reinitialization.
#[derive(Debug, Clone, Copy)]
pub struct ParserState {
    /// Metric input mode active (G21).
    pub units_mm: bool,
    /// Modal feed rate [units/min].
    pub feed_rate: f64,
}

impl Default for ParserState {
    fn default() -> Self {
        Self {
            units_mm: true,
            feed_rate: 0.0,
        }
    }
}

/// How a program reached its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramFlow {
    /// Program end (M2).
    CompletedM2,
    /// Program end with reset to defaults (M30).
    CompletedM30,
}

/// Notified whenever a power driver is selected as the active spindle.
pub trait SelectionListener: Send + Sync {
    fn on_spindle_selected(&self, driver: &DriverHandle);
}

/// Notified whenever the command parser reinitializes (machine reset,
/// new program).
pub trait ParserListener: Send + Sync {
    fn on_parser_reinit(&self, state: &ParserState);
}

/// Notified on normal program completion.
pub trait ProgramListener: Send + Sync {
    fn on_program_completed(&self, flow: ProgramFlow, check_mode: bool);
}

/// Plugin identity entry collected during an options report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginEntry {
    pub name: &'static str,
    pub version: &'static str,
}

/// Accumulates plugin announcements for one report pass.
#[derive(Debug, Default)]
pub struct PluginReport {
    entries: Vec<PluginEntry>,
}

impl PluginReport {
    /// Announce a plugin.
    pub fn add(&mut self, name: &'static str, version: &'static str) {
        self.entries.push(PluginEntry { name, version });
    }

    /// Announced plugins, in registration-to-report order.
    pub fn entries(&self) -> &[PluginEntry] {
        &self.entries
    }
}

/// Notified when the host assembles an options report. Plugins announce
/// identity and version on the plain (non-structured) pass.
pub trait ReportListener: Send + Sync {
    fn on_report_options(&self, report: &mut PluginReport, structured: bool);
}
