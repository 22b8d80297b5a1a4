//! Lifecycle hooks: parser reinit, program completion, option reports.
//!
//! Pulsing must never stay armed past the job that armed it. Parser
//! reinitialization (machine reset, new program) and normal program
//! completion both force the enable latch off and unwrap the step
//! hooks; a check-mode completion leaves everything untouched. The
//! report hook only announces plugin identity.

use std::sync::Arc;

use ppi_hal::events::{
    ParserListener, ParserState, PluginReport, ProgramFlow, ProgramListener, ReportListener,
    SelectionListener,
};

use crate::plugin::{PLUGIN_NAME, PpiPlugin};

/// Previously registered lifecycle listeners, delegated to exactly once
/// per event.
pub(crate) struct NextLifecycle {
    pub selection: Option<Arc<dyn SelectionListener>>,
    pub parser: Option<Arc<dyn ParserListener>>,
    pub program: Option<Arc<dyn ProgramListener>>,
    pub report: Option<Arc<dyn ReportListener>>,
}

impl ParserListener for PpiPlugin {
    fn on_parser_reinit(&self, state: &ParserState) {
        self.force_off("parser reinit");
        if let Some(next) = &self.next.parser {
            next.on_parser_reinit(state);
        }
    }
}

impl ProgramListener for PpiPlugin {
    fn on_program_completed(&self, flow: ProgramFlow, check_mode: bool) {
        if !check_mode {
            self.force_off("program completed");
        }
        if let Some(next) = &self.next.program {
            next.on_program_completed(flow, check_mode);
        }
    }
}

impl ReportListener for PpiPlugin {
    fn on_report_options(&self, report: &mut PluginReport, structured: bool) {
        // Earlier registrations report first.
        if let Some(next) = &self.next.report {
            next.on_report_options(report, structured);
        }
        if !structured {
            report.add(PLUGIN_NAME, env!("CARGO_PKG_VERSION"));
        }
    }
}
