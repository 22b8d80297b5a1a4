//! Host registry: every dispatch point a plugin can extend.
//!
//! `MachineHooks` is the single registration structure plugins receive
//! at initialization. Foreground chains (`user_command`, the lifecycle
//! listeners) are plain head references mutated only during init, before
//! any dispatch can occur. The two real-time dispatch points — stepper
//! hooks and the active power driver — live in [`HookSlot`]s so that
//! engagement-time changes are atomic chain swaps.

use std::sync::Arc;

use tracing::debug;

use crate::command::{CommandBlock, CommandClass, CommandHandler};
use crate::events::{
    ParserListener, ParserState, PluginReport, ProgramFlow, ProgramListener, ReportListener,
    SelectionListener,
};
use crate::slot::HookSlot;
use crate::spindle::{DriverHandle, NullDriver, PowerDriver};
use crate::status::{ExecMode, Rejection};
use crate::stepper::{StepEvent, StepperHooks};

/// Registry of host dispatch points.
pub struct MachineHooks {
    /// Stepper hook chain (wake-up + per-step), swapped on engagement.
    pub stepper: Arc<HookSlot<dyn StepperHooks>>,
    /// Active power driver, swapped on selection and capability wrap.
    pub spindle: Arc<HookSlot<dyn PowerDriver>>,
    /// Head of the custom machine command chain.
    pub user_command: Option<Arc<dyn CommandHandler>>,
    /// Head of the spindle-selection listener chain.
    pub on_spindle_selected: Option<Arc<dyn SelectionListener>>,
    /// Head of the parser-reinit listener chain.
    pub on_parser_reinit: Option<Arc<dyn ParserListener>>,
    /// Head of the program-completed listener chain.
    pub on_program_completed: Option<Arc<dyn ProgramListener>>,
    /// Head of the report-options listener chain.
    pub on_report_options: Option<Arc<dyn ReportListener>>,
}

impl MachineHooks {
    /// Registry with `base_stepper` as the motion system's own hook
    /// implementation and no driver selected yet.
    pub fn new(base_stepper: Arc<dyn StepperHooks>) -> Self {
        Self {
            stepper: Arc::new(HookSlot::new(base_stepper)),
            spindle: Arc::new(HookSlot::new(Arc::new(NullDriver))),
            user_command: None,
            on_spindle_selected: None,
            on_parser_reinit: None,
            on_program_completed: None,
            on_report_options: None,
        }
    }

    /// Make `driver` the active power driver and run the selection
    /// listener chain. Foreground context.
    pub fn select_spindle(&self, driver: DriverHandle) {
        debug!(driver = driver.name(), "spindle selected");
        self.spindle.swap(driver.clone());
        if let Some(listener) = &self.on_spindle_selected {
            listener.on_spindle_selected(&driver);
        }
    }

    /// Announce parser reinitialization (machine reset / new program).
    pub fn reinit_parser(&self, state: &ParserState) {
        if let Some(listener) = &self.on_parser_reinit {
            listener.on_parser_reinit(state);
        }
    }

    /// Announce normal program completion.
    pub fn complete_program(&self, flow: ProgramFlow, check_mode: bool) {
        if let Some(listener) = &self.on_program_completed {
            listener.on_program_completed(flow, check_mode);
        }
    }

    /// Assemble one options report pass.
    pub fn report_options(&self, structured: bool) -> PluginReport {
        let mut report = PluginReport::default();
        if let Some(listener) = &self.on_report_options {
            listener.on_report_options(&mut report, structured);
        }
        report
    }

    /// Wake the stepper subsystem (idle → moving transition).
    pub fn wake_steppers(&self) {
        self.stepper.dispatch(|hooks| hooks.wake_up());
    }

    /// Deliver one step event to the active hook chain. This is the
    /// real-time entry point; in production it runs at step rate.
    #[inline]
    pub fn step(&self, event: &StepEvent) {
        self.stepper.dispatch(|hooks| hooks.pulse_start(event));
    }

    /// Run a custom machine command through the pipeline:
    /// classify → validate → unused-word check → execute.
    pub fn dispatch_command(
        &self,
        block: &mut CommandBlock,
        mode: ExecMode,
    ) -> Result<(), Rejection> {
        let Some(handler) = &self.user_command else {
            return Err(Rejection::UnsupportedCommand);
        };
        match handler.classify(block.code) {
            CommandClass::Unsupported => Err(Rejection::UnsupportedCommand),
            CommandClass::Normal => {
                handler.validate(block)?;
                if !block.words.is_empty() {
                    return Err(Rejection::UnusedWords);
                }
                handler.execute(mode, block);
                Ok(())
            }
        }
    }
}
