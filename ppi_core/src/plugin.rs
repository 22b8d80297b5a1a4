//! Plugin registration and the engagement switch.
//!
//! `PpiPlugin::init` is the single entry point: it seeds the shared
//! context from validated defaults, saves every previously registered
//! chain head, and installs the plugin in front of each dispatch point.
//! Registration runs once, in foreground context, before any real-time
//! activity — the chains are never mutated concurrently with invocation.
//!
//! Engagement is a two-state switch whose transitions happen only in
//! foreground context. Net engagement requires all of:
//! - the Enable command latched on,
//! - a nonzero rate,
//! - a nonzero pulse length,
//! - a bound pulse-capable driver.
//!
//! Engaging swaps a [`StepPulseStage`] into the stepper hook slot;
//! disengaging swaps the exact original chain reference back. Both
//! directions are idempotent.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use ppi_hal::host::MachineHooks;
use ppi_hal::slot::HookSlot;
use ppi_hal::spindle::PowerDriver;
use ppi_hal::stepper::StepperHooks;

use crate::command::NextCommand;
use crate::config::{ConfigError, PpiDefaults};
use crate::context::PulseContext;
use crate::generator::StepPulseStage;
use crate::lifecycle::NextLifecycle;

/// Name announced in the host options report.
pub const PLUGIN_NAME: &str = "Laser PPI";

/// Foreground engagement bookkeeping. Never touched by the real-time
/// path; the mutex guards transitions against each other only.
pub(crate) struct EngageState {
    /// Latched by the Enable command.
    pub commanded_on: bool,
    /// Step hooks currently wrapped.
    pub engaged: bool,
    /// Currently bound pulse-capable driver, if any.
    pub binding: Option<Arc<dyn PowerDriver>>,
    /// Original stepper chain, held while engaged for exact restoration.
    pub saved_hooks: Option<Arc<dyn StepperHooks>>,
}

/// The laser PPI plugin. One instance per machine, shared between the
/// host's dispatch chains.
pub struct PpiPlugin {
    pub(crate) ctx: Arc<PulseContext>,
    pub(crate) stepper_slot: Arc<HookSlot<dyn StepperHooks>>,
    pub(crate) spindle_slot: Arc<HookSlot<dyn PowerDriver>>,
    pub(crate) state: Mutex<EngageState>,
    pub(crate) next_command: NextCommand,
    pub(crate) next: NextLifecycle,
}

impl PpiPlugin {
    /// Register the plugin into the host's dispatch chains.
    ///
    /// Saves the previous head of every chain the plugin extends, then
    /// installs itself. Foreground context, init time only.
    pub fn init(hooks: &mut MachineHooks, defaults: PpiDefaults) -> Result<Arc<Self>, ConfigError> {
        defaults.validate()?;

        let plugin = Arc::new(Self {
            ctx: Arc::new(PulseContext::new(&defaults)),
            stepper_slot: hooks.stepper.clone(),
            spindle_slot: hooks.spindle.clone(),
            state: Mutex::new(EngageState {
                commanded_on: false,
                engaged: false,
                binding: None,
                saved_hooks: None,
            }),
            next_command: NextCommand {
                handler: hooks.user_command.take(),
            },
            next: NextLifecycle {
                selection: hooks.on_spindle_selected.take(),
                parser: hooks.on_parser_reinit.take(),
                program: hooks.on_program_completed.take(),
                report: hooks.on_report_options.take(),
            },
        });

        hooks.user_command = Some(plugin.clone());
        hooks.on_spindle_selected = Some(plugin.clone());
        hooks.on_parser_reinit = Some(plugin.clone());
        hooks.on_program_completed = Some(plugin.clone());
        hooks.on_report_options = Some(plugin.clone());

        info!(
            rate = defaults.rate,
            pulse_length_us = defaults.pulse_length_us,
            "laser PPI plugin registered"
        );
        Ok(plugin)
    }

    /// Shared pulse state (configuration scalars and accumulator).
    pub fn context(&self) -> &PulseContext {
        &self.ctx
    }

    /// Step hooks currently wrapped.
    pub fn engaged(&self) -> bool {
        self.lock_state().engaged
    }

    pub(crate) fn lock_state(&self) -> std::sync::MutexGuard<'_, EngageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Latch the Enable command state and re-derive net engagement.
    pub(crate) fn set_commanded(&self, on: bool) {
        self.lock_state().commanded_on = on;
        self.apply_engagement();
    }

    /// Re-derive net engagement and switch the step hooks accordingly.
    /// Idempotent in both directions.
    pub(crate) fn apply_engagement(&self) {
        let mut state = self.lock_state();
        let want =
            state.commanded_on && self.ctx.pulsing_configured() && state.binding.is_some();
        if want {
            self.engage_locked(&mut state);
        } else {
            self.disengage_locked(&mut state);
        }
    }

    /// Force pulsing off: clear the Enable latch and unwrap the hooks.
    /// Used by the lifecycle hooks (parser reinit, program completion).
    pub(crate) fn force_off(&self, reason: &'static str) {
        let mut state = self.lock_state();
        state.commanded_on = false;
        if state.engaged {
            debug!(reason, "laser PPI forced off");
        }
        self.disengage_locked(&mut state);
    }

    fn engage_locked(&self, state: &mut EngageState) {
        if state.engaged {
            return;
        }
        let Some(driver) = state.binding.clone() else {
            return;
        };

        let original = self.stepper_slot.current();
        let stage = Arc::new(StepPulseStage::new(
            self.ctx.clone(),
            driver,
            original.clone(),
        ));
        // Spacing restarts from the current position, even if power is
        // already commanded nonzero.
        self.ctx.reset_accumulator();
        self.stepper_slot.swap(stage);
        state.saved_hooks = Some(original);
        state.engaged = true;
        debug!(
            rate = self.ctx.rate(),
            pulse_length_us = self.ctx.pulse_length_us(),
            "laser PPI engaged"
        );
    }

    pub(crate) fn disengage_locked(&self, state: &mut EngageState) {
        if !state.engaged {
            return;
        }
        if let Some(original) = state.saved_hooks.take() {
            self.stepper_slot.swap(original);
        }
        state.engaged = false;
        debug!("laser PPI disengaged");
    }
}
