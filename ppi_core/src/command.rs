//! Custom machine commands: enable, rate, pulse length.
//!
//! Three codes, layered in front of whatever command handler the host
//! had before the plugin registered:
//!
//! - `M126 P<0|1>` — latch PPI mode on/off.
//! - `M127 P<pulses-per-inch>` — set the pulse density; `P0` disables
//!   pulsing through the rate check.
//! - `M128 P<µs>` — set the pulse length.
//!
//! Rate and pulse length execute synchronously (in program order, no
//! look-ahead): a density change must not apply to motion queued before
//! it. Validation claims the P word so downstream handlers never see it.

use std::sync::Arc;

use tracing::debug;

use ppi_hal::command::{CommandBlock, CommandClass, CommandHandler, Words};
use ppi_hal::status::{ExecMode, Rejection};

use crate::config::VALUE_MAX;
use crate::plugin::PpiPlugin;

/// `M126` — latch PPI mode on/off.
pub const MCODE_PPI_ENABLE: u16 = 126;
/// `M127` — set pulse density [pulses/inch].
pub const MCODE_PPI_RATE: u16 = 127;
/// `M128` — set pulse length [µs].
pub const MCODE_PPI_PULSE_LENGTH: u16 = 128;

/// Previously registered command handler, delegated to for everything
/// the plugin does not recognize.
pub(crate) struct NextCommand {
    pub handler: Option<Arc<dyn CommandHandler>>,
}

/// The three PPI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PpiCommand {
    Enable,
    Rate,
    PulseLength,
}

impl PpiCommand {
    const fn from_code(code: u16) -> Option<Self> {
        match code {
            MCODE_PPI_ENABLE => Some(Self::Enable),
            MCODE_PPI_RATE => Some(Self::Rate),
            MCODE_PPI_PULSE_LENGTH => Some(Self::PulseLength),
            _ => None,
        }
    }
}

impl CommandHandler for PpiPlugin {
    fn classify(&self, code: u16) -> CommandClass {
        if PpiCommand::from_code(code).is_some() {
            return CommandClass::Normal;
        }
        match &self.next_command.handler {
            Some(next) => next.classify(code),
            None => CommandClass::Unsupported,
        }
    }

    fn validate(&self, block: &mut CommandBlock) -> Result<(), Rejection> {
        let Some(command) = PpiCommand::from_code(block.code) else {
            return match &self.next_command.handler {
                Some(next) => next.validate(block),
                None => Err(Rejection::UnsupportedCommand),
            };
        };

        // Density and pulse length are meaningless without a driver that
        // can fire pulses.
        if matches!(command, PpiCommand::Rate | PpiCommand::PulseLength)
            && !self.ctx.supported()
        {
            return Err(Rejection::UnsupportedCommand);
        }

        if !block.words.contains(Words::P) {
            return Err(Rejection::ValueWordMissing);
        }
        let value = block.values.p;
        if !value.is_finite() || value < 0.0 || value > f64::from(VALUE_MAX) {
            return Err(Rejection::ValueOutOfRange);
        }

        block.words.remove(Words::P);
        if matches!(command, PpiCommand::Rate | PpiCommand::PulseLength) {
            block.requires_sync = true;
        }
        Ok(())
    }

    fn execute(&self, mode: ExecMode, block: &CommandBlock) {
        let Some(command) = PpiCommand::from_code(block.code) else {
            if let Some(next) = &self.next_command.handler {
                next.execute(mode, block);
            }
            return;
        };

        // Check mode: the command was validated; nothing may mutate.
        if mode == ExecMode::Check {
            return;
        }

        match command {
            PpiCommand::Enable => {
                let on = block.values.p != 0.0;
                debug!(on, "PPI enable");
                self.set_commanded(on);
                return;
            }
            PpiCommand::Rate => {
                let rate = block.values.p as u32;
                debug!(rate, "PPI rate");
                self.ctx.set_rate(rate);
            }
            PpiCommand::PulseLength => {
                let us = block.values.p as u32;
                debug!(us, "PPI pulse length");
                self.ctx.set_pulse_length_us(us);
            }
        }
        self.apply_engagement();
    }
}
