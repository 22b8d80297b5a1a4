//! Engagement lifecycle end-to-end: arming, lifecycle disarm, recovery.

use std::sync::Arc;

use ppi_hal::command::CommandBlock;
use ppi_hal::events::{ParserState, ProgramFlow};
use ppi_hal::status::{ExecMode, Rejection};

use ppi_core::command::{MCODE_PPI_ENABLE, MCODE_PPI_RATE};

use super::Fixture;

#[test]
fn program_completion_disarms_until_reenabled() {
    let fx = Fixture::new();
    fx.command(MCODE_PPI_ENABLE, 1.0);
    fx.power(1000);
    fx.run_block(100.0, 100);
    assert_eq!(fx.laser.pulse_count(), 23);

    fx.hooks.complete_program(ProgramFlow::CompletedM2, false);
    assert!(!fx.plugin.engaged());

    // Subsequent motion produces no pulses, but steps flow untouched.
    fx.run_block(100.0, 500);
    assert_eq!(fx.laser.pulse_count(), 23);
    assert_eq!(fx.motion.steps_seen(), 600);

    // Re-enabling resumes correct counting.
    fx.command(MCODE_PPI_ENABLE, 1.0);
    fx.power(0);
    fx.power(1000);
    fx.run_block(100.0, 100);
    assert_eq!(fx.laser.pulse_count(), 46);
}

#[test]
fn parser_reinit_disarms() {
    let fx = Fixture::new();
    fx.command(MCODE_PPI_ENABLE, 1.0);
    fx.power(1000);

    fx.hooks.reinit_parser(&ParserState::default());
    assert!(!fx.plugin.engaged());
    fx.run_block(100.0, 200);
    assert_eq!(fx.laser.pulse_count(), 0);
}

#[test]
fn lifecycle_disarm_restores_original_hooks_exactly() {
    let fx = Fixture::new();
    let original = fx.hooks.stepper.current();

    fx.command(MCODE_PPI_ENABLE, 1.0);
    assert!(!Arc::ptr_eq(&fx.hooks.stepper.current(), &original));

    fx.hooks.complete_program(ProgramFlow::CompletedM30, false);
    assert!(Arc::ptr_eq(&fx.hooks.stepper.current(), &original));
}

#[test]
fn check_mode_program_keeps_pulsing_armed() {
    let fx = Fixture::new();
    fx.command(MCODE_PPI_ENABLE, 1.0);
    fx.power(1000);

    fx.hooks.complete_program(ProgramFlow::CompletedM2, true);
    assert!(fx.plugin.engaged());
    fx.run_block(100.0, 100);
    assert_eq!(fx.laser.pulse_count(), 23);
}

#[test]
fn rejected_commands_leave_state_untouched() {
    let fx = Fixture::new();

    let mut block = CommandBlock::new(MCODE_PPI_ENABLE);
    assert_eq!(
        fx.hooks.dispatch_command(&mut block, ExecMode::Normal),
        Err(Rejection::ValueWordMissing)
    );
    assert!(!fx.plugin.engaged());

    let mut block = CommandBlock::with_p(MCODE_PPI_RATE, -5.0);
    assert_eq!(
        fx.hooks.dispatch_command(&mut block, ExecMode::Normal),
        Err(Rejection::ValueOutOfRange)
    );
    assert_eq!(fx.plugin.context().rate(), 600);
}

#[test]
fn full_session_round_trip() {
    let fx = Fixture::new();

    // Operator arms PPI, runs a cut, machine resets, runs a plain cut.
    fx.command(MCODE_PPI_RATE, 254.0);
    fx.command(MCODE_PPI_ENABLE, 1.0);
    fx.power(800);
    fx.run_block(100.0, 105); // 1.05 mm, pitch 0.1 → 10 pulses
    assert_eq!(fx.laser.pulse_count(), 10);
    fx.power(0);

    fx.hooks.reinit_parser(&ParserState::default());

    fx.power(800);
    fx.run_block(100.0, 105);
    assert_eq!(fx.laser.pulse_count(), 10);
    assert_eq!(fx.laser.last_duty(), 800);
}
