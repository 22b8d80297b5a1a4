//! End-to-end pulse train accuracy.
//!
//! Reference setup throughout: 600 pulses/inch → pitch = 25.4/600 ≈
//! 0.042333 mm, pulse length 1500 µs, single-axis motion at
//! 100 steps/mm (0.01 mm per step).

use ppi_core::command::{MCODE_PPI_ENABLE, MCODE_PPI_PULSE_LENGTH, MCODE_PPI_RATE};

use super::Fixture;

#[test]
fn one_millimetre_fires_23_pulses() {
    let fx = Fixture::new();
    fx.command(MCODE_PPI_ENABLE, 1.0);
    fx.power(1000);

    fx.run_block(100.0, 100);
    // ⌊1 mm / 0.042333 mm⌋ = 23; the 24th boundary at 1.016 mm is not
    // reached.
    assert_eq!(fx.laser.pulse_count(), 23);
    // Step output itself is untouched by the wrapper.
    assert_eq!(fx.motion.steps_seen(), 100);
    assert_eq!(fx.motion.wake_ups(), 1);
}

#[test]
fn every_pulse_uses_configured_length() {
    let fx = Fixture::new();
    fx.command(MCODE_PPI_PULSE_LENGTH, 1500.0);
    fx.command(MCODE_PPI_ENABLE, 1.0);
    fx.power(1000);

    fx.run_block(100.0, 100);
    let lengths = fx.laser.pulse_lengths();
    assert_eq!(lengths.len(), 23);
    assert!(lengths.iter().all(|&us| us == 1500));
}

#[test]
fn pulse_count_is_chunking_independent() {
    let split = Fixture::new();
    split.command(MCODE_PPI_ENABLE, 1.0);
    split.power(1000);
    // Same 1 mm delivered as one wake-up and four 0.25 mm blocks.
    split.hooks.wake_steppers();
    for _ in 0..4 {
        ppi_hal::sim::drive_block(&split.hooks, 100.0, 25);
    }
    assert_eq!(split.laser.pulse_count(), 23);
}

#[test]
fn zero_rate_never_pulses() {
    let fx = Fixture::new();
    fx.command(MCODE_PPI_RATE, 0.0);
    fx.command(MCODE_PPI_ENABLE, 1.0);
    fx.power(1000);

    fx.run_block(100.0, 2000); // 20 mm
    assert_eq!(fx.laser.pulse_count(), 0);
}

#[test]
fn zero_power_never_pulses() {
    let fx = Fixture::new();
    fx.command(MCODE_PPI_ENABLE, 1.0);

    fx.run_block(100.0, 1000);
    assert_eq!(fx.laser.pulse_count(), 0);
}

#[test]
fn enabling_with_power_already_on_starts_fresh() {
    let fx = Fixture::new();
    // Power commanded before PPI mode is armed.
    fx.power(1000);
    fx.command(MCODE_PPI_ENABLE, 1.0);

    // First pulse exactly one pitch out: 0.042333 mm at 0.01 mm/step →
    // fires on step 5, not earlier.
    fx.hooks.wake_steppers();
    ppi_hal::sim::drive_block(&fx.hooks, 100.0, 4);
    assert_eq!(fx.laser.pulse_count(), 0);
    ppi_hal::sim::drive_block(&fx.hooks, 100.0, 1);
    assert_eq!(fx.laser.pulse_count(), 1);
}

#[test]
fn rate_change_applies_to_subsequent_motion() {
    let fx = Fixture::new();
    fx.command(MCODE_PPI_RATE, 254.0); // pitch 0.1 mm
    fx.command(MCODE_PPI_ENABLE, 1.0);
    fx.power(1000);

    fx.run_block(100.0, 100); // 1 mm → 10 pulses
    assert_eq!(fx.laser.pulse_count(), 10);
}

#[test]
fn wake_up_restarts_spacing_between_runs() {
    let fx = Fixture::new();
    fx.command(MCODE_PPI_RATE, 254.0); // pitch 0.1 mm
    fx.command(MCODE_PPI_ENABLE, 1.0);
    fx.power(1000);

    fx.run_block(100.0, 95); // 0.95 mm → 9 pulses, 0.05 mm into the next pitch
    assert_eq!(fx.laser.pulse_count(), 9);

    // New run: the leftover 0.05 mm does not carry over.
    fx.run_block(100.0, 9); // 0.09 mm < pitch
    assert_eq!(fx.laser.pulse_count(), 9);
    ppi_hal::sim::drive_block(&fx.hooks, 100.0, 2); // 0.11 mm
    assert_eq!(fx.laser.pulse_count(), 10);
}
