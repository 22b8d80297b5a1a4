//! Simulation backend: a recording laser driver and a step source.
//!
//! Used by the test suites and for hardware-free bring-up. The simulated
//! `fire_pulse` path mirrors the production constraint of the real-time
//! context: the pulse log is a fixed-size buffer, so recording allocates
//! nothing.

use std::sync::atomic::{AtomicU16, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::spindle::{DriverCaps, PowerDriver};
use crate::stepper::{AxisMask, StepEvent, StepperHooks};

/// Pulses retained by the simulated driver's log. Firing beyond this
/// keeps counting but drops the per-pulse record.
pub const PULSE_LOG_CAPACITY: usize = 256;

/// Simulated power driver recording everything commanded of it.
pub struct SimLaserDriver {
    name: &'static str,
    caps: DriverCaps,
    pulse_count: AtomicU32,
    pulse_log: Mutex<heapless::Vec<u32, PULSE_LOG_CAPACITY>>,
    last_duty: AtomicU16,
    last_speed_bits: AtomicU32,
}

impl SimLaserDriver {
    fn new(name: &'static str, caps: DriverCaps) -> Arc<Self> {
        Arc::new(Self {
            name,
            caps,
            pulse_count: AtomicU32::new(0),
            pulse_log: Mutex::new(heapless::Vec::new()),
            last_duty: AtomicU16::new(0),
            last_speed_bits: AtomicU32::new(0f32.to_bits()),
        })
    }

    /// Pulse-capable laser driver.
    pub fn laser() -> Arc<Self> {
        Self::new("sim-laser", DriverCaps::LASER | DriverCaps::PULSE)
    }

    /// Laser driver without the pulse primitive.
    pub fn laser_without_pulse() -> Arc<Self> {
        Self::new("sim-laser-cw", DriverCaps::LASER)
    }

    /// Rotary spindle driver (no laser capability at all).
    pub fn rotary_spindle() -> Arc<Self> {
        Self::new("sim-spindle", DriverCaps::empty())
    }

    /// Total pulses fired since construction.
    pub fn pulse_count(&self) -> u32 {
        self.pulse_count.load(Ordering::Relaxed)
    }

    /// Durations of the recorded pulses [µs], oldest first.
    pub fn pulse_lengths(&self) -> Vec<u32> {
        self.pulse_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .copied()
            .collect()
    }

    /// Last commanded duty cycle.
    pub fn last_duty(&self) -> u16 {
        self.last_duty.load(Ordering::Relaxed)
    }

    /// Last commanded speed.
    pub fn last_speed(&self) -> f32 {
        f32::from_bits(self.last_speed_bits.load(Ordering::Relaxed))
    }
}

impl PowerDriver for SimLaserDriver {
    fn name(&self) -> &'static str {
        self.name
    }

    fn caps(&self) -> DriverCaps {
        self.caps
    }

    fn fire_pulse(&self, duration_us: u32) {
        self.pulse_count.fetch_add(1, Ordering::Relaxed);
        let mut log = self.pulse_log.lock().unwrap_or_else(|e| e.into_inner());
        let _ = log.push(duration_us);
    }

    fn update_duty_cycle(&self, duty: u16) {
        self.last_duty.store(duty, Ordering::Relaxed);
    }

    fn update_speed(&self, speed: f32) {
        self.last_speed_bits.store(speed.to_bits(), Ordering::Relaxed);
    }
}

/// Base stepper hooks standing in for the motion system's own handlers.
///
/// Counts what reaches it so tests can assert that wrapper stages always
/// delegate.
pub struct SimMotion {
    wake_ups: AtomicU32,
    steps_seen: AtomicU32,
}

impl SimMotion {
    pub fn new() -> Self {
        Self {
            wake_ups: AtomicU32::new(0),
            steps_seen: AtomicU32::new(0),
        }
    }

    /// Wake-up calls delivered to the base hooks.
    pub fn wake_ups(&self) -> u32 {
        self.wake_ups.load(Ordering::Relaxed)
    }

    /// Step events delivered to the base hooks.
    pub fn steps_seen(&self) -> u32 {
        self.steps_seen.load(Ordering::Relaxed)
    }
}

impl Default for SimMotion {
    fn default() -> Self {
        Self::new()
    }
}

impl StepperHooks for SimMotion {
    fn wake_up(&self) {
        self.wake_ups.fetch_add(1, Ordering::Relaxed);
    }

    fn pulse_start(&self, _event: &StepEvent) {
        self.steps_seen.fetch_add(1, Ordering::Relaxed);
    }
}

/// Emit one motion block of `steps` single-axis step events into `hooks`.
///
/// The first event carries the new-block flag and the block's step
/// resolution, mirroring how a stepper driver announces a block.
pub fn drive_block(hooks: &crate::host::MachineHooks, steps_per_mm: f64, steps: u32) {
    drive_block_on(hooks, steps_per_mm, steps, AxisMask::X);
}

/// As [`drive_block`], stepping the given axes on every event.
pub fn drive_block_on(
    hooks: &crate::host::MachineHooks,
    steps_per_mm: f64,
    steps: u32,
    axes: AxisMask,
) {
    for i in 0..steps {
        let event = if i == 0 {
            StepEvent::block_start(steps_per_mm, axes)
        } else {
            StepEvent::step(steps_per_mm, axes)
        };
        hooks.step(&event);
    }
}
