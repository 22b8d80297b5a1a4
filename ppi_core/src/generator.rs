//! Step-synchronized pulse generation: the real-time stage.
//!
//! While engaged, a [`StepPulseStage`] sits in front of the motion
//! system's stepper hooks. It accumulates distance for every physical
//! step, fires one pulse each time the accumulated travel crosses the
//! next pitch boundary, and always delegates to the original hooks — it
//! adds a side effect and never suppresses or alters step output.
//!
//! This is the highest-frequency path in the system (step rate,
//! potentially tens of kHz): no allocation, no locks, no logging, no
//! blocking. All shared state is read from [`PulseContext`] atomics.

use std::sync::Arc;

use ppi_hal::spindle::PowerDriver;
use ppi_hal::stepper::{StepEvent, StepperHooks};

use crate::context::PulseContext;

/// Wrapper stage installed in the stepper hook slot while engaged.
pub struct StepPulseStage {
    ctx: Arc<PulseContext>,
    /// Bound pulse-capable driver, captured at engagement.
    driver: Arc<dyn PowerDriver>,
    /// Original hook chain; every call delegates here exactly once.
    next: Arc<dyn StepperHooks>,
}

impl StepPulseStage {
    pub fn new(
        ctx: Arc<PulseContext>,
        driver: Arc<dyn PowerDriver>,
        next: Arc<dyn StepperHooks>,
    ) -> Self {
        Self { ctx, driver, next }
    }
}

impl StepperHooks for StepPulseStage {
    fn wake_up(&self) {
        // Idle → moving: pulse spacing restarts from the new position.
        self.ctx.reset_accumulator();
        self.next.wake_up();
    }

    #[inline]
    fn pulse_start(&self, event: &StepEvent) {
        if event.new_block && event.steps_per_mm > 0.0 {
            self.ctx.set_mm_per_step(1.0 / event.steps_per_mm);
        }

        if self.ctx.laser_is_on() && !event.step_out.is_empty() {
            let traveled = self.ctx.traveled() + self.ctx.mm_per_step();
            self.ctx.set_traveled(traveled);

            let pitch = self.ctx.pitch_mm();
            let mut threshold = self.ctx.next_threshold();
            if threshold == 0.0 {
                // Freshly reset: first pulse one pitch out.
                threshold = pitch;
            }
            if traveled >= threshold {
                // One pulse per step event; any overshoot is caught up on
                // the next qualifying step.
                self.ctx.set_next_threshold(threshold + pitch);
                self.driver.fire_pulse(self.ctx.pulse_length_us());
            } else {
                self.ctx.set_next_threshold(threshold);
            }
        }

        self.next.pulse_start(event);
    }
}
