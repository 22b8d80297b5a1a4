//! Step event descriptor and motion hook contract.
//!
//! The motion system emits one [`StepEvent`] per step interrupt. On a
//! multi-axis move only the fastest axis steps on every event; slower
//! axes skip cycles, and an event that produced no physical step output
//! at all carries an empty [`AxisMask`].

use bitflags::bitflags;

bitflags! {
    /// Per-axis step output indicators for one step event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AxisMask: u8 {
        const X = 1 << 0;
        const Y = 1 << 1;
        const Z = 1 << 2;
        const A = 1 << 3;
        const B = 1 << 4;
        const C = 1 << 5;
    }
}

/// Descriptor for one step event on the real-time step-output path.
#[derive(Debug, Clone, Copy)]
pub struct StepEvent {
    /// True on the first event of a new motion block.
    pub new_block: bool,
    /// Axes that produced a physical step output on this event.
    pub step_out: AxisMask,
    /// Step resolution of the active block [steps/mm]. Constant within a
    /// block, valid whenever `new_block` is set.
    pub steps_per_mm: f64,
}

impl StepEvent {
    /// First event of a block: announces the block's step resolution.
    pub fn block_start(steps_per_mm: f64, step_out: AxisMask) -> Self {
        Self {
            new_block: true,
            step_out,
            steps_per_mm,
        }
    }

    /// Subsequent event within the current block.
    pub fn step(steps_per_mm: f64, step_out: AxisMask) -> Self {
        Self {
            new_block: false,
            step_out,
            steps_per_mm,
        }
    }
}

/// Motion hooks invoked by the stepper driver.
///
/// `wake_up` runs in foreground context on every idle→moving transition;
/// `pulse_start` runs in the real-time step-output context, potentially
/// at tens of kHz. Implementations of `pulse_start` must be
/// allocation-free, lock-free, and bounded-time, and must never block.
pub trait StepperHooks: Send + Sync {
    /// Called once per transition from idle to an active run.
    fn wake_up(&self);

    /// Called once per generated step event.
    fn pulse_start(&self, event: &StepEvent);
}
