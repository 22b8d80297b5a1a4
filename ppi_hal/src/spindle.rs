//! Power driver contract and capability flags.
//!
//! A power driver is the component that physically energizes the
//! spindle or laser. Drivers advertise what they can do through
//! [`DriverCaps`]; discrete pulse firing is optional and is the
//! capability the PPI core negotiates for.

use std::sync::Arc;

use bitflags::bitflags;

bitflags! {
    /// Capability flags a power driver advertises at selection time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DriverCaps: u8 {
        /// The driver energizes a laser (as opposed to a rotary spindle).
        const LASER = 1 << 0;
        /// The driver exposes the discrete pulse-fire primitive.
        const PULSE = 1 << 1;
    }
}

/// Interface to the currently selected power driver.
///
/// `update_duty_cycle` and `update_speed` are invoked from foreground
/// context as the planner applies programmed power. `fire_pulse` is
/// invoked from the real-time step path and is fire-and-forget: it must
/// not block, allocate, or report failure.
pub trait PowerDriver: Send + Sync {
    /// Driver identifier (e.g. "pwm-laser", "vfd-spindle").
    fn name(&self) -> &'static str;

    /// Advertised capabilities.
    fn caps(&self) -> DriverCaps;

    /// Emit one pulse of `duration_us` microseconds. No-op for drivers
    /// without [`DriverCaps::PULSE`].
    fn fire_pulse(&self, duration_us: u32);

    /// Apply a duty-cycle based power level.
    fn update_duty_cycle(&self, duty: u16);

    /// Apply a speed based power level [RPM or device units].
    fn update_speed(&self, speed: f32);
}

/// Placeholder driver occupying the active slot before any selection.
///
/// Advertises no capabilities; every output is discarded.
pub struct NullDriver;

impl PowerDriver for NullDriver {
    fn name(&self) -> &'static str {
        "null"
    }

    fn caps(&self) -> DriverCaps {
        DriverCaps::empty()
    }

    fn fire_pulse(&self, _duration_us: u32) {}

    fn update_duty_cycle(&self, _duty: u16) {}

    fn update_speed(&self, _speed: f32) {}
}

/// Shared handle to a power driver.
pub type DriverHandle = Arc<dyn PowerDriver>;
