//! # Laser PPI Pulse Core
//!
//! Converts a continuously commanded laser power level into a train of
//! fixed-duration pulses spatially locked to physical motion, at a
//! programmable pulse density in pulses per inch (PPI). Lasers that cut
//! by discrete firing rather than continuous output get a constant
//! pulse-per-distance density regardless of feed rate.
//!
//! The plugin layers itself into the host's dispatch chains:
//!
//! 1. **Command surface** — `M126 P<0|1>` arms/disarms PPI mode,
//!    `M127 P<ppi>` sets the pulse density, `M128 P<µs>` sets the pulse
//!    length. Unrecognized commands are delegated to whatever handler was
//!    registered before the plugin.
//! 2. **Capability negotiator** — on every spindle selection, checks for
//!    laser + pulse-fire capability, binds the driver, and wraps its
//!    power-update entry points so ordinary power commands (S words)
//!    drive the pulsing state.
//! 3. **Pulse generator** — while engaged, wraps the stepper wake-up and
//!    per-step hooks; accumulates distance per physical step and fires
//!    one pulse each time the accumulated travel crosses the next pitch
//!    boundary.
//! 4. **Lifecycle hooks** — parser reinitialization and program
//!    completion force pulsing off so a laser can never stay armed past
//!    the end of a job.
//!
//! ## Execution contexts
//!
//! Command execution, capability negotiation, and engagement switching
//! run in foreground context. The per-step path runs in the real-time
//! step-output context and is allocation-free and lock-free: shared
//! state lives in [`context::PulseContext`], a set of scalar atomics.

pub mod capability;
pub mod command;
pub mod config;
pub mod context;
pub mod generator;
pub mod lifecycle;
pub mod plugin;
