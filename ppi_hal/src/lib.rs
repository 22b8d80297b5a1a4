//! # PPI HAL
//!
//! Host boundary contracts for the laser PPI pulse core. The pulse plugin
//! never talks to hardware directly; it installs itself into the dispatch
//! points defined here and consumes the capability set the host publishes:
//!
//! - [`spindle`] — power driver trait, capability flags, and the active
//!   driver slot.
//! - [`stepper`] — step event descriptor and the motion hook trait pair
//!   (`wake_up` / `pulse_start`).
//! - [`slot`] — the lock-free hook slot: an immutable handler chain
//!   reference swapped atomically from foreground context.
//! - [`command`] — machine command block model and the three-stage
//!   (classify / validate / execute) handler contract.
//! - [`events`] — lifecycle listener traits: spindle selection, parser
//!   reinitialization, program completion, option reporting.
//! - [`host`] — the registry owning every dispatch point, with the
//!   command pipeline the host runs for custom machine commands.
//! - [`sim`] — simulation backend: a recording laser driver and a step
//!   source, for tests and hardware-free bring-up.
//!
//! ## Execution contexts
//!
//! Two contexts exist host-wide: a foreground task context (command
//! execution, serialized by the host command queue) and a real-time
//! step-output context running at the motion system's step rate. Traits
//! invoked from the real-time context ([`stepper::StepperHooks`],
//! [`spindle::PowerDriver::fire_pulse`]) must be allocation-free,
//! lock-free, and bounded-time.

pub mod command;
pub mod events;
pub mod host;
pub mod prelude;
pub mod sim;
pub mod slot;
pub mod spindle;
pub mod status;
pub mod stepper;
