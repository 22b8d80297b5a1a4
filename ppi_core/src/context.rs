//! Shared pulse state: configuration scalars and the travel accumulator.
//!
//! One context object is constructed at plugin initialization and shared
//! between the foreground mutators (command surface, capability
//! negotiator) and the real-time reader (pulse generator). Every field
//! is a scalar atomic: the real-time path reads without locks, and
//! foreground writes are tolerated to be stale for at most one pulse.
//!
//! ## Ordering
//!
//! Accumulator fields and configuration scalars use `Relaxed` access.
//! The one place ordering matters is the commanded-power transition: the
//! accumulator reset must be visible before the laser reads as on, so
//! `laser_on` is written with `Release` and read with `Acquire`.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use static_assertions::assert_impl_all;

use crate::config::PpiDefaults;

/// Millimetres per inch; pitch = MM_PER_INCH / rate.
pub const MM_PER_INCH: f64 = 25.4;

#[inline]
fn load_f64(cell: &AtomicU64) -> f64 {
    f64::from_bits(cell.load(Ordering::Relaxed))
}

#[inline]
fn store_f64(cell: &AtomicU64, value: f64) {
    cell.store(value.to_bits(), Ordering::Relaxed);
}

/// Shared state of the pulse core.
pub struct PulseContext {
    /// Pulse density [pulses/inch]; 0 = disabled.
    rate: AtomicU32,
    /// Distance between pulses [mm]; consistent with the last nonzero rate.
    pitch_mm: AtomicU64,
    /// Pulse length [µs]; applied to the next pulse fired.
    pulse_length_us: AtomicU32,
    /// Laser logically on for pulsing purposes (commanded power nonzero).
    laser_on: AtomicBool,
    /// Current driver supports laser pulse firing; published by the
    /// capability negotiator for command validation.
    supported: AtomicBool,
    /// Distance traveled since the last accumulator reset [mm]. Running
    /// sum carried across block boundaries.
    traveled_mm: AtomicU64,
    /// Travel at which the next pulse fires [mm]. 0 = freshly reset; the
    /// first threshold arms one pitch out on the first qualifying step.
    next_threshold_mm: AtomicU64,
    /// Distance of one step of the active block [mm].
    mm_per_step: AtomicU64,
}

assert_impl_all!(PulseContext: Send, Sync);

impl PulseContext {
    /// Context seeded from validated defaults, accumulator zeroed.
    pub fn new(defaults: &PpiDefaults) -> Self {
        let ctx = Self {
            rate: AtomicU32::new(0),
            pitch_mm: AtomicU64::new(0f64.to_bits()),
            pulse_length_us: AtomicU32::new(0),
            laser_on: AtomicBool::new(false),
            supported: AtomicBool::new(false),
            traveled_mm: AtomicU64::new(0f64.to_bits()),
            next_threshold_mm: AtomicU64::new(0f64.to_bits()),
            mm_per_step: AtomicU64::new(0f64.to_bits()),
        };
        ctx.set_rate(defaults.rate);
        ctx.set_pulse_length_us(defaults.pulse_length_us);
        ctx
    }

    // ── Configuration (foreground writers, real-time readers) ──

    /// Current pulse density [pulses/inch].
    pub fn rate(&self) -> u32 {
        self.rate.load(Ordering::Relaxed)
    }

    /// Set the pulse density. A nonzero rate re-derives the pitch; zero
    /// leaves the pitch untouched (pulsing is off via the rate check).
    pub fn set_rate(&self, rate: u32) {
        self.rate.store(rate, Ordering::Relaxed);
        if rate != 0 {
            store_f64(&self.pitch_mm, MM_PER_INCH / f64::from(rate));
        }
    }

    /// Distance between pulses [mm], per the last nonzero rate.
    pub fn pitch_mm(&self) -> f64 {
        load_f64(&self.pitch_mm)
    }

    /// Current pulse length [µs].
    pub fn pulse_length_us(&self) -> u32 {
        self.pulse_length_us.load(Ordering::Relaxed)
    }

    /// Set the pulse length; effective from the next pulse fired.
    pub fn set_pulse_length_us(&self, us: u32) {
        self.pulse_length_us.store(us, Ordering::Relaxed);
    }

    /// Rate and pulse length both permit pulsing.
    pub fn pulsing_configured(&self) -> bool {
        self.rate() > 0 && self.pulse_length_us() > 0
    }

    // ── Capability publication ──

    /// Current driver supports pulse firing.
    pub fn supported(&self) -> bool {
        self.supported.load(Ordering::Relaxed)
    }

    pub(crate) fn set_supported(&self, supported: bool) {
        self.supported.store(supported, Ordering::Relaxed);
    }

    // ── Laser power state ──

    /// Laser logically on for pulsing purposes.
    #[inline]
    pub fn laser_is_on(&self) -> bool {
        self.laser_on.load(Ordering::Acquire)
    }

    /// Record a commanded power level. An off→on transition resets the
    /// accumulator before the on state becomes visible to the step path.
    pub(crate) fn command_power(&self, on: bool) {
        if on && !self.laser_on.load(Ordering::Relaxed) {
            self.reset_accumulator();
        }
        self.laser_on.store(on, Ordering::Release);
    }

    // ── Accumulator ──

    /// Zero the travel accumulator and disarm the pulse threshold.
    pub fn reset_accumulator(&self) {
        store_f64(&self.traveled_mm, 0.0);
        store_f64(&self.next_threshold_mm, 0.0);
    }

    #[inline]
    pub(crate) fn traveled(&self) -> f64 {
        load_f64(&self.traveled_mm)
    }

    #[inline]
    pub(crate) fn set_traveled(&self, mm: f64) {
        store_f64(&self.traveled_mm, mm);
    }

    #[inline]
    pub(crate) fn next_threshold(&self) -> f64 {
        load_f64(&self.next_threshold_mm)
    }

    #[inline]
    pub(crate) fn set_next_threshold(&self, mm: f64) {
        store_f64(&self.next_threshold_mm, mm);
    }

    #[inline]
    pub(crate) fn mm_per_step(&self) -> f64 {
        load_f64(&self.mm_per_step)
    }

    #[inline]
    pub(crate) fn set_mm_per_step(&self, mm: f64) {
        store_f64(&self.mm_per_step, mm);
    }
}
