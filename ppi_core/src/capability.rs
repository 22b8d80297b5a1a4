//! Capability negotiation on spindle selection.
//!
//! Every spindle-selection event re-evaluates whether the new driver can
//! fire discrete pulses (laser capability plus the pulse primitive).
//! A capable driver is bound and its power-update entry points are
//! wrapped, so ordinary power commands — not just the machine commands —
//! drive the pulsing state once PPI is armed. An incapable driver clears
//! the binding and forces engagement off.

use std::sync::Arc;

use tracing::debug;

use ppi_hal::events::SelectionListener;
use ppi_hal::spindle::{DriverCaps, DriverHandle, PowerDriver};

use crate::context::PulseContext;
use crate::plugin::PpiPlugin;

/// Proxy layered over a bound driver's power-update entry points.
///
/// Detects the zero→nonzero power transition (reset spacing, laser
/// logically on) and the return to zero (laser off), then calls through
/// to the wrapped driver unconditionally.
pub(crate) struct PowerProxy {
    inner: Arc<dyn PowerDriver>,
    ctx: Arc<PulseContext>,
}

impl PowerProxy {
    pub(crate) fn new(inner: Arc<dyn PowerDriver>, ctx: Arc<PulseContext>) -> Self {
        Self { inner, ctx }
    }
}

impl PowerDriver for PowerProxy {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn caps(&self) -> DriverCaps {
        self.inner.caps()
    }

    fn fire_pulse(&self, duration_us: u32) {
        self.inner.fire_pulse(duration_us);
    }

    fn update_duty_cycle(&self, duty: u16) {
        self.ctx.command_power(duty > 0);
        self.inner.update_duty_cycle(duty);
    }

    fn update_speed(&self, speed: f32) {
        self.ctx.command_power(speed > 0.0);
        self.inner.update_speed(speed);
    }
}

impl SelectionListener for PpiPlugin {
    fn on_spindle_selected(&self, driver: &DriverHandle) {
        let caps = driver.caps();
        let supported = caps.contains(DriverCaps::LASER | DriverCaps::PULSE);
        self.ctx.set_supported(supported);

        {
            let mut state = self.lock_state();
            // The engaged stage holds the previous driver; unwrap before
            // rebinding. The enable latch survives a driver change.
            self.disengage_locked(&mut state);
            state.binding = supported.then(|| driver.clone());
        }

        if supported {
            // Wrap the freshly selected driver's power updates.
            let active = self.spindle_slot.current();
            self.spindle_slot
                .swap(Arc::new(PowerProxy::new(active, self.ctx.clone())));
        }
        debug!(driver = driver.name(), supported, "spindle capability negotiated");

        // Re-engage against the new binding if the latch and config allow.
        self.apply_engagement();

        if let Some(next) = &self.next.selection {
            next.on_spindle_selected(driver);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use ppi_hal::command::CommandBlock;
    use ppi_hal::host::MachineHooks;
    use ppi_hal::sim::{SimLaserDriver, SimMotion};
    use ppi_hal::status::ExecMode;

    use crate::command::MCODE_PPI_ENABLE;
    use crate::config::PpiDefaults;

    fn host_with_plugin() -> (MachineHooks, Arc<PpiPlugin>) {
        let mut hooks = MachineHooks::new(Arc::new(SimMotion::new()));
        let plugin = PpiPlugin::init(&mut hooks, PpiDefaults::default()).unwrap();
        (hooks, plugin)
    }

    fn enable(hooks: &MachineHooks) {
        let mut block = CommandBlock::with_p(MCODE_PPI_ENABLE, 1.0);
        hooks.dispatch_command(&mut block, ExecMode::Normal).unwrap();
    }

    #[test]
    fn capable_driver_publishes_support() {
        let (hooks, plugin) = host_with_plugin();
        hooks.select_spindle(SimLaserDriver::laser());
        assert!(plugin.context().supported());
    }

    #[test]
    fn laser_without_pulse_is_unsupported() {
        let (hooks, plugin) = host_with_plugin();
        hooks.select_spindle(SimLaserDriver::laser_without_pulse());
        assert!(!plugin.context().supported());
    }

    #[test]
    fn rotary_spindle_is_unsupported() {
        let (hooks, plugin) = host_with_plugin();
        hooks.select_spindle(SimLaserDriver::rotary_spindle());
        assert!(!plugin.context().supported());
    }

    #[test]
    fn proxy_marks_laser_on_and_forwards_duty() {
        let (hooks, plugin) = host_with_plugin();
        let laser = SimLaserDriver::laser();
        hooks.select_spindle(laser.clone());

        hooks.spindle.dispatch(|d| d.update_duty_cycle(512));
        assert!(plugin.context().laser_is_on());
        assert_eq!(laser.last_duty(), 512);

        hooks.spindle.dispatch(|d| d.update_duty_cycle(0));
        assert!(!plugin.context().laser_is_on());
        assert_eq!(laser.last_duty(), 0);
    }

    #[test]
    fn proxy_marks_laser_on_and_forwards_speed() {
        let (hooks, plugin) = host_with_plugin();
        let laser = SimLaserDriver::laser();
        hooks.select_spindle(laser.clone());

        hooks.spindle.dispatch(|d| d.update_speed(300.0));
        assert!(plugin.context().laser_is_on());
        assert_eq!(laser.last_speed(), 300.0);
    }

    #[test]
    fn zero_to_nonzero_power_resets_spacing() {
        let (hooks, plugin) = host_with_plugin();
        hooks.select_spindle(SimLaserDriver::laser());

        plugin.context().set_traveled(7.0);
        plugin.context().set_next_threshold(7.1);
        hooks.spindle.dispatch(|d| d.update_duty_cycle(100));
        assert_eq!(plugin.context().traveled(), 0.0);

        // Nonzero → nonzero does not reset.
        plugin.context().set_traveled(0.3);
        hooks.spindle.dispatch(|d| d.update_duty_cycle(200));
        assert_eq!(plugin.context().traveled(), 0.3);
    }

    #[test]
    fn unsupported_selection_clears_binding_and_disengages() {
        let (hooks, plugin) = host_with_plugin();
        hooks.select_spindle(SimLaserDriver::laser());
        enable(&hooks);
        assert!(plugin.engaged());

        hooks.select_spindle(SimLaserDriver::rotary_spindle());
        assert!(!plugin.engaged());
        assert!(!plugin.context().supported());
    }

    #[test]
    fn reselecting_capable_driver_reengages() {
        let (hooks, plugin) = host_with_plugin();
        hooks.select_spindle(SimLaserDriver::laser());
        enable(&hooks);

        hooks.select_spindle(SimLaserDriver::rotary_spindle());
        assert!(!plugin.engaged());

        // The enable latch survived; a capable selection re-engages.
        hooks.select_spindle(SimLaserDriver::laser());
        assert!(plugin.engaged());
    }

    #[test]
    fn rebind_while_engaged_fires_through_new_driver() {
        let (hooks, plugin) = host_with_plugin();
        let first = SimLaserDriver::laser();
        let second = SimLaserDriver::laser();
        hooks.select_spindle(first.clone());
        enable(&hooks);

        hooks.select_spindle(second.clone());
        assert!(plugin.engaged());

        hooks.spindle.dispatch(|d| d.update_duty_cycle(100));
        ppi_hal::sim::drive_block(&hooks, 10.0, 2); // 0.2 mm, pitch ≈ 0.042
        assert_eq!(first.pulse_count(), 0);
        assert!(second.pulse_count() > 0);
    }

    // ── Delegation ──

    struct CountingListener(AtomicU32);

    impl SelectionListener for CountingListener {
        fn on_spindle_selected(&self, _driver: &DriverHandle) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn selection_delegates_to_prior_listener() {
        let mut hooks = MachineHooks::new(Arc::new(SimMotion::new()));
        let prior = Arc::new(CountingListener(AtomicU32::new(0)));
        hooks.on_spindle_selected = Some(prior.clone());
        let _plugin = PpiPlugin::init(&mut hooks, PpiDefaults::default()).unwrap();

        hooks.select_spindle(SimLaserDriver::laser());
        hooks.select_spindle(SimLaserDriver::rotary_spindle());
        assert_eq!(prior.0.load(Ordering::Relaxed), 2);
    }
}
