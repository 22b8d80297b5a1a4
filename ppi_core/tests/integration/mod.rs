//! Shared fixture: a simulated host with the plugin registered.

mod engagement;
mod pulse_train;

use std::sync::Arc;

use ppi_hal::command::CommandBlock;
use ppi_hal::host::MachineHooks;
use ppi_hal::sim::{SimLaserDriver, SimMotion};
use ppi_hal::status::ExecMode;

use ppi_core::config::PpiDefaults;
use ppi_core::plugin::PpiPlugin;

pub struct Fixture {
    pub hooks: MachineHooks,
    pub plugin: Arc<PpiPlugin>,
    pub laser: Arc<SimLaserDriver>,
    pub motion: Arc<SimMotion>,
}

impl Fixture {
    /// Host with the plugin registered and a pulse-capable laser selected.
    pub fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let motion = Arc::new(SimMotion::new());
        let mut hooks = MachineHooks::new(motion.clone());
        let plugin = PpiPlugin::init(&mut hooks, PpiDefaults::default()).unwrap();
        let laser = SimLaserDriver::laser();
        hooks.select_spindle(laser.clone());
        Self {
            hooks,
            plugin,
            laser,
            motion,
        }
    }

    /// Run one machine command, expecting acceptance.
    pub fn command(&self, code: u16, p: f64) {
        let mut block = CommandBlock::with_p(code, p);
        self.hooks
            .dispatch_command(&mut block, ExecMode::Normal)
            .unwrap();
    }

    /// Commanded laser power through the planner path.
    pub fn power(&self, duty: u16) {
        self.hooks.spindle.dispatch(|d| d.update_duty_cycle(duty));
    }

    /// Idle → moving transition followed by one motion block.
    pub fn run_block(&self, steps_per_mm: f64, steps: u32) {
        self.hooks.wake_steppers();
        ppi_hal::sim::drive_block(&self.hooks, steps_per_mm, steps);
    }
}
