//! Common re-exports for consumers of the host boundary.

pub use crate::command::{CommandBlock, CommandClass, CommandHandler, Values, Words};
pub use crate::events::{
    ParserListener, ParserState, PluginEntry, PluginReport, ProgramFlow, ProgramListener,
    ReportListener, SelectionListener,
};
pub use crate::host::MachineHooks;
pub use crate::slot::HookSlot;
pub use crate::spindle::{DriverCaps, DriverHandle, NullDriver, PowerDriver};
pub use crate::status::{ExecMode, Rejection};
pub use crate::stepper::{AxisMask, StepEvent, StepperHooks};
