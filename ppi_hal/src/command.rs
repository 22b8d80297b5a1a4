//! Machine command block model and the custom command handler contract.
//!
//! Custom machine commands reach plugins through a three-stage contract:
//! `classify` decides whether a code is handled at all, `validate` checks
//! parameters ahead of execution (and may run in look-ahead), and
//! `execute` applies the command in order. Handlers form a chain: each
//! stage delegates unrecognized commands to the handler that was
//! registered before it, so independently developed plugins compose.

use bitflags::bitflags;

use crate::status::{ExecMode, Rejection};

bitflags! {
    /// Parameter words present (and not yet claimed) on a command block.
    ///
    /// Validation claims a word by removing its flag; anything still set
    /// after validation is rejected by the pipeline as unused.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Words: u8 {
        const P = 1 << 0;
        const Q = 1 << 1;
        const R = 1 << 2;
    }
}

/// Parsed numeric values for the parameter words of a block.
///
/// A value is meaningful only while the matching [`Words`] flag is (or
/// was) set; the parser zero-initializes the rest.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Values {
    pub p: f64,
    pub q: f64,
    pub r: f64,
}

/// One parsed custom machine command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandBlock {
    /// Numeric command code (e.g. 126 for `M126`).
    pub code: u16,
    /// Parameter words present and unclaimed.
    pub words: Words,
    /// Parsed parameter values.
    pub values: Values,
    /// Set during validation when the command must execute synchronously,
    /// in program order, excluded from planner look-ahead.
    pub requires_sync: bool,
}

impl CommandBlock {
    /// A block with no parameter words.
    pub fn new(code: u16) -> Self {
        Self {
            code,
            words: Words::empty(),
            values: Values::default(),
            requires_sync: false,
        }
    }

    /// A block carrying a single P word.
    pub fn with_p(code: u16, p: f64) -> Self {
        Self {
            code,
            words: Words::P,
            values: Values {
                p,
                ..Values::default()
            },
            requires_sync: false,
        }
    }
}

/// Result of classifying a command code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandClass {
    /// Handled as a normal user command (validate, then execute).
    Normal,
    /// No handler in the chain claims this code.
    Unsupported,
}

/// Three-stage handler for custom machine commands.
///
/// Implementations hold a reference to the previously registered handler
/// and delegate every stage exactly once for commands they do not
/// recognize.
pub trait CommandHandler: Send + Sync {
    /// Decide whether `code` is handled by this chain.
    fn classify(&self, code: u16) -> CommandClass;

    /// Validate parameters, claiming the words this handler consumes.
    fn validate(&self, block: &mut CommandBlock) -> Result<(), Rejection>;

    /// Apply the command. Must not mutate anything in [`ExecMode::Check`].
    fn execute(&self, mode: ExecMode, block: &CommandBlock);
}
