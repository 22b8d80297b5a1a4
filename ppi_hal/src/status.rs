//! Command statuses shared across the host command pipeline.

use thiserror::Error;

/// Synchronous rejection of a machine command at validation time.
///
/// Surfacing the rejection to the operator is the host pipeline's job;
/// handlers only classify the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// A required parameter word is absent.
    #[error("value word missing")]
    ValueWordMissing,

    /// The command is not supported by the current driver/configuration.
    #[error("unsupported command")]
    UnsupportedCommand,

    /// A parameter value is malformed or outside the representable range.
    #[error("value word out of range")]
    ValueOutOfRange,

    /// Parameter words remained unclaimed after validation.
    #[error("unused value words")]
    UnusedWords,
}

/// Execution mode for command execution.
///
/// In [`ExecMode::Check`] the program is being dry-run for validation:
/// commands have already been validated but must not mutate anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Normal execution.
    Normal,
    /// Simulation (check) mode.
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_messages() {
        assert_eq!(Rejection::ValueWordMissing.to_string(), "value word missing");
        assert_eq!(
            Rejection::UnsupportedCommand.to_string(),
            "unsupported command"
        );
        assert_eq!(
            Rejection::ValueOutOfRange.to_string(),
            "value word out of range"
        );
    }

    #[test]
    fn exec_mode_equality() {
        assert_ne!(ExecMode::Normal, ExecMode::Check);
    }
}
