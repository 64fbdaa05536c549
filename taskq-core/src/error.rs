//! Command-level error type.

use thiserror::Error;

/// A recoverable, request-scoped failure.
///
/// The `Display` string is exactly what goes back to the client as an Error
/// value; the connection stays open afterwards.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unrecognized request type.")]
    UnrecognizedRequest,

    #[error("First parameter must be command name.")]
    MissingCommandName,

    #[error("Unrecognized command: {0}")]
    UnrecognizedCommand(String),

    #[error("wrong number of arguments for '{0}'")]
    WrongArity(&'static str),

    #[error("argument {index} of '{command}' must be a string")]
    InvalidArgument {
        command: &'static str,
        index: usize,
    },

    #[error("Timestamp must be formatted Y-m-d H:M:S")]
    InvalidTimestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_messages() {
        // These strings are part of the protocol contract.
        assert_eq!(
            CommandError::UnrecognizedCommand("FOO".to_string()).to_string(),
            "Unrecognized command: FOO"
        );
        assert_eq!(
            CommandError::MissingCommandName.to_string(),
            "First parameter must be command name."
        );
        assert_eq!(
            CommandError::InvalidTimestamp.to_string(),
            "Timestamp must be formatted Y-m-d H:M:S"
        );
        assert_eq!(
            CommandError::UnrecognizedRequest.to_string(),
            "Unrecognized request type."
        );
    }
}
