use crate::commands::{LoopCondition, ShellCommand};

pub type Result<T = LoopCondition, E = Error> = core::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Driver error
    #[error(transparent)]
    DriverError(#[from] dbsh_driver::Error),
    /// Formatter error
    #[error(transparent)]
    FormatterError(#[from] dbsh_formatters::Error),
    /// Error when an invalid option is provided for a command
    #[error("Invalid {command_name} option: {option}")]
    InvalidOption {
        command_name: String,
        option: String,
    },
    /// IO error
    #[error(transparent)]
    IoError(anyhow::Error),
    /// Error when a command is missing required arguments
    #[error("{command_name} is missing a required argument: {arguments}")]
    MissingArguments {
        command_name: String,
        arguments: String,
    },
}

impl Error {
    /// The [`MissingArguments`](Error::MissingArguments) error for a command and its usage
    pub(crate) fn missing_arguments<C: ShellCommand + ?Sized>(command: &C) -> Self {
        Error::MissingArguments {
            command_name: command.name().to_string(),
            arguments: command.args().to_string(),
        }
    }
}

/// Converts a [`clearscreen::Error`] into an [`IoError`](Error::IoError)
impl From<clearscreen::Error> for Error {
    fn from(error: clearscreen::Error) -> Self {
        Error::IoError(error.into())
    }
}

/// Converts a [`std::num::ParseIntError`] into an [`IoError`](Error::IoError)
impl From<std::num::ParseIntError> for Error {
    fn from(error: std::num::ParseIntError) -> Self {
        Error::IoError(error.into())
    }
}

/// Converts a [`std::io::Error`] into an [`IoError`](Error::IoError)
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::IoError(error.into())
    }
}
