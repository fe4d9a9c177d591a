pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Command error
    #[error(transparent)]
    CommandError(#[from] crate::commands::Error),
    /// Driver error
    #[error(transparent)]
    DriverError(#[from] dbsh_driver::Error),
    /// Format error
    #[error(transparent)]
    FormatError(#[from] dbsh_formatters::Error),
    /// Error when an invalid command is given
    #[error("Invalid command {command_name}")]
    InvalidCommand { command_name: String },
    /// IO error
    #[error(transparent)]
    IoError(anyhow::Error),
}

/// Converts a [`indicatif::style::TemplateError`] into an [`IoError`](Error::IoError)
impl From<indicatif::style::TemplateError> for Error {
    fn from(error: indicatif::style::TemplateError) -> Self {
        Error::IoError(error.into())
    }
}

/// Converts a [`std::io::Error`] into an [`IoError`](Error::IoError)
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::IoError(error.into())
    }
}
