use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Outcomes that stop configuration resolution before a run can start.
#[derive(Debug, Error)]
pub(crate) enum ResolveError {
    /// Bad flag or value, or an explicit `--help`/`--version` request.
    #[error(transparent)]
    Args(#[from] clap::Error),
    #[error("No URL provided")]
    MissingUrl { usage: String },
    #[error("failed writing settings template to {}: {source}", .path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    #[error("settings file not found")]
    NotFound,
    #[error(transparent)]
    Io(io::Error),
    #[error(transparent)]
    Parse(ini::ParseError),
}

impl From<io::Error> for SettingsError {
    fn from(value: io::Error) -> Self {
        match value.kind() {
            io::ErrorKind::NotFound => SettingsError::NotFound,
            _ => SettingsError::Io(value),
        }
    }
}

impl From<ini::ParseError> for SettingsError {
    fn from(value: ini::ParseError) -> Self {
        SettingsError::Parse(value)
    }
}
