use std::error::Error;
use std::fmt;

/// Errors surfaced through the host's user-error channel.
///
/// The `Display` text is what the host shows the user, so every variant
/// carries a readable message rather than a bare source error.
#[derive(Debug)]
pub enum TempestError {
    UnknownCommand(String),
    MissingParameter(String),
    BadRequest(String),
    Resource(String),
    Database(String),
    Io(std::io::Error),
    Serde(serde_json::Error),
    Http(reqwest::Error),
}

impl Error for TempestError {}

impl fmt::Display for TempestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TempestError::UnknownCommand(command) => {
                write!(f, "unknown tm command: {command}")
            }
            TempestError::MissingParameter(name) => {
                write!(f, "missing required parameter '{name}'")
            }
            TempestError::BadRequest(msg) => write!(f, "{msg}"),
            TempestError::Resource(msg) => write!(f, "{msg}"),
            TempestError::Database(msg) => write!(f, "{msg}"),
            TempestError::Io(e) => write!(f, "I/O error: {e}"),
            TempestError::Serde(e) => write!(f, "JSON error: {e}"),
            TempestError::Http(e) => write!(f, "HTTP error: {e}"),
        }
    }
}

impl From<std::io::Error> for TempestError {
    fn from(err: std::io::Error) -> Self {
        TempestError::Io(err)
    }
}

impl From<serde_json::Error> for TempestError {
    fn from(err: serde_json::Error) -> Self {
        TempestError::Serde(err)
    }
}

impl From<reqwest::Error> for TempestError {
    fn from(err: reqwest::Error) -> Self {
        TempestError::Http(err)
    }
}
