//! Defines the app level error type and its conversion to transient alerts.

use crate::alert::Alert;

/// The errors that may occur in the application.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided input that failed local validation.
    ///
    /// This error is raised before any request is sent to the remote store,
    /// and the string is suitable for displaying directly to the user.
    #[error("{0}")]
    Validation(String),

    /// The remote store rejected the email and password combination.
    ///
    /// Holds the message from the server, if it sent one.
    #[error("invalid credentials")]
    InvalidCredentials(Option<String>),

    /// The remote store responded with a non-success status code.
    ///
    /// `message` is the `message` field of the response body, if the server
    /// supplied one.
    #[error("the server responded with status {status}")]
    Remote {
        /// The HTTP status code of the response.
        status: u16,
        /// The message supplied by the server.
        message: Option<String>,
    },

    /// The request could not be sent, timed out, or the response body could
    /// not be decoded.
    #[error("could not reach the server: {0}")]
    Transport(String),

    /// The persisted profile is not valid JSON.
    ///
    /// This error is logged and never returned to callers: restoring a session
    /// treats a corrupt profile as absent.
    #[error("the persisted profile is corrupt: {0}")]
    CorruptProfile(String),

    /// Reading from or writing to durable storage failed.
    #[error("could not access session storage: {0}")]
    Storage(String),

    /// The client configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The operation needs a logged in user with a known user ID.
    #[error("no user is logged in")]
    NotAuthenticated,
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => Error::Remote {
                status: status.as_u16(),
                message: None,
            },
            None => Error::Transport(value.to_string()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Storage(value.to_string())
    }
}

impl Error {
    /// The message the server sent along with the error, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Error::InvalidCredentials(message) | Error::Remote { message, .. } => {
                message.as_deref().filter(|message| !message.trim().is_empty())
            }
            _ => None,
        }
    }

    /// Convert the error into an error alert for the user.
    ///
    /// Validation errors are shown as is. For errors from the remote store the
    /// server's message is preferred and `fallback` is used when the server
    /// did not send one. Everything else is shown as `fallback`, with the
    /// error itself only going to the logs.
    pub fn into_alert(self, fallback: &str) -> Alert {
        match self {
            Error::Validation(message) => Alert::error(message, ""),
            Error::InvalidCredentials(_) | Error::Remote { .. } => match self.server_message() {
                Some(message) => Alert::error(message, ""),
                None => Alert::error(fallback, ""),
            },
            Error::NotAuthenticated => Alert::error(fallback, "Log in and try again."),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                Alert::error(fallback, "Check your connection and try again.")
            }
        }
    }
}
