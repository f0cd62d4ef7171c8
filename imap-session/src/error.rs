use std::io;

use imap_model::builders::EncodeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by a session. Missing optional extension data is
/// never an error; those cases surface as `None` return values.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error on the underlying transport.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The server closed the connection without a tagged completion.
    #[error("connection closed unexpectedly")]
    ConnectionLost,
    /// The server greeted with BYE and never accepted the connection.
    #[error("server refused the connection")]
    ConnectionRefused,
    /// The command is not valid in the current protocol state; nothing
    /// was sent on the wire.
    #[error("{command} is not valid in the current session state")]
    BadState { command: &'static str },
    /// The byte stream did not match the response grammar. The
    /// connection position is indeterminate after this; callers should
    /// drop the connection.
    #[error("unable to parse server response")]
    Parse(Vec<u8>),
    /// The tagged completion did not carry the tag of the outstanding
    /// command.
    #[error("response tag does not match the command tag")]
    TagMismatch,
    /// The server answered the command with NO.
    #[error("{command} failed: {}", .information.as_deref().unwrap_or("no explanation given"))]
    No {
        command: &'static str,
        information: Option<String>,
    },
    /// The server answered the command with BAD.
    #[error("{command} was rejected: {}", .information.as_deref().unwrap_or("no explanation given"))]
    Bad {
        command: &'static str,
        information: Option<String>,
    },
    /// A command argument cannot be represented on the wire.
    #[error("invalid command argument: {0}")]
    Validate(#[from] EncodeError),
}
