//! Synchronous IMAP4rev1 session layer on top of [`imap_model`].
//!
//! A [`Session`] wraps a caller-supplied `Read + Write` transport,
//! drives the protocol state machine, and accumulates the last
//! command's connection, selection and response information. The
//! UIDPLUS and ACL convenience operations live in [`extensions`].

pub mod error;
pub mod extensions;
mod info;
mod session;

#[cfg(test)]
mod mock_stream;

pub use crate::error::{Error, Result};
pub use crate::info::{Access, ConnectionInfo, FetchedMessage, ResponseInfo, SelectionInfo};
pub use crate::session::Session;
