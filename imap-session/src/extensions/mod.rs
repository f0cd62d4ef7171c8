//! Session-level operations for the shipped protocol extensions.

pub mod acl;
pub mod uidplus;
