//! Per-verb IMAP command handlers
//!
//! Handlers are pure with respect to the transport: each consumes parsed
//! arguments plus the repository and produces a [`crate::protocol::Reply`];
//! the session writes it. State gating happens in the session before any
//! handler runs.

pub mod capability;
pub mod fetch;
pub mod idle;
pub mod list;
pub mod login;
pub mod logout;
pub mod noop;
pub mod search;
pub mod select;
pub mod status;
pub mod store;
