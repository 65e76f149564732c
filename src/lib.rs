//! Barque - a small SQLite-backed IMAP server
//!
//! Speaks a reduced IMAP4rev1 subset over plain TCP: enough for a generic
//! mail client to list folders, select one, and read its messages. The
//! message store lives behind the [`MailRepository`] trait so tests can
//! substitute an in-memory fake for the SQLite implementation.

pub mod connection;
pub mod error;
pub mod handlers;
pub mod protocol;
pub mod repository;
pub mod sequence;
pub mod server;
pub mod session;
pub mod types;

pub use connection::Connection;
pub use error::{Error, Result};
pub use protocol::{Command, Reply, Response, UidCommand};
pub use repository::memory::InMemoryRepository;
pub use repository::sqlite::SqliteRepository;
pub use repository::MailRepository;
pub use sequence::MessageSet;
pub use server::ImapServer;
pub use session::{Session, SessionState};
pub use types::{Folder, Message, SEEN_FLAG};
