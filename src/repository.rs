//! Message repository abstraction
//!
//! The protocol engine never touches storage directly: sessions receive an
//! `Arc<dyn MailRepository>` at construction, so tests can substitute the
//! in-memory implementation for the SQLite one. Every method is a single
//! atomic unit of work; the engine holds no lock across calls and performs
//! no multi-call transactions.

pub mod memory;
pub mod sqlite;

use crate::error::Result;
use crate::sequence::MessageSet;
use crate::types::Message;
use async_trait::async_trait;

/// Ordered, folder-scoped store of messages.
///
/// Enumeration is always ascending by id; the `seq` field of every returned
/// [`Message`] is the live 1-based rank of that message within its folder,
/// recomputed per call.
#[async_trait]
pub trait MailRepository: Send + Sync {
    /// Total number of messages in the folder.
    async fn count(&self, folder: &str) -> Result<u32>;

    /// Number of messages in the folder lacking the `\Seen` flag.
    async fn count_unseen(&self, folder: &str) -> Result<u32>;

    /// All messages in the folder, ascending by id, with seq = 1..n.
    async fn list_ascending(&self, folder: &str) -> Result<Vec<Message>>;

    /// The message at the given zero-based position in the folder's
    /// ascending-id ordering, if any.
    async fn get_by_offset(&self, folder: &str, offset: u32) -> Result<Option<Message>>;

    /// The message with the given id, if it exists in the folder.
    async fn get_by_id(&self, folder: &str, id: u32) -> Result<Option<Message>>;

    /// Messages with ids in `[lo, hi]`, ascending by id.
    async fn get_by_id_range(&self, folder: &str, lo: u32, hi: u32) -> Result<Vec<Message>>;

    /// Add a flag to every message addressed by `set` (interpreted as ids).
    /// Idempotent: messages already carrying the flag are left unchanged.
    async fn add_flag(&self, folder: &str, set: &MessageSet, flag: &str) -> Result<()>;
}
