//! In-memory message repository for tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::Result;
use crate::repository::MailRepository;
use crate::sequence::MessageSet;
use crate::types::Message;

#[derive(Debug, Clone)]
struct StoredMail {
    id: u32,
    raw: String,
    flags: Vec<String>,
}

/// In-memory mail repository, a drop-in substitute for the SQLite one.
pub struct InMemoryRepository {
    folders: Mutex<HashMap<String, Vec<StoredMail>>>,
    next_id: Mutex<u32>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            folders: Mutex::new(HashMap::new()),
            next_id: Mutex::new(1),
        }
    }

    /// Insert a message, returning its assigned id. Ids are monotonic across
    /// all folders and never reused.
    pub fn append(&self, folder: &str, raw: &str) -> u32 {
        let mut next_id = self.next_id.lock().unwrap();
        let id = *next_id;
        *next_id += 1;

        let mut folders = self.folders.lock().unwrap();
        folders.entry(folder.to_string()).or_default().push(StoredMail {
            id,
            raw: raw.to_string(),
            flags: Vec::new(),
        });
        id
    }

    /// Snapshot of a folder, ascending by id, with derived sequence numbers.
    fn snapshot(&self, folder: &str) -> Vec<Message> {
        let folders = self.folders.lock().unwrap();
        let mut mails: Vec<StoredMail> = folders.get(folder).cloned().unwrap_or_default();
        mails.sort_by_key(|m| m.id);

        mails
            .into_iter()
            .enumerate()
            .map(|(i, m)| Message {
                id: m.id,
                seq: i as u32 + 1,
                raw: m.raw,
                flags: m.flags,
            })
            .collect()
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailRepository for InMemoryRepository {
    async fn count(&self, folder: &str) -> Result<u32> {
        Ok(self.snapshot(folder).len() as u32)
    }

    async fn count_unseen(&self, folder: &str) -> Result<u32> {
        Ok(self
            .snapshot(folder)
            .iter()
            .filter(|m| !m.has_flag(crate::types::SEEN_FLAG))
            .count() as u32)
    }

    async fn list_ascending(&self, folder: &str) -> Result<Vec<Message>> {
        Ok(self.snapshot(folder))
    }

    async fn get_by_offset(&self, folder: &str, offset: u32) -> Result<Option<Message>> {
        Ok(self.snapshot(folder).into_iter().nth(offset as usize))
    }

    async fn get_by_id(&self, folder: &str, id: u32) -> Result<Option<Message>> {
        Ok(self.snapshot(folder).into_iter().find(|m| m.id == id))
    }

    async fn get_by_id_range(&self, folder: &str, lo: u32, hi: u32) -> Result<Vec<Message>> {
        Ok(self
            .snapshot(folder)
            .into_iter()
            .filter(|m| m.id >= lo && m.id <= hi)
            .collect())
    }

    async fn add_flag(&self, folder: &str, set: &MessageSet, flag: &str) -> Result<()> {
        let mut folders = self.folders.lock().unwrap();
        let Some(mails) = folders.get_mut(folder) else {
            return Ok(());
        };

        for mail in mails.iter_mut() {
            let addressed = match *set {
                MessageSet::All => true,
                MessageSet::Range(lo, hi) => mail.id >= lo && mail.id <= hi,
                MessageSet::Single(id) => mail.id == id,
            };
            if addressed && !mail.flags.iter().any(|f| f == flag) {
                mail.flags.push(flag.to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SEEN_FLAG;

    #[tokio::test]
    async fn test_sequence_numbers_follow_id_order() {
        let repo = InMemoryRepository::new();
        repo.append("INBOX", "first");
        repo.append("Sent", "other folder");
        repo.append("INBOX", "second");

        let messages = repo.list_ascending("INBOX").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].seq, 1);
        assert_eq!(messages[1].seq, 2);
        assert!(messages[0].id < messages[1].id);
    }

    #[tokio::test]
    async fn test_add_flag_idempotent() {
        let repo = InMemoryRepository::new();
        let id = repo.append("INBOX", "msg");

        repo.add_flag("INBOX", &MessageSet::Single(id), SEEN_FLAG)
            .await
            .unwrap();
        repo.add_flag("INBOX", &MessageSet::Single(id), SEEN_FLAG)
            .await
            .unwrap();

        let msg = repo.get_by_id("INBOX", id).await.unwrap().unwrap();
        assert_eq!(msg.flags, vec![SEEN_FLAG.to_string()]);
    }
}
