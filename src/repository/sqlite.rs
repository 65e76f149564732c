//! SQLite-backed message repository
//!
//! Owns schema creation and folder seeding. Connections are opened per call
//! inside `spawn_blocking` so repository work never blocks the runtime;
//! SQLite serializes concurrent writers itself.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::repository::MailRepository;
use crate::sequence::MessageSet;
use crate::types::Message;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS mails (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        subject TEXT,
        sender TEXT,
        recipient TEXT,
        date_sent TEXT,
        raw_message TEXT,
        flags TEXT DEFAULT '',
        folder TEXT DEFAULT 'INBOX'
    );

    CREATE TABLE IF NOT EXISTS folders (
        name TEXT PRIMARY KEY,
        delimiter TEXT DEFAULT '/',
        attributes TEXT DEFAULT ''
    );

    INSERT OR IGNORE INTO folders (name, attributes) VALUES ('INBOX', '');
    INSERT OR IGNORE INTO folders (name, attributes) VALUES ('Sent', '');
    INSERT OR IGNORE INTO folders (name, attributes) VALUES ('Drafts', '\\Drafts');
    INSERT OR IGNORE INTO folders (name, attributes) VALUES ('Trash', '\\Trash');
";

/// SQLite-backed mail repository.
pub struct SqliteRepository {
    db_path: Arc<PathBuf>,
}

impl SqliteRepository {
    /// Open (or create) the database at `db_path` and ensure the schema and
    /// the fixed folder set exist.
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        let db_path_clone = db_path.clone();

        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path_clone)?;
            conn.execute_batch(SCHEMA)?;
            Ok::<(), Error>(())
        })
        .await??;

        Ok(Self {
            db_path: Arc::new(db_path),
        })
    }

    /// Insert a message, returning its assigned id.
    ///
    /// Used by seeding and test fixtures; the protocol engine itself never
    /// appends messages.
    pub async fn append(
        &self,
        folder: &str,
        subject: &str,
        sender: &str,
        recipient: &str,
        raw_message: &str,
    ) -> Result<u32> {
        let folder = folder.to_string();
        let subject = subject.to_string();
        let sender = sender.to_string();
        let recipient = recipient.to_string();
        let raw_message = raw_message.to_string();
        let db_path = Arc::clone(&self.db_path);

        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&*db_path)?;
            conn.execute(
                "INSERT INTO mails (subject, sender, recipient, date_sent, raw_message, folder)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    subject,
                    sender,
                    recipient,
                    Utc::now().to_rfc2822(),
                    raw_message,
                    folder
                ],
            )?;
            Ok(conn.last_insert_rowid() as u32)
        })
        .await?
    }

    /// Seed two sample messages into INBOX when the mails table is empty,
    /// so a freshly created database has something a client can fetch.
    pub async fn seed_sample_messages(&self) -> Result<()> {
        let total: u32 = {
            let db_path = Arc::clone(&self.db_path);
            tokio::task::spawn_blocking(move || {
                let conn = Connection::open(&*db_path)?;
                let n = conn.query_row("SELECT COUNT(*) FROM mails", [], |row| row.get(0))?;
                Ok::<u32, Error>(n)
            })
            .await??
        };

        if total > 0 {
            return Ok(());
        }

        let now = Utc::now().to_rfc2822();
        let samples = [
            (
                "Welcome to Barque",
                "admin@example.com",
                "user@example.com",
                format!(
                    "From: admin@example.com\r\nTo: user@example.com\r\nSubject: Welcome to Barque\r\nDate: {}\r\n\r\nWelcome to your IMAP server!\r\n\r\nThis is a test message.\r\n",
                    now
                ),
            ),
            (
                "Test Message 2",
                "test@example.com",
                "user@example.com",
                format!(
                    "From: test@example.com\r\nTo: user@example.com\r\nSubject: Test Message 2\r\nDate: {}\r\n\r\nThis is another test message with some content.\r\n\r\nBest regards,\r\nTest User\r\n",
                    now
                ),
            ),
        ];

        for (subject, sender, recipient, raw) in samples {
            self.append("INBOX", subject, sender, recipient, &raw).await?;
        }

        log::info!("Seeded sample messages into INBOX");
        Ok(())
    }
}

fn row_to_message(id: u32, seq: u32, raw: String, flags: String) -> Message {
    Message {
        id,
        seq,
        raw,
        flags: flags.split_whitespace().map(|f| f.to_string()).collect(),
    }
}

// Live rank of a row among its folder's messages, ascending by id.
const RANK: &str = "(SELECT COUNT(*) FROM mails m2 WHERE m2.folder = m1.folder AND m2.id <= m1.id)";

#[async_trait]
impl MailRepository for SqliteRepository {
    async fn count(&self, folder: &str) -> Result<u32> {
        let folder = folder.to_string();
        let db_path = Arc::clone(&self.db_path);

        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&*db_path)?;
            let n = conn.query_row(
                "SELECT COUNT(*) FROM mails WHERE folder = ?1",
                params![folder],
                |row| row.get(0),
            )?;
            Ok(n)
        })
        .await?
    }

    async fn count_unseen(&self, folder: &str) -> Result<u32> {
        let folder = folder.to_string();
        let db_path = Arc::clone(&self.db_path);

        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&*db_path)?;
            let n = conn.query_row(
                "SELECT COUNT(*) FROM mails WHERE folder = ?1 AND instr(flags, '\\Seen') = 0",
                params![folder],
                |row| row.get(0),
            )?;
            Ok(n)
        })
        .await?
    }

    async fn list_ascending(&self, folder: &str) -> Result<Vec<Message>> {
        let folder = folder.to_string();
        let db_path = Arc::clone(&self.db_path);

        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&*db_path)?;
            let mut stmt = conn.prepare(
                "SELECT id, raw_message, flags FROM mails WHERE folder = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt
                .query_map(params![folder], |row| {
                    Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows
                .into_iter()
                .enumerate()
                .map(|(i, (id, raw, flags))| row_to_message(id, i as u32 + 1, raw, flags))
                .collect())
        })
        .await?
    }

    async fn get_by_offset(&self, folder: &str, offset: u32) -> Result<Option<Message>> {
        let folder = folder.to_string();
        let db_path = Arc::clone(&self.db_path);

        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&*db_path)?;
            let mut stmt = conn.prepare(
                "SELECT id, raw_message, flags FROM mails WHERE folder = ?1
                 ORDER BY id ASC LIMIT 1 OFFSET ?2",
            )?;
            let mut rows = stmt.query(params![folder, offset])?;

            if let Some(row) = rows.next()? {
                Ok(Some(row_to_message(
                    row.get(0)?,
                    offset + 1,
                    row.get(1)?,
                    row.get(2)?,
                )))
            } else {
                Ok(None)
            }
        })
        .await?
    }

    async fn get_by_id(&self, folder: &str, id: u32) -> Result<Option<Message>> {
        let folder = folder.to_string();
        let db_path = Arc::clone(&self.db_path);

        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&*db_path)?;
            let sql = format!(
                "SELECT id, raw_message, flags, {RANK} AS seq FROM mails m1
                 WHERE folder = ?1 AND id = ?2"
            );
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params![folder, id])?;

            if let Some(row) = rows.next()? {
                Ok(Some(row_to_message(
                    row.get(0)?,
                    row.get(3)?,
                    row.get(1)?,
                    row.get(2)?,
                )))
            } else {
                Ok(None)
            }
        })
        .await?
    }

    async fn get_by_id_range(&self, folder: &str, lo: u32, hi: u32) -> Result<Vec<Message>> {
        let folder = folder.to_string();
        let db_path = Arc::clone(&self.db_path);

        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&*db_path)?;
            let sql = format!(
                "SELECT id, raw_message, flags, {RANK} AS seq FROM mails m1
                 WHERE folder = ?1 AND id >= ?2 AND id <= ?3 ORDER BY id ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params![folder, lo, hi], |row| {
                    Ok(row_to_message(
                        row.get(0)?,
                        row.get(3)?,
                        row.get(1)?,
                        row.get(2)?,
                    ))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await?
    }

    async fn add_flag(&self, folder: &str, set: &MessageSet, flag: &str) -> Result<()> {
        let folder = folder.to_string();
        let flag = flag.to_string();
        let set = *set;
        let db_path = Arc::clone(&self.db_path);

        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&*db_path)?;
            // Containment check keeps the update idempotent: a message already
            // carrying the flag is left byte-for-byte unchanged.
            let update = "UPDATE mails SET flags = CASE
                    WHEN instr(flags, ?2) > 0 THEN flags
                    WHEN flags = '' THEN ?2
                    ELSE flags || ' ' || ?2
                END WHERE folder = ?1";

            match set {
                MessageSet::All => {
                    conn.execute(update, params![folder, flag])?;
                }
                MessageSet::Range(lo, hi) => {
                    let sql = format!("{update} AND id >= ?3 AND id <= ?4");
                    conn.execute(&sql, params![folder, flag, lo, hi])?;
                }
                MessageSet::Single(id) => {
                    let sql = format!("{update} AND id = ?3");
                    conn.execute(&sql, params![folder, flag, id])?;
                }
            }
            Ok(())
        })
        .await?
    }
}
