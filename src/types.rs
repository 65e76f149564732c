//! Core types used throughout the IMAP server

/// Message sequence number: 1-based rank of a message within its folder's
/// ascending-id ordering. Always derived at query time, never stored.
pub type SequenceNumber = u32;

/// Message UID: repository-assigned identifier, monotonic and never reused.
pub type Uid = u32;

/// A message row as returned by the repository.
///
/// `seq` is the live rank of the message among all messages of its folder
/// ordered by ascending id; the repository recomputes it on every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Uid,
    pub seq: SequenceNumber,
    pub raw: String,
    pub flags: Vec<String>,
}

impl Message {
    /// Whether the message carries the given flag token (e.g. `\Seen`).
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    /// Render the flag set as an IMAP parenthesized list.
    pub fn flags_list(&self) -> String {
        format!("({})", self.flags.join(" "))
    }

    /// Message text with line endings normalized to CRLF.
    ///
    /// Literal lengths must match the bytes actually written, so any text
    /// stored with bare `\n` endings is converted before rendering.
    pub fn crlf_body(&self) -> String {
        normalize_crlf(&self.raw)
    }
}

/// Normalize bare `\n` line endings to `\r\n`.
pub fn normalize_crlf(raw: &str) -> String {
    if raw.contains("\r\n") {
        raw.to_string()
    } else {
        raw.replace('\n', "\r\n")
    }
}

/// A mailbox folder. The folder set is fixed; the engine never mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub name: String,
    pub delimiter: String,
    pub attributes: String,
}

impl Folder {
    pub fn new(name: &str, attributes: &str) -> Self {
        Self {
            name: name.to_string(),
            delimiter: "/".to_string(),
            attributes: attributes.to_string(),
        }
    }
}

/// The `\Seen` system flag, the only flag STORE can add.
pub const SEEN_FLAG: &str = "\\Seen";
