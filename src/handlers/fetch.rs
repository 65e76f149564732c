//! FETCH and UID FETCH command handlers
//!
//! Requested items are matched by case-insensitive substring against the
//! joined, paren-stripped item list; matches are independent, except that at
//! most one literal-bearing item (header fields before whole body) is emitted
//! per message. `RFC822` is matched as a substring, so `RFC822.SIZE` also
//! selects the whole-body literal; that quirk is part of the protocol surface
//! clients of this server already depend on.
//!
//! Plain FETCH addresses messages by sequence position and accepts only `1:*`
//! or a single number; ranges remain UID-only.

use crate::error::{Error, Result};
use crate::protocol::{Reply, Response};
use crate::repository::MailRepository;
use crate::sequence::MessageSet;
use crate::types::Message;

/// Header names served when the client omits its own list.
const DEFAULT_HEADER_FIELDS: &[&str] = &[
    "FROM",
    "TO",
    "CC",
    "BCC",
    "SUBJECT",
    "DATE",
    "MESSAGE-ID",
    "PRIORITY",
    "X-PRIORITY",
    "REFERENCES",
    "NEWSGROUPS",
    "IN-REPLY-TO",
    "CONTENT-TYPE",
    "REPLY-TO",
];

const HEADER_FIELDS_ITEM: &str = "BODY.PEEK[HEADER.FIELDS";

pub async fn handle(
    repo: &dyn MailRepository,
    tag: &str,
    folder: &str,
    sequence: &str,
    items: &str,
    uid_mode: bool,
) -> Result<Reply> {
    let set = MessageSet::parse(sequence)?;

    let messages = if uid_mode {
        match set {
            MessageSet::All => repo.list_ascending(folder).await?,
            MessageSet::Range(lo, hi) => repo.get_by_id_range(folder, lo, hi).await?,
            MessageSet::Single(id) => repo.get_by_id(folder, id).await?.into_iter().collect(),
        }
    } else {
        match set {
            MessageSet::All => repo.list_ascending(folder).await?,
            MessageSet::Single(n) => repo
                .get_by_offset(folder, n - 1)
                .await?
                .into_iter()
                .collect(),
            MessageSet::Range(..) => {
                return Err(Error::ProtocolError(format!(
                    "Invalid sequence number: {}",
                    sequence
                )))
            }
        }
    };

    let untagged = messages
        .iter()
        .map(|m| render_message(m, items, uid_mode))
        .collect();

    let completed = if uid_mode {
        "UID FETCH completed"
    } else {
        "FETCH completed"
    };
    Ok(Reply::new(untagged, Response::ok(tag, completed)))
}

/// Build the untagged FETCH response for one message.
pub fn render_message(msg: &Message, items: &str, include_uid: bool) -> Response {
    // Literal lengths must match the bytes written, so normalize first.
    let raw = msg.crlf_body();
    let upper = items.to_ascii_uppercase();

    let mut attrs = Vec::new();
    if include_uid {
        attrs.push(format!("UID {}", msg.id));
    }
    if upper.contains("FLAGS") {
        attrs.push(format!("FLAGS {}", msg.flags_list()));
    }
    if upper.contains("RFC822.SIZE") {
        attrs.push(format!("RFC822.SIZE {}", raw.len()));
    }

    // Header fields take precedence over the whole body; one literal at most.
    let literal = if upper.contains(HEADER_FIELDS_ITEM) {
        let fields = requested_header_fields(&upper);
        let block = header_block(&raw, &fields);
        attrs.push(format!("BODY[HEADER] {{{}}}", block.len()));
        Some(block)
    } else if upper.contains("BODY[]") || upper.contains("RFC822") {
        attrs.push(format!("BODY[] {{{}}}", raw.len()));
        Some(format!("{}\r\n", raw))
    } else {
        None
    };

    if attrs.is_empty() {
        // Never send an empty FETCH body.
        attrs.push("FLAGS ()".to_string());
    }

    Response::Fetch {
        seq: msg.seq,
        attrs,
        literal,
    }
}

/// Header names the client asked for, in their requested order, or the
/// default set when the item carries no usable list.
fn requested_header_fields(upper: &str) -> Vec<String> {
    let defaults = || {
        DEFAULT_HEADER_FIELDS
            .iter()
            .map(|f| f.to_string())
            .collect()
    };

    let Some(start) = upper.find(HEADER_FIELDS_ITEM) else {
        return defaults();
    };
    let rest = &upper[start..];
    let Some(open) = rest.find('(') else {
        return defaults();
    };
    let Some(close) = rest[open..].find(')').map(|i| open + i) else {
        return defaults();
    };

    let fields: Vec<String> = rest[open + 1..close]
        .split(|c| c == ' ' || c == ',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();

    if fields.is_empty() {
        defaults()
    } else {
        fields
    }
}

/// Extract the requested header lines from the message text, in requested
/// order, terminated by a blank line. Only the section before the blank-line
/// boundary is scanned.
fn header_block(raw: &str, fields: &[String]) -> String {
    let header_section = raw.split("\r\n\r\n").next().unwrap_or("");
    let lines: Vec<&str> = header_section.split("\r\n").collect();

    let mut found = Vec::new();
    for name in fields {
        let prefix = format!("{}:", name);
        if let Some(line) = lines
            .iter()
            .find(|l| l.to_ascii_uppercase().starts_with(&prefix))
        {
            found.push(*line);
        }
    }

    format!("{}\r\n\r\n", found.join("\r\n"))
}
