//! SEARCH and UID SEARCH command handlers
//!
//! No criteria grammar: SEARCH returns every sequence number in the selected
//! folder, UID SEARCH every identifier. A deliberate reduction of IMAP SEARCH.

use crate::error::Result;
use crate::protocol::{Reply, Response};
use crate::repository::MailRepository;

pub async fn handle(
    repo: &dyn MailRepository,
    tag: &str,
    folder: &str,
    uid_mode: bool,
) -> Result<Reply> {
    let messages = repo.list_ascending(folder).await?;

    let numbers: Vec<String> = messages
        .iter()
        .map(|m| if uid_mode { m.id } else { m.seq }.to_string())
        .collect();

    let line = if numbers.is_empty() {
        "SEARCH".to_string()
    } else {
        format!("SEARCH {}", numbers.join(" "))
    };

    let completed = if uid_mode {
        "UID SEARCH completed"
    } else {
        "SEARCH completed"
    };

    Ok(Reply::new(
        vec![Response::untagged(line)],
        Response::ok(tag, completed),
    ))
}
