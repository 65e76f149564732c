//! STATUS command handler
//!
//! Reports the SELECT counters for an arbitrary folder without selecting it.
//! The requested item list is ignored; all counters are always reported.

use crate::error::Result;
use crate::protocol::{Reply, Response};
use crate::repository::MailRepository;

pub async fn handle(repo: &dyn MailRepository, tag: &str, folder: &str) -> Result<Reply> {
    let count = repo.count(folder).await?;
    let unseen = repo.count_unseen(folder).await?;

    let untagged = Response::untagged(format!(
        "STATUS \"{}\" (MESSAGES {} RECENT {} UIDNEXT {} UIDVALIDITY 1 UNSEEN {})",
        folder,
        count,
        unseen,
        count + 1,
        unseen
    ));

    Ok(Reply::new(
        vec![untagged],
        Response::ok(tag, "STATUS completed"),
    ))
}
