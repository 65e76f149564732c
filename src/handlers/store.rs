//! STORE and UID STORE command handlers
//!
//! Only flag addition of `\Seen` is supported; addresses are interpreted as
//! identifiers on both paths. The repository makes the mutation idempotent.
//! No per-message untagged confirmation is sent, a known simplification:
//! clients expecting `* n FETCH (FLAGS ...)` echoes will not receive them.

use crate::error::Result;
use crate::protocol::{Reply, Response};
use crate::repository::MailRepository;
use crate::sequence::MessageSet;
use crate::types::SEEN_FLAG;

pub async fn handle(
    repo: &dyn MailRepository,
    tag: &str,
    folder: &str,
    sequence: &str,
    operation: &str,
    flags: &str,
) -> Result<Reply> {
    if !operation.eq_ignore_ascii_case("+FLAGS") && !operation.eq_ignore_ascii_case("+FLAGS.SILENT")
    {
        return Ok(Reply::tagged(Response::bad(
            tag,
            "Only +FLAGS supported",
        )));
    }

    if !flags.contains(SEEN_FLAG) {
        return Ok(Reply::tagged(Response::bad(
            tag,
            "Only \\Seen flag supported",
        )));
    }

    let set = MessageSet::parse(sequence)?;
    repo.add_flag(folder, &set, SEEN_FLAG).await?;
    Ok(Reply::tagged(Response::ok(tag, "STORE completed")))
}
