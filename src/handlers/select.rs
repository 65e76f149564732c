//! SELECT and EXAMINE command handlers
//!
//! Both report the folder's counters and fixed flag vocabulary; EXAMINE
//! differs only in the read-only completion code. Any folder name is
//! selectable; an unknown one simply reports zero messages.

use crate::error::Result;
use crate::protocol::{Reply, Response};
use crate::repository::MailRepository;
use crate::session::SessionState;

const FLAGS: &str = "(\\Answered \\Flagged \\Deleted \\Seen \\Draft)";
const PERMANENT_FLAGS: &str = "(\\Answered \\Flagged \\Deleted \\Seen \\Draft \\*)";

pub async fn handle(
    repo: &dyn MailRepository,
    tag: &str,
    folder: &str,
    readonly: bool,
    state: &mut SessionState,
) -> Result<Reply> {
    let count = repo.count(folder).await?;
    let unseen = repo.count_unseen(folder).await?;

    let username = match state {
        SessionState::Authenticated { username } | SessionState::Selected { username, .. } => {
            username.clone()
        }
        // Gating guarantees an authenticated state here.
        _ => return Ok(Reply::tagged(Response::no(tag, "Please authenticate first"))),
    };
    *state = SessionState::Selected {
        username,
        folder: folder.to_string(),
    };

    let untagged = vec![
        Response::untagged(format!("{} EXISTS", count)),
        Response::untagged(format!("{} RECENT", unseen)),
        Response::untagged("OK [UIDVALIDITY 1] UID validity status"),
        Response::untagged(format!("OK [UIDNEXT {}] Predicted next UID", count + 1)),
        Response::untagged(format!("FLAGS {}", FLAGS)),
        Response::untagged(format!(
            "OK [PERMANENTFLAGS {}] Flags permitted",
            PERMANENT_FLAGS
        )),
    ];

    let tagged = if readonly {
        Response::ok(tag, "[READ-ONLY] EXAMINE completed")
    } else {
        Response::ok(tag, "[READ-WRITE] SELECT completed")
    };

    Ok(Reply::new(untagged, tagged))
}
