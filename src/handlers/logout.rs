//! LOGOUT command handler

use crate::protocol::{Reply, Response};
use crate::session::SessionState;

/// Send the farewell and mark the session terminal; the read loop ends after
/// the tagged completion is written.
pub fn handle(tag: &str, state: &mut SessionState) -> Reply {
    *state = SessionState::Logout;
    Reply::new(
        vec![Response::Bye {
            message: "Barque IMAP server logging out".to_string(),
        }],
        Response::ok(tag, "LOGOUT completed"),
    )
}
