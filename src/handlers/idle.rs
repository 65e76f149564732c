//! IDLE command handler
//!
//! Stub: acknowledges readiness and completes immediately, without waiting
//! for the client's DONE or for new-mail events. A conformant version would
//! select between a transport read and a notification channel; this engine
//! has no event source to wire it to.

use crate::protocol::{Reply, Response};

pub fn handle(tag: &str) -> Reply {
    Reply::new(
        vec![Response::Continuation {
            message: "idling".to_string(),
        }],
        Response::ok(tag, "IDLE completed"),
    )
}
