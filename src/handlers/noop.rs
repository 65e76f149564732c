//! NOOP command handler

use crate::protocol::{Reply, Response};

pub fn handle(tag: &str) -> Reply {
    Reply::tagged(Response::ok(tag, "NOOP completed"))
}
