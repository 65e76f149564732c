//! CAPABILITY command handler

use crate::protocol::{Reply, Response};

pub fn handle(tag: &str) -> Reply {
    Reply::new(
        vec![Response::untagged("CAPABILITY IMAP4rev1 LOGIN IDLE")],
        Response::ok(tag, "CAPABILITY completed"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability() {
        let reply = handle("a1");
        assert_eq!(
            reply.untagged,
            vec![Response::untagged("CAPABILITY IMAP4rev1 LOGIN IDLE")]
        );
        assert_eq!(reply.tagged, Response::ok("a1", "CAPABILITY completed"));
    }
}
