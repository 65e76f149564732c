//! LOGIN command handler
//!
//! Any non-empty credential pair is accepted. This is a deliberate
//! simplification, not a security boundary: the server has no user store.

use crate::protocol::{Reply, Response};
use crate::session::SessionState;

pub fn handle(tag: &str, username: &str, password: &str, state: &mut SessionState) -> Reply {
    if username.is_empty() || password.is_empty() {
        return Reply::tagged(Response::no(tag, "Invalid credentials"));
    }

    *state = SessionState::Authenticated {
        username: username.to_string(),
    };
    Reply::tagged(Response::ok(tag, "LOGIN completed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_nonempty_credentials_accepted() {
        let mut state = SessionState::NotAuthenticated;
        let reply = handle("a1", "anyone", "anything", &mut state);
        assert_eq!(reply.tagged, Response::ok("a1", "LOGIN completed"));
        assert!(state.is_authenticated());
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let mut state = SessionState::NotAuthenticated;
        let reply = handle("a1", "", "pass", &mut state);
        assert_eq!(reply.tagged, Response::no("a1", "Invalid credentials"));
        assert!(!state.is_authenticated());
    }
}
