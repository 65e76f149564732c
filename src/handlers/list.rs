//! LIST command handler
//!
//! The folder set is fixed; reference and pattern arguments are ignored.

use crate::protocol::{Reply, Response};
use crate::types::Folder;

/// The folders every session sees.
pub fn folder_set() -> Vec<Folder> {
    vec![
        Folder::new("INBOX", ""),
        Folder::new("Sent", ""),
        Folder::new("Drafts", "\\Drafts"),
        Folder::new("Trash", "\\Trash"),
    ]
}

pub fn handle(tag: &str) -> Reply {
    let untagged = folder_set()
        .into_iter()
        .map(|folder| {
            let attrs = if folder.attributes.is_empty() {
                "\\Unmarked".to_string()
            } else {
                folder.attributes
            };
            Response::untagged(format!(
                "LIST ({}) \"{}\" \"{}\"",
                attrs, folder.delimiter, folder.name
            ))
        })
        .collect();

    Reply::new(untagged, Response::ok(tag, "LIST completed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_fixed_folders() {
        let reply = handle("a1");
        assert_eq!(reply.untagged.len(), 4);
        assert_eq!(
            reply.untagged[0],
            Response::untagged("LIST (\\Unmarked) \"/\" \"INBOX\"")
        );
        assert_eq!(
            reply.untagged[2],
            Response::untagged("LIST (\\Drafts) \"/\" \"Drafts\"")
        );
        assert_eq!(reply.tagged, Response::ok("a1", "LIST completed"));
    }
}
