//! IMAP protocol handling: command parsing and response rendering

use crate::error::{Error, Result};
use std::fmt;

/// IMAP command parsed from one line of client input.
///
/// Parsing happens once, up front; dispatch is an exhaustive `match` on this
/// enum rather than chained string comparisons.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Capability,
    Noop,
    Logout,
    Idle,
    Login { username: String, password: String },
    List,
    Select { folder: String },
    Examine { folder: String },
    Status { folder: String },
    Fetch { sequence: String, items: String },
    Search,
    Store { sequence: String, operation: String, flags: String },
    Uid(UidCommand),
}

/// Sub-commands of the compound `UID` verb.
#[derive(Debug, Clone, PartialEq)]
pub enum UidCommand {
    Fetch { sequence: String, items: String },
    Search,
    Store { sequence: String, operation: String, flags: String },
}

impl Command {
    /// Whether this command may only run after LOGIN.
    pub fn requires_auth(&self) -> bool {
        !matches!(
            self,
            Command::Capability | Command::Noop | Command::Logout | Command::Login { .. }
        )
    }

    /// Whether this command may only run with a folder selected.
    pub fn requires_selected_folder(&self) -> bool {
        matches!(
            self,
            Command::Fetch { .. }
                | Command::Search
                | Command::Store { .. }
                | Command::Idle
                | Command::Uid(_)
        )
    }
}

/// Strip surrounding quotes from a folder or credential argument.
fn unquote(arg: &str) -> String {
    arg.trim_matches('"').to_string()
}

/// Join residual tokens into an item list, stripping the outer parentheses.
fn join_list(parts: &[&str]) -> String {
    parts
        .join(" ")
        .trim_matches(|c| c == '(' || c == ')')
        .to_string()
}

/// Parse an IMAP command from the portion of the line after the tag.
///
/// The verb is case-insensitive. Errors carry the text rendered into the
/// tagged `BAD` response.
pub fn parse_command(line: &str) -> Result<Command> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.is_empty() {
        return Err(Error::ProtocolError("Empty command".to_string()));
    }

    let verb = parts[0].to_uppercase();
    match verb.as_str() {
        "CAPABILITY" => Ok(Command::Capability),
        "NOOP" => Ok(Command::Noop),
        "LOGOUT" => Ok(Command::Logout),
        "IDLE" => Ok(Command::Idle),
        "LIST" => Ok(Command::List),
        "SEARCH" => Ok(Command::Search),
        "LOGIN" => {
            if parts.len() < 3 {
                return Err(Error::ProtocolError(
                    "LOGIN requires username and password".to_string(),
                ));
            }
            Ok(Command::Login {
                username: unquote(parts[1]),
                password: unquote(parts[2]),
            })
        }
        "SELECT" => {
            if parts.len() < 2 {
                return Err(Error::ProtocolError(
                    "SELECT requires folder name".to_string(),
                ));
            }
            Ok(Command::Select {
                folder: unquote(parts[1]),
            })
        }
        "EXAMINE" => {
            if parts.len() < 2 {
                return Err(Error::ProtocolError(
                    "EXAMINE requires folder name".to_string(),
                ));
            }
            Ok(Command::Examine {
                folder: unquote(parts[1]),
            })
        }
        "STATUS" => {
            if parts.len() < 3 {
                return Err(Error::ProtocolError(
                    "STATUS requires folder and items".to_string(),
                ));
            }
            Ok(Command::Status {
                folder: unquote(parts[1]),
            })
        }
        "FETCH" => {
            if parts.len() < 3 {
                return Err(Error::ProtocolError(
                    "FETCH requires sequence and items".to_string(),
                ));
            }
            Ok(Command::Fetch {
                sequence: parts[1].to_string(),
                items: join_list(&parts[2..]),
            })
        }
        "STORE" => {
            if parts.len() < 4 {
                return Err(Error::ProtocolError(
                    "STORE requires sequence, operation, and flags".to_string(),
                ));
            }
            Ok(Command::Store {
                sequence: parts[1].to_string(),
                operation: parts[2].to_string(),
                flags: join_list(&parts[3..]),
            })
        }
        "UID" => parse_uid_command(&parts),
        _ => Err(Error::ProtocolError(format!("Unknown command: {}", verb))),
    }
}

fn parse_uid_command(parts: &[&str]) -> Result<Command> {
    if parts.len() < 2 {
        return Err(Error::ProtocolError("Unknown command: UID".to_string()));
    }

    let sub_verb = parts[1].to_uppercase();
    match sub_verb.as_str() {
        "FETCH" => {
            if parts.len() < 4 {
                return Err(Error::ProtocolError(
                    "UID FETCH requires sequence and items".to_string(),
                ));
            }
            Ok(Command::Uid(UidCommand::Fetch {
                sequence: parts[2].to_string(),
                items: join_list(&parts[3..]),
            }))
        }
        "SEARCH" => Ok(Command::Uid(UidCommand::Search)),
        "STORE" => {
            if parts.len() < 5 {
                return Err(Error::ProtocolError(
                    "UID STORE requires sequence, operation, and flags".to_string(),
                ));
            }
            Ok(Command::Uid(UidCommand::Store {
                sequence: parts[2].to_string(),
                operation: parts[3].to_string(),
                flags: join_list(&parts[4..]),
            }))
        }
        _ => Err(Error::ProtocolError(format!(
            "Unknown UID subcommand: {}",
            sub_verb
        ))),
    }
}

/// IMAP response to send to a client.
///
/// `Fetch` carries an optional literal segment: the final attribute holds the
/// `{n}` byte-count marker and `literal` the bytes that follow it on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Ok { tag: Option<String>, message: String },
    No { tag: Option<String>, message: String },
    Bad { tag: Option<String>, message: String },
    Bye { message: String },
    Untagged { message: String },
    Continuation { message: String },
    Fetch { seq: u32, attrs: Vec<String>, literal: Option<String> },
}

impl Response {
    pub fn ok(tag: &str, message: impl Into<String>) -> Self {
        Response::Ok {
            tag: Some(tag.to_string()),
            message: message.into(),
        }
    }

    pub fn no(tag: &str, message: impl Into<String>) -> Self {
        Response::No {
            tag: Some(tag.to_string()),
            message: message.into(),
        }
    }

    pub fn bad(tag: &str, message: impl Into<String>) -> Self {
        Response::Bad {
            tag: Some(tag.to_string()),
            message: message.into(),
        }
    }

    pub fn untagged(message: impl Into<String>) -> Self {
        Response::Untagged {
            message: message.into(),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Ok { tag: Some(tag), message } => write!(f, "{} OK {}\r\n", tag, message),
            Response::Ok { tag: None, message } => write!(f, "* OK {}\r\n", message),
            Response::No { tag: Some(tag), message } => write!(f, "{} NO {}\r\n", tag, message),
            Response::No { tag: None, message } => write!(f, "* NO {}\r\n", message),
            Response::Bad { tag: Some(tag), message } => write!(f, "{} BAD {}\r\n", tag, message),
            Response::Bad { tag: None, message } => write!(f, "* BAD {}\r\n", message),
            Response::Bye { message } => write!(f, "* BYE {}\r\n", message),
            Response::Untagged { message } => write!(f, "* {}\r\n", message),
            Response::Continuation { message } => write!(f, "+ {}\r\n", message),
            Response::Fetch { seq, attrs, literal: None } => {
                write!(f, "* {} FETCH ({})\r\n", seq, attrs.join(" "))
            }
            Response::Fetch { seq, attrs, literal: Some(literal) } => {
                // The last attribute carries the {n} marker; the literal bytes
                // follow the line break and the closing paren ends the response.
                write!(f, "* {} FETCH ({}\r\n{})\r\n", seq, attrs.join(" "), literal)
            }
        }
    }
}

/// Everything produced by one command: zero or more untagged responses
/// followed by the tagged completion, written in order.
#[derive(Debug, Clone)]
pub struct Reply {
    pub untagged: Vec<Response>,
    pub tagged: Response,
}

impl Reply {
    pub fn new(untagged: Vec<Response>, tagged: Response) -> Self {
        Self { untagged, tagged }
    }

    pub fn tagged(tagged: Response) -> Self {
        Self {
            untagged: Vec::new(),
            tagged,
        }
    }
}
