//! Per-connection session: state machine, read loop, and dispatch
//!
//! Each accepted connection gets one task running one `Session`. The session
//! owns its state exclusively; sessions share nothing but the repository.

use std::sync::Arc;
use std::time::Duration;

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::handlers;
use crate::protocol::{parse_command, Command, Reply, Response, UidCommand};
use crate::repository::MailRepository;

/// How long a session may sit with no client input before being dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Session state, gating which commands are legal.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    NotAuthenticated,
    Authenticated { username: String },
    Selected { username: String, folder: String },
    Logout,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(
            self,
            SessionState::Authenticated { .. } | SessionState::Selected { .. }
        )
    }

    pub fn selected_folder(&self) -> Option<&str> {
        match self {
            SessionState::Selected { folder, .. } => Some(folder),
            _ => None,
        }
    }
}

/// One client session over one connection.
pub struct Session {
    repository: Arc<dyn MailRepository>,
    state: SessionState,
    idle_timeout: Duration,
}

impl Session {
    pub fn new(repository: Arc<dyn MailRepository>, idle_timeout: Duration) -> Self {
        Self {
            repository,
            state: SessionState::NotAuthenticated,
            idle_timeout,
        }
    }

    /// Run the read -> parse -> gate -> dispatch -> write loop until LOGOUT,
    /// idle timeout, or transport failure.
    pub async fn handle(mut self, connection: Connection) -> Result<()> {
        let peer_addr = connection.peer_addr();

        let greeting = Response::Ok {
            tag: None,
            message: "[CAPABILITY IMAP4rev1 UIDPLUS IDLE] Barque IMAP server ready".to_string(),
        };
        connection.write_response(&greeting).await?;

        let mut buf = String::new();
        loop {
            buf.clear();
            let read = tokio::time::timeout(self.idle_timeout, connection.read_line(&mut buf)).await;
            let bytes = match read {
                Ok(Ok(n)) => n,
                Ok(Err(e)) => {
                    log::debug!("Read error from {}: {}", peer_addr, e);
                    return Ok(());
                }
                Err(_) => {
                    log::info!("Dropping idle session from {}", peer_addr);
                    return Ok(());
                }
            };
            if bytes == 0 {
                return Ok(());
            }

            let line = buf.trim();
            if line.is_empty() {
                continue;
            }
            log::debug!("Client: {}", line);

            // Token 0 is the client's opaque tag, the rest is the command.
            let Some((tag, rest)) = line.split_once(char::is_whitespace) else {
                let response = Response::Bad {
                    tag: None,
                    message: "Invalid command format".to_string(),
                };
                connection.write_response(&response).await?;
                continue;
            };

            let reply = match parse_command(rest) {
                Ok(command) => self.execute(tag, command).await,
                Err(Error::ProtocolError(message)) => Reply::tagged(Response::bad(tag, message)),
                Err(e) => Reply::tagged(Response::bad(tag, e.to_string())),
            };

            for response in &reply.untagged {
                log::debug!("Server: {}", response.to_string().trim_end());
                connection.write_response(response).await?;
            }
            log::debug!("Server: {}", reply.tagged.to_string().trim_end());
            connection.write_response(&reply.tagged).await?;

            if self.state == SessionState::Logout {
                return Ok(());
            }
        }
    }

    /// Gate the command against the session state, then dispatch it.
    /// State is checked before any repository access.
    async fn execute(&mut self, tag: &str, command: Command) -> Reply {
        if command.requires_auth() && !self.state.is_authenticated() {
            return Reply::tagged(Response::no(tag, "Please authenticate first"));
        }
        if command.requires_selected_folder() && self.state.selected_folder().is_none() {
            return Reply::tagged(Response::no(tag, "No folder selected"));
        }

        let folder = self.state.selected_folder().unwrap_or_default().to_string();
        let repo = self.repository.as_ref();

        let result = match command {
            Command::Capability => Ok(handlers::capability::handle(tag)),
            Command::Noop => Ok(handlers::noop::handle(tag)),
            Command::Logout => Ok(handlers::logout::handle(tag, &mut self.state)),
            Command::Idle => Ok(handlers::idle::handle(tag)),
            Command::Login { username, password } => {
                Ok(handlers::login::handle(tag, &username, &password, &mut self.state))
            }
            Command::List => Ok(handlers::list::handle(tag)),
            Command::Select { folder } => {
                handlers::select::handle(repo, tag, &folder, false, &mut self.state).await
            }
            Command::Examine { folder } => {
                handlers::select::handle(repo, tag, &folder, true, &mut self.state).await
            }
            Command::Status { folder } => handlers::status::handle(repo, tag, &folder).await,
            Command::Fetch { sequence, items } => {
                handlers::fetch::handle(repo, tag, &folder, &sequence, &items, false).await
            }
            Command::Search => handlers::search::handle(repo, tag, &folder, false).await,
            Command::Store { sequence, operation, flags } => {
                handlers::store::handle(repo, tag, &folder, &sequence, &operation, &flags).await
            }
            Command::Uid(uid) => match uid {
                UidCommand::Fetch { sequence, items } => {
                    handlers::fetch::handle(repo, tag, &folder, &sequence, &items, true).await
                }
                UidCommand::Search => handlers::search::handle(repo, tag, &folder, true).await,
                UidCommand::Store { sequence, operation, flags } => {
                    handlers::store::handle(repo, tag, &folder, &sequence, &operation, &flags).await
                }
            },
        };

        match result {
            Ok(reply) => reply,
            Err(Error::Database(e)) => {
                log::error!("Repository error: {}", e);
                Reply::tagged(Response::no(tag, "Database error"))
            }
            Err(Error::ProtocolError(message)) => Reply::tagged(Response::bad(tag, message)),
            Err(e) => Reply::tagged(Response::no(tag, e.to_string())),
        }
    }
}
