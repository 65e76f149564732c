//! IMAP server: accept loop spawning one session task per connection

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::connection::Connection;
use crate::error::Result;
use crate::repository::MailRepository;
use crate::session::{Session, DEFAULT_IDLE_TIMEOUT};

/// IMAP server over a shared message repository.
pub struct ImapServer {
    repository: Arc<dyn MailRepository>,
    idle_timeout: Duration,
}

impl ImapServer {
    pub fn new<R>(repository: R) -> Self
    where
        R: MailRepository + 'static,
    {
        Self {
            repository: Arc::new(repository),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    /// Override the per-command read timeout (mainly for tests).
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Bind and serve on the given address.
    pub async fn listen(&self, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        log::info!("IMAP server listening on {}", addr);
        self.listen_on(listener).await
    }

    /// Serve on an existing listener (useful for testing with port 0).
    pub async fn listen_on(&self, listener: TcpListener) -> Result<()> {
        loop {
            let (stream, peer_addr) = listener.accept().await?;
            log::debug!("Accepted connection from {}", peer_addr);

            let session = Session::new(Arc::clone(&self.repository), self.idle_timeout);
            tokio::spawn(async move {
                let connection = match Connection::new(stream) {
                    Ok(c) => c,
                    Err(e) => {
                        log::error!("Failed to set up connection: {}", e);
                        return;
                    }
                };
                if let Err(e) = session.handle(connection).await {
                    log::error!("Session error for {}: {}", peer_addr, e);
                }
            });
        }
    }
}
