//! Buffered wrapper around an accepted TCP stream
//!
//! Uses split reader/writer halves with BufReader/BufWriter so a handler can
//! interleave line responses and raw literal bytes on the same connection.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::protocol::Response;

/// A plain TCP client connection.
pub struct Connection {
    reader: Mutex<BufReader<OwnedReadHalf>>,
    writer: Mutex<BufWriter<OwnedWriteHalf>>,
    peer_addr: std::net::SocketAddr,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Result<Self> {
        let peer_addr = stream.peer_addr()?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: Mutex::new(BufReader::new(read_half)),
            writer: Mutex::new(BufWriter::new(write_half)),
            peer_addr,
        })
    }

    /// Read one line into `buf`, returning the number of bytes read.
    /// Zero means the peer closed the connection.
    pub async fn read_line(&self, buf: &mut String) -> Result<usize> {
        let mut guard = self.reader.lock().await;
        let bytes = guard.read_line(buf).await?;
        Ok(bytes)
    }

    /// Render and write a single response, flushing immediately.
    pub async fn write_response(&self, response: &Response) -> Result<()> {
        self.write_all(response.to_string().as_bytes()).await
    }

    /// Write raw bytes, flushing immediately.
    pub async fn write_all(&self, buf: &[u8]) -> Result<()> {
        let mut guard = self.writer.lock().await;
        guard.write_all(buf).await?;
        guard.flush().await?;
        Ok(())
    }

    pub fn peer_addr(&self) -> std::net::SocketAddr {
        self.peer_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    async fn create_test_connection() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client_task = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });

        let (server_stream, _) = listener.accept().await.unwrap();
        let client_stream = client_task.await.unwrap();

        (server_stream, client_stream)
    }

    #[tokio::test]
    async fn test_read_line() {
        let (server_stream, mut client_stream) = create_test_connection().await;
        let conn = Connection::new(server_stream).unwrap();

        client_stream.write_all(b"a1 NOOP\r\n").await.unwrap();
        client_stream.flush().await.unwrap();

        let mut buf = String::new();
        conn.read_line(&mut buf).await.unwrap();
        assert_eq!(buf.trim(), "a1 NOOP");
    }

    #[tokio::test]
    async fn test_write_response() {
        let (server_stream, mut client_stream) = create_test_connection().await;
        let conn = Connection::new(server_stream).unwrap();

        let response = Response::ok("A001", "NOOP completed");
        conn.write_response(&response).await.unwrap();

        let mut buf = vec![0u8; 1024];
        let n = client_stream.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"A001 OK NOOP completed\r\n");
    }
}
