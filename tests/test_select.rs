//! Integration tests for SELECT, EXAMINE, STATUS, and LIST

use barque::repository::sqlite::SqliteRepository;
use barque::sequence::MessageSet;
use barque::server::ImapServer;
use barque::{MailRepository, SEEN_FLAG};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

/// Set up a test server backed by a fresh database; the repository handle is
/// returned so tests can stage fixtures directly.
async fn setup_test_server() -> (TempDir, String, SqliteRepository) {
    let tmp_dir = TempDir::new().unwrap();
    let db_path = tmp_dir.path().join("mails.db");

    let repository = SqliteRepository::new(&db_path).await.unwrap();
    let fixtures = SqliteRepository::new(&db_path).await.unwrap();
    let server = ImapServer::new(repository);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let actual_addr = listener.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        if let Err(e) = server.listen_on(listener).await {
            eprintln!("Server error: {}", e);
        }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    (tmp_dir, actual_addr, fixtures)
}

async fn stage_message(repo: &SqliteRepository, folder: &str, subject: &str) -> u32 {
    let raw = format!(
        "From: a@example.com\r\nTo: b@example.com\r\nSubject: {subject}\r\n\r\nbody\r\n"
    );
    repo.append(folder, subject, "a@example.com", "b@example.com", &raw)
        .await
        .unwrap()
}

struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    async fn connect_and_login(addr: &str) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, write_half) = stream.into_split();
        let mut client = TestClient {
            reader: BufReader::new(read_half),
            writer: write_half,
        };
        client.read_line().await; // greeting
        let lines = client.command("t0", "LOGIN user pass").await;
        assert!(lines.last().unwrap().contains("OK LOGIN completed"));
        client
    }

    async fn read_line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).await.unwrap();
        line
    }

    async fn command(&mut self, tag: &str, line: &str) -> Vec<String> {
        self.writer
            .write_all(format!("{} {}\r\n", tag, line).as_bytes())
            .await
            .unwrap();
        self.writer.flush().await.unwrap();

        let prefix = format!("{} ", tag);
        let mut lines = Vec::new();
        loop {
            let line = self.read_line().await;
            let done = line.starts_with(&prefix);
            lines.push(line);
            if done {
                return lines;
            }
        }
    }
}

#[tokio::test]
async fn test_select_reports_counters_in_order() {
    let (_tmp_dir, addr, repo) = setup_test_server().await;
    let id1 = stage_message(&repo, "INBOX", "one").await;
    stage_message(&repo, "INBOX", "two").await;
    stage_message(&repo, "INBOX", "three").await;
    repo.add_flag("INBOX", &MessageSet::Single(id1), SEEN_FLAG)
        .await
        .unwrap();

    let mut client = TestClient::connect_and_login(&addr).await;
    let lines = client.command("a1", "SELECT INBOX").await;

    assert_eq!(lines[0], "* 3 EXISTS\r\n");
    assert_eq!(lines[1], "* 2 RECENT\r\n");
    assert_eq!(lines[2], "* OK [UIDVALIDITY 1] UID validity status\r\n");
    assert_eq!(lines[3], "* OK [UIDNEXT 4] Predicted next UID\r\n");
    assert_eq!(
        lines[4],
        "* FLAGS (\\Answered \\Flagged \\Deleted \\Seen \\Draft)\r\n"
    );
    assert!(lines[5].starts_with("* OK [PERMANENTFLAGS"));
    assert_eq!(lines[6], "a1 OK [READ-WRITE] SELECT completed\r\n");
}

#[tokio::test]
async fn test_examine_reports_read_only() {
    let (_tmp_dir, addr, repo) = setup_test_server().await;
    stage_message(&repo, "INBOX", "one").await;

    let mut client = TestClient::connect_and_login(&addr).await;
    let lines = client.command("a1", "EXAMINE INBOX").await;
    assert_eq!(lines[0], "* 1 EXISTS\r\n");
    assert_eq!(
        lines.last().unwrap(),
        "a1 OK [READ-ONLY] EXAMINE completed\r\n"
    );
}

#[tokio::test]
async fn test_select_empty_folder() {
    let (_tmp_dir, addr, _repo) = setup_test_server().await;

    let mut client = TestClient::connect_and_login(&addr).await;
    let lines = client.command("a1", "SELECT Drafts").await;
    assert_eq!(lines[0], "* 0 EXISTS\r\n");
    assert_eq!(lines[1], "* 0 RECENT\r\n");
    assert_eq!(lines[3], "* OK [UIDNEXT 1] Predicted next UID\r\n");
}

#[tokio::test]
async fn test_reselect_switches_folder() {
    let (_tmp_dir, addr, repo) = setup_test_server().await;
    stage_message(&repo, "INBOX", "in inbox").await;

    let mut client = TestClient::connect_and_login(&addr).await;
    client.command("a1", "SELECT INBOX").await;
    client.command("a2", "SELECT Drafts").await;

    // SEARCH now runs against Drafts, which is empty.
    let lines = client.command("a3", "SEARCH ALL").await;
    assert_eq!(lines[0], "* SEARCH\r\n");
}

#[tokio::test]
async fn test_status_without_selection() {
    let (_tmp_dir, addr, repo) = setup_test_server().await;
    stage_message(&repo, "Sent", "one").await;
    stage_message(&repo, "Sent", "two").await;

    let mut client = TestClient::connect_and_login(&addr).await;
    let lines = client.command("a1", "STATUS Sent (MESSAGES UNSEEN)").await;
    assert_eq!(
        lines[0],
        "* STATUS \"Sent\" (MESSAGES 2 RECENT 2 UIDNEXT 3 UIDVALIDITY 1 UNSEEN 2)\r\n"
    );
    assert_eq!(lines.last().unwrap(), "a1 OK STATUS completed\r\n");
}

#[tokio::test]
async fn test_list_enumerates_fixed_folders() {
    let (_tmp_dir, addr, _repo) = setup_test_server().await;

    let mut client = TestClient::connect_and_login(&addr).await;
    let lines = client.command("a1", "LIST \"\" \"*\"").await;

    let listed: Vec<&String> = lines
        .iter()
        .filter(|l| l.starts_with("* LIST"))
        .collect();
    assert_eq!(listed.len(), 4);
    assert!(lines.iter().any(|l| l.contains("\"INBOX\"")));
    assert!(lines.iter().any(|l| l.contains("\\Drafts")));
    assert!(lines.iter().any(|l| l.contains("\\Trash")));
    assert_eq!(lines.last().unwrap(), "a1 OK LIST completed\r\n");
}

#[tokio::test]
async fn test_search_lists_ordinals_and_uids() {
    let (_tmp_dir, addr, repo) = setup_test_server().await;
    let id1 = stage_message(&repo, "INBOX", "one").await;
    let id2 = stage_message(&repo, "INBOX", "two").await;

    let mut client = TestClient::connect_and_login(&addr).await;
    client.command("a1", "SELECT INBOX").await;

    let lines = client.command("a2", "SEARCH ALL").await;
    assert_eq!(lines[0], "* SEARCH 1 2\r\n");
    assert_eq!(lines.last().unwrap(), "a2 OK SEARCH completed\r\n");

    let lines = client.command("a3", "UID SEARCH ALL").await;
    assert_eq!(lines[0], format!("* SEARCH {} {}\r\n", id1, id2));
    assert_eq!(lines.last().unwrap(), "a3 OK UID SEARCH completed\r\n");
}
