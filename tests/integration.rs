//! End-to-end tests for the GNTP client
//!
//! These tests run a real `Client` over TCP against an in-process daemon
//! that records the request bytes and answers with a canned reply.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use gntp::gntp::auth;
use gntp::gntp::types::{HashAlgorithm, NotificationDescriptor};
use gntp::gntp::Status;
use gntp::{Client, Config, Error, NotifyOptions, RegisterOptions, SubscribeOptions};

const OK_NOTIFY: &str = "GNTP/1.0 -OK NONE\r\nResponse-Action: NOTIFY\r\n\r\n";

/// Daemon that serves `connections` requests and returns what it received
struct MockDaemon {
    port: u16,
    handle: JoinHandle<Vec<String>>,
}

impl MockDaemon {
    async fn start(connections: usize, reply: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let mut received = Vec::new();
            for _ in 0..connections {
                let (socket, _) = listener.accept().await.unwrap();
                let (read_half, mut write_half) = socket.into_split();
                let mut reader = BufReader::new(read_half);

                received.push(read_request(&mut reader).await);
                write_half.write_all(reply.as_bytes()).await.unwrap();
            }
            received
        });

        Self { port, handle }
    }

    async fn received(self) -> Vec<String> {
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("mock daemon did not finish")
            .unwrap()
    }
}

/// Read one request: the preamble plus one block per registered notification
async fn read_request(reader: &mut BufReader<tokio::net::tcp::OwnedReadHalf>) -> String {
    let mut text = String::new();
    let mut blocks_left = 1usize;
    let mut in_block = false;

    while blocks_left > 0 {
        let mut line = String::new();
        if reader.read_line(&mut line).await.unwrap() == 0 {
            break;
        }
        text.push_str(&line);

        if let Some(count) = line.trim().strip_prefix("Notifications-Count:") {
            blocks_left += count.trim().parse::<usize>().unwrap();
        }

        if line.trim().is_empty() {
            if in_block {
                blocks_left -= 1;
                in_block = false;
            }
        } else {
            in_block = true;
        }
    }

    // REGISTER ends with one more blank line; leave nothing unread
    if text.starts_with("GNTP/1.0 REGISTER") {
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        text.push_str(&line);
    }

    text
}

fn config_for(port: u16) -> Config {
    let mut config = Config::default();
    config.gntp.host = "127.0.0.1".to_string();
    config.gntp.port = port;
    config.gntp.timeout_secs = 2;
    config.gntp.read_timeout_secs = 5;
    config.gntp.hash_method = "sha256".to_string();
    config.register.application_name = "Tester".to_string();
    config
}

#[tokio::test]
async fn test_notify_over_tcp() {
    let daemon = MockDaemon::start(1, OK_NOTIFY).await;
    let mut client = Client::new(config_for(daemon.port));

    let response = client
        .notify("alert", "Disk Full", "/dev/sda1 at 98%", NotifyOptions::default())
        .await
        .unwrap();

    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.action(), Some("NOTIFY"));
    assert_eq!(client.last_raw_response(), Some(OK_NOTIFY));

    let received = daemon.received().await;
    let request = &received[0];
    assert!(request.starts_with("GNTP/1.0 NOTIFY NONE  \r\n"));
    assert!(request.contains("Notification-Title: Disk Full \r\n"));
    assert!(request.contains("Notification-Sticky: False \r\n"));
    assert!(request.contains("Notification-Priority: 0 \r\n"));
}

#[tokio::test]
async fn test_register_with_password() {
    let daemon = MockDaemon::start(
        1,
        "GNTP/1.0 -OK NONE\r\nResponse-Action: REGISTER\r\n\r\n",
    )
    .await;
    let mut config = config_for(daemon.port);
    config.gntp.password = "hunter2".to_string();
    let mut client = Client::new(config);

    let options = RegisterOptions::default().notifications(vec![
        NotificationDescriptor::new("build").with_display("Build finished"),
        NotificationDescriptor::new("deploy").with_enabled("no"),
    ]);
    client.register(options).await.unwrap();

    let received = daemon.received().await;
    let request = &received[0];
    assert!(request.contains("Notifications-Count: 2 \r\n"));
    assert!(request.contains("Notification-Enabled: False \r\n"));

    // The daemon can recompute the hash from the salt it was given
    let request_line = request.lines().next().unwrap();
    let hash = request_line.split_whitespace().nth(3).unwrap();
    let salt_hex = hash.split_once('.').unwrap().1;
    let salt = String::from_utf8(hex::decode(salt_hex).unwrap()).unwrap();
    assert_eq!(
        auth::derive_with_salt("hunter2", HashAlgorithm::Sha256, &salt),
        hash
    );
}

#[tokio::test]
async fn test_subscribe_over_tcp() {
    let daemon = MockDaemon::start(
        1,
        "GNTP/1.0 -OK NONE\r\nResponse-Action: SUBSCRIBE\r\nSubscription-TTL: 300\r\n\r\n",
    )
    .await;
    let mut client = Client::new(config_for(daemon.port));

    let response = client
        .subscribe("0f8e3530-7a29", "laptop", SubscribeOptions::default().port(9999))
        .await
        .unwrap();
    assert_eq!(response.header("Subscription-TTL"), Some("300"));

    let received = daemon.received().await;
    assert!(received[0].contains("Subscriber-Name: laptop \r\n"));
    assert!(received[0].contains("Subscriber-Port: 9999 \r\n"));
}

#[tokio::test]
async fn test_daemon_error_is_reported() {
    let daemon = MockDaemon::start(
        1,
        "GNTP/1.0 -ERROR NONE\r\nError-Code: 401\r\nError-Description: Unknown application\r\n\r\n",
    )
    .await;
    let mut client = Client::new(config_for(daemon.port));

    let err = client
        .notify("alert", "Title", "", NotifyOptions::default())
        .await
        .unwrap_err();

    match err {
        Error::Rejected { code, description } => {
            assert_eq!(code, "401");
            assert_eq!(description, "Unknown application");
        }
        other => panic!("Expected Rejected, got {other:?}"),
    }
    assert!(client.last_raw_response().unwrap().contains("-ERROR"));
    daemon.received().await;
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut client = Client::new(config_for(port));
    let err = client
        .notify("alert", "Title", "", NotifyOptions::default())
        .await
        .unwrap_err();
    assert!(err.is_connect_error(), "unexpected error: {err}");
    assert!(client.last_raw_response().is_none());
}

#[tokio::test]
async fn test_concurrent_clients() {
    let daemon = MockDaemon::start(4, OK_NOTIFY).await;
    let port = daemon.port;
    let mut config = config_for(port);
    config.gntp.password = "secret".to_string();

    let tasks: Vec<_> = (0..4)
        .map(|i| {
            let config = config.clone();
            tokio::spawn(async move {
                let mut client = Client::new(config);
                client
                    .notify("alert", &format!("Title {i}"), "", NotifyOptions::default())
                    .await
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let received = daemon.received().await;
    assert_eq!(received.len(), 4);

    let mut hashes: Vec<&str> = received
        .iter()
        .map(|r| r.lines().next().unwrap())
        .collect();
    hashes.sort();
    hashes.dedup();
    assert_eq!(hashes.len(), 4, "every request should carry its own salt");
}

#[tokio::test]
async fn test_config_file_drives_client() {
    let daemon = MockDaemon::start(1, OK_NOTIFY).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        format!(
            r#"
            [gntp]
            host = "127.0.0.1"
            port = {}
            hash_method = "crc32"
            password = "ignored"

            [register]
            application_name = "From File"

            [notify]
            sticky = "yes"
            priority = -1
            coalescing_id = "disk"
            callback_context = "sda1"
            "#,
            daemon.port
        ),
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    let mut client = Client::new(config);
    client
        .notify("alert", "Disk Full", "", NotifyOptions::default())
        .await
        .unwrap();

    let received = daemon.received().await;
    let request = &received[0];
    // Unsupported hash methods degrade to an unauthenticated request
    assert!(request.starts_with("GNTP/1.0 NOTIFY NONE  \r\n"));
    assert!(request.contains("Application-Name: From File \r\n"));
    assert!(request.contains("Notification-Sticky: True \r\n"));
    assert!(request.contains("Notification-Priority: -1 \r\n"));
    assert!(request.contains("Notification-Coalescing-ID: disk \r\n"));
    assert!(request.contains("Notification-Callback-Context: sda1 \r\n"));
}

#[test]
fn test_missing_config_file() {
    let err = Config::load_from(std::path::Path::new("/nonexistent/gntp/config.toml")).unwrap_err();
    assert!(matches!(err, Error::FileRead { .. }));
}
