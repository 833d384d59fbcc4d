//! Mock GNTP daemon for manual and integration testing
//!
//! Accepts REGISTER, NOTIFY and SUBSCRIBE requests, checks the auth hash
//! when started with a password, logs what it received and replies with
//! `-OK` or `-ERROR` before closing the connection.

use clap::Parser;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use gntp::common::logging;
use gntp::gntp::auth;
use gntp::gntp::{HashAlgorithm, MessageKind, DEFAULT_PORT};

#[derive(Parser)]
#[command(name = "mock-growl", about = "Minimal GNTP daemon for testing")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Require requests to carry a hash of this password
    #[arg(long)]
    password: Option<String>,
}

/// A request as seen by the daemon
struct Received {
    kind: MessageKind,
    auth: String,
    headers: Vec<(String, String)>,
}

#[tokio::main]
async fn main() {
    logging::init_mock();
    let args = Args::parse();

    let listener = match TcpListener::bind((args.bind.as_str(), args.port)).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Error: failed to bind {}:{}: {e}", args.bind, args.port);
            std::process::exit(1);
        }
    };
    tracing::info!("Listening on {}:{}", args.bind, args.port);

    let password = Arc::new(args.password);
    loop {
        match listener.accept().await {
            Ok((socket, peer)) => {
                let password = Arc::clone(&password);
                tokio::spawn(async move {
                    if let Err(e) = handle(socket, password.as_deref()).await {
                        tracing::warn!("Connection from {} failed: {}", peer, e);
                    }
                });
            }
            Err(e) => tracing::warn!("Accept failed: {}", e),
        }
    }
}

async fn handle(socket: TcpStream, password: Option<&str>) -> std::io::Result<()> {
    let (read_half, mut write_half) = socket.into_split();
    let mut reader = BufReader::new(read_half);

    let reply = match read_request(&mut reader).await? {
        Ok(request) => {
            tracing::info!("{} {:?}", request.kind, request.headers);
            match check(&request, password) {
                Ok(()) => format!(
                    "GNTP/1.0 -OK NONE\r\nResponse-Action: {}\r\n\r\n",
                    request.kind
                ),
                Err((code, description)) => error_reply(Some(request.kind), code, description),
            }
        }
        Err(description) => error_reply(None, 300, &description),
    };

    write_half.write_all(reply.as_bytes()).await?;
    write_half.flush().await
}

fn error_reply(kind: Option<MessageKind>, code: u16, description: &str) -> String {
    let action = kind
        .map(|k| format!("Response-Action: {}\r\n", k))
        .unwrap_or_default();
    format!(
        "GNTP/1.0 -ERROR NONE\r\n{}Error-Code: {}\r\nError-Description: {}\r\n\r\n",
        action, code, description
    )
}

async fn read_block<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<Vec<String>> {
    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            if lines.is_empty() {
                continue;
            }
            break;
        }
        lines.push(line.to_string());
    }
    Ok(lines)
}

fn parse_headers(lines: &[String]) -> Vec<(String, String)> {
    lines
        .iter()
        .filter_map(|l| l.split_once(':'))
        .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
        .collect()
}

async fn read_request<R: AsyncBufRead + Unpin>(
    reader: &mut R,
) -> std::io::Result<Result<Received, String>> {
    let preamble = read_block(reader).await?;
    let Some((request_line, rest)) = preamble.split_first() else {
        return Ok(Err("empty request".to_string()));
    };

    let mut tokens = request_line.split_whitespace();
    if !tokens.next().is_some_and(|t| t.starts_with("GNTP/")) {
        return Ok(Err(format!("not a GNTP request: {}", request_line)));
    }
    let kind = match tokens.next().map(str::parse::<MessageKind>) {
        Some(Ok(kind)) => kind,
        Some(Err(e)) => return Ok(Err(e.to_string())),
        None => return Ok(Err("missing message type".to_string())),
    };
    let _encryption = tokens.next();
    let auth = tokens.next().unwrap_or("").to_string();

    let mut headers = parse_headers(rest);

    if kind == MessageKind::Register {
        let count = headers
            .iter()
            .find(|(n, _)| n == "Notifications-Count")
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(0);
        for _ in 0..count {
            let block = read_block(reader).await?;
            headers.extend(parse_headers(&block));
        }
        // Trailing blank line after the last block
        let mut line = String::new();
        reader.read_line(&mut line).await?;
    }

    Ok(Ok(Received {
        kind,
        auth,
        headers,
    }))
}

fn check(request: &Received, password: Option<&str>) -> Result<(), (u16, &'static str)> {
    let Some(password) = password.filter(|p| !p.is_empty()) else {
        return Ok(());
    };

    let valid = request
        .auth
        .split_once(':')
        .and_then(|(algo, rest)| {
            let algorithm = algo.parse::<HashAlgorithm>().ok()?;
            let (_, salt_hex) = rest.split_once('.')?;
            let salt = String::from_utf8(hex::decode(salt_hex).ok()?).ok()?;
            Some(auth::derive_with_salt(password, algorithm, &salt) == request.auth)
        })
        .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        Err((400, "Not authorized"))
    }
}
