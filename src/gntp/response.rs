//! Daemon response capture and status parsing
//!
//! A GNTP response looks like:
//! ```text
//! GNTP/1.0 -OK NONE\r\n
//! Response-Action: NOTIFY\r\n
//! \r\n
//! ```
//! or, on failure, `-ERROR` with `Error-Code` and `Error-Description`
//! headers. The raw text is always kept for diagnostics.

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::common::{Error, Result};

/// Largest reply accepted from a daemon; real replies are a few hundred bytes
pub const MAX_RESPONSE_BYTES: usize = 64 * 1024;

/// Accumulates response lines until the peer closes or the message ends
#[derive(Debug, Default)]
pub struct ResponseReader {
    lines: Vec<String>,
    complete: bool,
}

impl ResponseReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line, including its line terminator
    ///
    /// The response is complete at the first blank line that follows
    /// some content.
    pub fn push_line(&mut self, line: String) {
        let blank = line.trim().is_empty();
        let has_content = self.lines.iter().any(|l| !l.trim().is_empty());
        self.lines.push(line);

        if blank && has_content {
            self.complete = true;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The accumulated text, line boundaries preserved
    pub fn raw(&self) -> String {
        self.lines.concat()
    }

    /// Read lines from `reader` until EOF or a complete response
    ///
    /// Fails once more than `MAX_RESPONSE_BYTES` arrive.
    pub async fn read_from<R: AsyncBufRead + Unpin>(self, reader: &mut R) -> Result<String> {
        self.read_limited(reader, MAX_RESPONSE_BYTES).await
    }

    async fn read_limited<R: AsyncBufRead + Unpin>(
        mut self,
        reader: &mut R,
        limit: usize,
    ) -> Result<String> {
        let mut limited = reader.take(limit as u64 + 1);
        let mut buf = Vec::new();
        let mut total = 0;

        while !self.complete {
            buf.clear();
            let n = limited
                .read_until(b'\n', &mut buf)
                .await
                .map_err(Error::TransportRead)?;
            if n == 0 {
                break;
            }
            total += n;
            if total > limit {
                return Err(Error::MalformedResponse("response too large".to_string()));
            }
            self.push_line(String::from_utf8_lossy(&buf).into_owned());
        }

        Ok(self.raw())
    }
}

/// Status token on the first response line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
    Callback,
}

impl Status {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "-OK" => Some(Self::Ok),
            "-ERROR" => Some(Self::Error),
            "-CALLBACK" => Some(Self::Callback),
            _ => None,
        }
    }
}

/// A parsed daemon response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub version: String,
    pub status: Status,
    pub headers: Vec<(String, String)>,
    pub raw: String,
}

impl Response {
    /// Parse the raw text captured from the socket
    pub fn parse(raw: String) -> Result<Self> {
        let mut lines = raw.lines().map(str::trim).skip_while(|l| l.is_empty());

        let first = lines
            .next()
            .ok_or_else(|| Error::MalformedResponse("empty response".to_string()))?;

        let mut tokens = first.split_whitespace();
        let version = tokens
            .next()
            .and_then(|t| t.strip_prefix("GNTP/"))
            .ok_or_else(|| Error::MalformedResponse(format!("not a GNTP response: {}", first)))?
            .to_string();
        let status = tokens
            .next()
            .and_then(Status::parse)
            .ok_or_else(|| Error::MalformedResponse(format!("unknown status line: {}", first)))?;

        let headers = lines
            .take_while(|l| !l.is_empty())
            .filter_map(|l| l.split_once(':'))
            .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
            .collect();

        Ok(Self {
            version,
            status,
            headers,
            raw,
        })
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Request kind the daemon is answering
    pub fn action(&self) -> Option<&str> {
        self.header("Response-Action")
    }

    pub fn error_code(&self) -> Option<&str> {
        self.header("Error-Code")
    }

    pub fn error_description(&self) -> Option<&str> {
        self.header("Error-Description")
    }

    /// Whether the daemon accepted the request
    pub fn is_success(&self) -> bool {
        self.status != Status::Error
    }

    /// Turn an `-ERROR` reply into an error value
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::rejected(self.error_code(), self.error_description()))
        }
    }
}
