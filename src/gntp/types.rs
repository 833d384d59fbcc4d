//! GNTP protocol types shared by the builder, the client and configuration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::common::Error;

/// Well-known GNTP port, also the SUBSCRIBE port sentinel
pub const DEFAULT_PORT: u16 = 23053;

/// Protocol version written on the request line unless configured otherwise
pub const DEFAULT_VERSION: &str = "1.0";

/// Encryption token; message bodies are always sent in the clear
pub const ENCRYPTION_NONE: &str = "NONE";

/// Digest used to derive the authentication header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    /// All algorithms a GNTP daemon is required to understand
    pub const ALL: [HashAlgorithm; 4] = [Self::Md5, Self::Sha1, Self::Sha256, Self::Sha512];

    /// Name as it appears in the auth header
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            _ => Err(Error::UnsupportedHashAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request type named on the GNTP request line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageKind {
    Register,
    Notify,
    Subscribe,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Register => "REGISTER",
            Self::Notify => "NOTIFY",
            Self::Subscribe => "SUBSCRIBE",
        }
    }
}

impl FromStr for MessageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REGISTER" => Ok(Self::Register),
            "NOTIFY" => Ok(Self::Notify),
            "SUBSCRIBE" => Ok(Self::Subscribe),
            _ => Err(Error::UnknownMessageKind(s.to_string())),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A boolean-ish header value as it may arrive from configuration or callers
///
/// Rendered to `True`/`False` by [`crate::gntp::boolean::render`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoolValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Default for BoolValue {
    fn default() -> Self {
        Self::Bool(false)
    }
}

impl From<bool> for BoolValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for BoolValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for BoolValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for BoolValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// One notification type an application declares on REGISTER
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationDescriptor {
    /// Unique identifier of the notification type
    pub name: String,
    /// Name shown to the user, defaults to `name` on the daemon side
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: BoolValue,
    /// Icon URL or path
    #[serde(default)]
    pub icon: Option<String>,
}

fn enabled_by_default() -> BoolValue {
    BoolValue::Bool(true)
}

impl NotificationDescriptor {
    /// Enabled descriptor with no display name or icon
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display: None,
            enabled: enabled_by_default(),
            icon: None,
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn with_enabled(mut self, enabled: impl Into<BoolValue>) -> Self {
        self.enabled = enabled.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}
