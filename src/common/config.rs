//! Configuration file handling
//!
//! The file mirrors the sections a GNTP client needs:
//! ```toml
//! [gntp]
//! host = "192.168.1.20"
//! password = "secret"
//! hash_method = "sha256"
//!
//! [register]
//! application_name = "Build Server"
//!
//! [notify]
//! sticky = "yes"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::paths::config_path;
use super::Result;
use crate::gntp::boolean::Strictness;
use crate::gntp::message::RequestBuilder;
use crate::gntp::transport::Endpoint;
use crate::gntp::types::{BoolValue, NotificationDescriptor, DEFAULT_PORT, DEFAULT_VERSION};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct Config {
    /// Connection and protocol settings
    #[serde(default)]
    pub gntp: GntpConfig,

    /// REGISTER defaults
    #[serde(default)]
    pub register: RegisterConfig,

    /// NOTIFY defaults
    #[serde(default)]
    pub notify: NotifyConfig,

    /// SUBSCRIBE defaults
    #[serde(default)]
    pub subscribe: SubscribeConfig,
}

/// Connection and protocol settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GntpConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Connect timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Deadline for the whole response in seconds
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    /// Empty means unauthenticated
    #[serde(default)]
    pub password: String,

    /// md5, sha1, sha256 or sha512; anything else disables authentication
    #[serde(default = "default_hash_method")]
    pub hash_method: String,

    /// Version written on the request line
    #[serde(default = "default_version")]
    pub version: String,

    /// Reject boolean strings other than true/false/yes/no
    #[serde(default)]
    pub strict_booleans: bool,
}

impl Default for GntpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_secs: default_timeout(),
            read_timeout_secs: default_read_timeout(),
            password: String::new(),
            hash_method: default_hash_method(),
            version: default_version(),
            strict_booleans: false,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_timeout() -> u64 {
    5
}
fn default_read_timeout() -> u64 {
    30
}
fn default_hash_method() -> String {
    "md5".to_string()
}
fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

/// REGISTER defaults
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RegisterConfig {
    #[serde(default = "default_application_name")]
    pub application_name: String,

    #[serde(default)]
    pub application_icon: Option<String>,

    /// Used to synthesize a single notification when `notifications` is unset
    #[serde(default = "default_notification_name")]
    pub notification_name: String,

    #[serde(default)]
    pub notification_display: Option<String>,

    #[serde(default = "default_enabled")]
    pub notification_enabled: BoolValue,

    #[serde(default)]
    pub notification_icon: Option<String>,

    /// Full list of notification types to register
    #[serde(default)]
    pub notifications: Option<Vec<NotificationDescriptor>>,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            application_name: default_application_name(),
            application_icon: None,
            notification_name: default_notification_name(),
            notification_display: None,
            notification_enabled: default_enabled(),
            notification_icon: None,
            notifications: None,
        }
    }
}

impl RegisterConfig {
    /// Configured notification list, or one built from the single-notification keys
    pub fn notifications(&self) -> Vec<NotificationDescriptor> {
        match &self.notifications {
            Some(list) => list.clone(),
            None => vec![NotificationDescriptor {
                name: self.notification_name.clone(),
                display: self.notification_display.clone(),
                enabled: self.notification_enabled.clone(),
                icon: self.notification_icon.clone(),
            }],
        }
    }
}

fn default_application_name() -> String {
    "gntp-notify".to_string()
}
fn default_notification_name() -> String {
    "General".to_string()
}
fn default_enabled() -> BoolValue {
    BoolValue::Bool(true)
}

/// NOTIFY defaults
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct NotifyConfig {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub sticky: BoolValue,

    /// -2 (very low) through 2 (emergency)
    #[serde(default)]
    pub priority: i32,

    #[serde(default)]
    pub icon: Option<String>,

    #[serde(default)]
    pub coalescing_id: Option<String>,

    #[serde(default)]
    pub callback_context: Option<String>,

    #[serde(default)]
    pub callback_context_type: Option<String>,

    #[serde(default)]
    pub callback_target: Option<String>,
}

/// SUBSCRIBE defaults
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SubscribeConfig {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Port the subscriber listens on for forwarded notifications
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for SubscribeConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| super::Error::Config(e.to_string()))
    }

    /// Connection target for a request
    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            host: self.gntp.host.clone(),
            port: self.gntp.port,
            connect_timeout: Duration::from_secs(self.gntp.timeout_secs),
            read_timeout: Duration::from_secs(self.gntp.read_timeout_secs),
        }
    }

    /// Request builder for the current protocol settings
    pub fn builder(&self) -> RequestBuilder {
        RequestBuilder::new(&self.gntp.version, &self.gntp.password, &self.gntp.hash_method)
            .strictness(Strictness::from_flag(self.gntp.strict_booleans))
    }
}
