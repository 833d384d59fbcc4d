//! GNTP request serialization
//!
//! Every request has the same layout:
//! ```text
//! GNTP/<version> <KIND> NONE <auth-hash> \r\n
//! Header-Name: value \r\n
//! ...
//! \r\n
//! ```
//! REGISTER follows the preamble with one header block per notification
//! type, each closed by a blank line, and ends with an extra blank line.

use std::collections::HashSet;

use super::auth;
use super::boolean::{self, Strictness};
use super::types::{BoolValue, MessageKind, NotificationDescriptor, DEFAULT_PORT, ENCRYPTION_NONE};
use crate::common::{Error, Result};

const CRLF: &str = "\r\n";

/// REGISTER payload
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterPayload {
    pub application_name: String,
    pub application_icon: Option<String>,
    pub notifications: Vec<NotificationDescriptor>,
}

/// NOTIFY payload
#[derive(Debug, Clone, PartialEq)]
pub struct NotifyPayload {
    pub application_name: String,
    pub name: String,
    pub id: Option<String>,
    pub title: String,
    pub text: Option<String>,
    pub sticky: BoolValue,
    pub priority: i32,
    pub icon: Option<String>,
    pub coalescing_id: Option<String>,
    pub callback_context: Option<String>,
    pub callback_context_type: Option<String>,
    pub callback_target: Option<String>,
}

/// SUBSCRIBE payload
#[derive(Debug, Clone, PartialEq)]
pub struct SubscribePayload {
    pub id: String,
    pub name: String,
    pub port: u16,
}

impl SubscribePayload {
    /// Port 0 is treated as unspecified
    pub fn effective_port(&self) -> u16 {
        if self.port == 0 {
            DEFAULT_PORT
        } else {
            self.port
        }
    }
}

/// A typed request ready to be serialized
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Register(RegisterPayload),
    Notify(NotifyPayload),
    Subscribe(SubscribePayload),
}

impl Request {
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Register(_) => MessageKind::Register,
            Self::Notify(_) => MessageKind::Notify,
            Self::Subscribe(_) => MessageKind::Subscribe,
        }
    }

    /// Check that every required header has a value
    pub fn validate(&self) -> Result<()> {
        let required: Vec<(&'static str, &str)> = match self {
            Self::Register(p) => vec![("Application-Name", p.application_name.as_str())],
            Self::Notify(p) => vec![
                ("Application-Name", p.application_name.as_str()),
                ("Notification-Name", p.name.as_str()),
                ("Notification-Title", p.title.as_str()),
            ],
            Self::Subscribe(p) => vec![
                ("Subscriber-ID", p.id.as_str()),
                ("Subscriber-Name", p.name.as_str()),
            ],
        };

        if let Some((header, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(Error::MissingHeader {
                kind: self.kind().to_string(),
                header: header.to_string(),
            });
        }

        if let Self::Register(p) = self {
            validate_notifications(&p.notifications)?;
        }
        Ok(())
    }
}

// Notification names identify a type within the application.
fn validate_notifications(notifications: &[NotificationDescriptor]) -> Result<()> {
    let mut seen = HashSet::new();
    for notification in notifications {
        let name = notification.name.trim();
        if name.is_empty() {
            return Err(Error::MissingHeader {
                kind: MessageKind::Register.to_string(),
                header: "Notification-Name".to_string(),
            });
        }
        if !seen.insert(name) {
            return Err(Error::DuplicateNotification(name.to_string()));
        }
    }
    Ok(())
}

type Header = (&'static str, String);

/// An ordered GNTP message
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub kind: MessageKind,
    pub version: String,
    /// Auth hash, empty when unauthenticated
    pub auth: String,
    pub headers: Vec<Header>,
    /// Per-notification header blocks (REGISTER only)
    pub blocks: Vec<Vec<Header>>,
}

impl Message {
    fn new(kind: MessageKind, version: &str, auth: String) -> Self {
        Self {
            kind,
            version: version.to_string(),
            auth,
            headers: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Look up the first header with the given name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// The request line, without the trailing CRLF
    pub fn request_line(&self) -> String {
        format!(
            "GNTP/{} {} {} {} ",
            self.version, self.kind, ENCRYPTION_NONE, self.auth
        )
    }

    /// Serialize to wire bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut out = self.request_line();
        out.push_str(CRLF);
        write_headers(&mut out, &self.headers);
        out.push_str(CRLF);

        if self.kind == MessageKind::Register {
            for block in &self.blocks {
                write_headers(&mut out, block);
                out.push_str(CRLF);
            }
            out.push_str(CRLF);
        }

        out.into_bytes()
    }
}

fn write_headers(out: &mut String, headers: &[Header]) {
    for (name, value) in headers {
        out.push_str(name);
        out.push_str(": ");
        out.push_str(&sanitize(value));
        out.push(' ');
        out.push_str(CRLF);
    }
}

// A bare CR or CRLF inside a value would end the header early.
fn sanitize(value: &str) -> String {
    value.replace("\r\n", "\n").replace('\r', "\n")
}

fn push_optional(headers: &mut Vec<Header>, name: &'static str, value: Option<&String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        headers.push((name, value.clone()));
    }
}

/// Builds messages for one connection's settings
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    version: String,
    password: String,
    hash_method: String,
    strictness: Strictness,
}

impl RequestBuilder {
    pub fn new(version: &str, password: &str, hash_method: &str) -> Self {
        Self {
            version: version.to_string(),
            password: password.to_string(),
            hash_method: hash_method.to_string(),
            strictness: Strictness::default(),
        }
    }

    pub fn strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Build a message with a freshly derived auth hash
    pub fn build(&self, request: &Request) -> Result<Message> {
        let auth = auth::derive(&self.password, &self.hash_method);
        self.build_with_auth(request, auth)
    }

    /// Build a message using an already derived auth hash
    pub fn build_with_auth(&self, request: &Request, auth: String) -> Result<Message> {
        request.validate()?;
        let mut message = Message::new(request.kind(), &self.version, auth);

        match request {
            Request::Register(payload) => self.register(&mut message, payload)?,
            Request::Notify(payload) => self.notify(&mut message, payload)?,
            Request::Subscribe(payload) => subscribe(&mut message, payload),
        }

        tracing::debug!("Built {}", message.request_line().trim_end());
        Ok(message)
    }

    fn register(&self, message: &mut Message, payload: &RegisterPayload) -> Result<()> {
        let headers = &mut message.headers;
        headers.push(("Application-Name", payload.application_name.clone()));
        push_optional(headers, "Application-Icon", payload.application_icon.as_ref());
        headers.push(("Notifications-Count", payload.notifications.len().to_string()));

        for notification in &payload.notifications {
            let mut block = vec![("Notification-Name", notification.name.clone())];
            push_optional(&mut block, "Notification-Display-Name", notification.display.as_ref());
            block.push((
                "Notification-Enabled",
                boolean::render(&notification.enabled, self.strictness)?.to_string(),
            ));
            push_optional(&mut block, "Notification-Icon", notification.icon.as_ref());
            message.blocks.push(block);
        }

        Ok(())
    }

    fn notify(&self, message: &mut Message, payload: &NotifyPayload) -> Result<()> {
        let headers = &mut message.headers;
        headers.push(("Application-Name", payload.application_name.clone()));
        headers.push(("Notification-Name", payload.name.clone()));
        push_optional(headers, "Notification-ID", payload.id.as_ref());
        headers.push(("Notification-Title", payload.title.clone()));
        push_optional(headers, "Notification-Text", payload.text.as_ref());
        headers.push((
            "Notification-Sticky",
            boolean::render(&payload.sticky, self.strictness)?.to_string(),
        ));
        headers.push(("Notification-Priority", payload.priority.to_string()));
        push_optional(headers, "Notification-Icon", payload.icon.as_ref());

        // Callback context is only sent alongside a coalescing id.
        if payload.coalescing_id.as_ref().is_some_and(|id| !id.is_empty()) {
            push_optional(headers, "Notification-Coalescing-ID", payload.coalescing_id.as_ref());
            headers.push((
                "Notification-Callback-Context",
                payload.callback_context.clone().unwrap_or_default(),
            ));
        }

        push_optional(
            headers,
            "Notification-Callback-Context-Type",
            payload.callback_context_type.as_ref(),
        );
        push_optional(headers, "Notification-Callback-Target", payload.callback_target.as_ref());

        Ok(())
    }
}

fn subscribe(message: &mut Message, payload: &SubscribePayload) {
    let headers = &mut message.headers;
    headers.push(("Subscriber-ID", payload.id.clone()));
    headers.push(("Subscriber-Name", payload.name.clone()));
    headers.push(("Subscriber-Port", payload.effective_port().to_string()));
}
