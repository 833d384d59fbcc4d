//! GNTP client
//!
//! One public operation per request kind. Every call merges its options
//! over the stored configuration, builds the message, performs a single
//! exchange on a fresh connection and records the daemon's reply.

use std::sync::Arc;

use crate::common::config::Config;
use crate::common::{Error, Result};

use super::message::{NotifyPayload, RegisterPayload, Request, SubscribePayload};
use super::options::{NotifyOptions, RegisterOptions, SubscribeOptions};
use super::response::Response;
use super::transport::{TcpTransport, Transport};

/// Client for a GNTP daemon
///
/// Every operation opens its own connection. Operations take `&mut self`
/// because the client records the last daemon reply, so tasks sending
/// concurrently should each own a `Client`; cloning a `Config` for each is
/// cheap.
pub struct Client {
    config: Config,
    transport: Arc<dyn Transport>,
    last_raw: Option<String>,
    last_response: Option<Response>,
}

impl Client {
    /// Client talking plain TCP
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, Arc::new(TcpTransport))
    }

    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            last_raw: None,
            last_response: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register the application and its notification types
    pub async fn register(&mut self, options: RegisterOptions) -> Result<Response> {
        let config = options.merged(&self.config);

        let request = Request::Register(RegisterPayload {
            application_name: config.register.application_name.clone(),
            application_icon: config.register.application_icon.clone(),
            notifications: config.register.notifications(),
        });

        self.send(&config, request).await
    }

    /// Show a notification of a previously registered type
    pub async fn notify(
        &mut self,
        name: &str,
        title: &str,
        text: &str,
        options: NotifyOptions,
    ) -> Result<Response> {
        let config = options.merged(&self.config);
        let notify = &config.notify;

        let request = Request::Notify(NotifyPayload {
            application_name: config.register.application_name.clone(),
            name: name.to_string(),
            id: notify.id.clone(),
            title: title.to_string(),
            text: Some(text.to_string()).filter(|t| !t.is_empty()),
            sticky: notify.sticky.clone(),
            priority: notify.priority,
            icon: notify.icon.clone(),
            coalescing_id: notify.coalescing_id.clone(),
            callback_context: notify.callback_context.clone(),
            callback_context_type: notify.callback_context_type.clone(),
            callback_target: notify.callback_target.clone(),
        });

        self.send(&config, request).await
    }

    /// Ask the daemon to forward its notifications to this subscriber
    pub async fn subscribe(
        &mut self,
        id: &str,
        name: &str,
        options: SubscribeOptions,
    ) -> Result<Response> {
        let config = options.merged(&self.config, id, name);

        let request = Request::Subscribe(SubscribePayload {
            id: config.subscribe.id.clone(),
            name: config.subscribe.name.clone(),
            port: config.subscribe.port,
        });

        self.send(&config, request).await
    }

    /// Parsed reply to the most recent request, if it could be parsed
    pub fn last_response(&self) -> Option<&Response> {
        self.last_response.as_ref()
    }

    /// Raw text of the most recent reply
    pub fn last_raw_response(&self) -> Option<&str> {
        self.last_raw.as_deref()
    }

    async fn send(&mut self, config: &Config, request: Request) -> Result<Response> {
        self.last_raw = None;
        self.last_response = None;

        let message = config.builder().build(&request)?;
        let payload = message.encode();
        if payload.is_empty() {
            return Err(Error::EmptyRequest);
        }

        let endpoint = config.endpoint();
        tracing::info!("Sending {} to {}", message.kind, endpoint.addr());

        let raw = self.transport.exchange(&endpoint, &payload).await?;
        self.last_raw = Some(raw.clone());

        let response = Response::parse(raw)?;
        tracing::debug!(
            status = ?response.status,
            action = response.action().unwrap_or(""),
            "Daemon replied"
        );
        self.last_response = Some(response.clone());

        response.into_result()
    }
}
