//! Typed per-call overrides
//!
//! Every field is optional; a set field wins over the stored configuration.
//! Applying options always produces a new [`Config`], the client's base
//! configuration is never touched.

use crate::common::config::Config;

use super::types::{BoolValue, NotificationDescriptor, DEFAULT_PORT};

/// Overrides for the `[gntp]` section, accepted by every operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub timeout_secs: Option<u64>,
    pub password: Option<String>,
    pub hash_method: Option<String>,
    pub version: Option<String>,
}

impl ConnectionOverrides {
    fn apply(&self, config: &mut Config) {
        let gntp = &mut config.gntp;
        if let Some(host) = &self.host {
            gntp.host = host.clone();
        }
        if let Some(port) = self.port {
            gntp.port = port;
        }
        if let Some(secs) = self.timeout_secs {
            gntp.timeout_secs = secs;
        }
        if let Some(password) = &self.password {
            gntp.password = password.clone();
        }
        if let Some(method) = &self.hash_method {
            gntp.hash_method = method.clone();
        }
        if let Some(version) = &self.version {
            gntp.version = version.clone();
        }
    }
}

/// REGISTER overrides
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterOptions {
    pub application_name: Option<String>,
    pub application_icon: Option<String>,
    /// Replaces the configured notification list entirely
    pub notifications: Option<Vec<NotificationDescriptor>>,
    pub connection: ConnectionOverrides,
}

impl RegisterOptions {
    pub fn notifications(mut self, notifications: Vec<NotificationDescriptor>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    pub fn merged(&self, base: &Config) -> Config {
        let mut config = base.clone();
        self.connection.apply(&mut config);

        let register = &mut config.register;
        if let Some(name) = &self.application_name {
            register.application_name = name.clone();
        }
        if let Some(icon) = &self.application_icon {
            register.application_icon = Some(icon.clone());
        }
        if let Some(notifications) = &self.notifications {
            register.notifications = Some(notifications.clone());
        }

        config
    }
}

/// NOTIFY overrides
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotifyOptions {
    pub id: Option<String>,
    pub sticky: Option<BoolValue>,
    pub priority: Option<i32>,
    pub icon: Option<String>,
    pub coalescing_id: Option<String>,
    pub callback_context: Option<String>,
    pub callback_context_type: Option<String>,
    pub callback_target: Option<String>,
    pub connection: ConnectionOverrides,
}

impl NotifyOptions {
    pub fn sticky(mut self, sticky: impl Into<BoolValue>) -> Self {
        self.sticky = Some(sticky.into());
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn merged(&self, base: &Config) -> Config {
        let mut config = base.clone();
        self.connection.apply(&mut config);

        let notify = &mut config.notify;
        let replace = |slot: &mut Option<String>, value: &Option<String>| {
            if value.is_some() {
                slot.clone_from(value);
            }
        };
        replace(&mut notify.id, &self.id);
        replace(&mut notify.icon, &self.icon);
        replace(&mut notify.coalescing_id, &self.coalescing_id);
        replace(&mut notify.callback_context, &self.callback_context);
        replace(&mut notify.callback_context_type, &self.callback_context_type);
        replace(&mut notify.callback_target, &self.callback_target);

        if let Some(sticky) = &self.sticky {
            notify.sticky = sticky.clone();
        }
        if let Some(priority) = self.priority {
            notify.priority = priority;
        }

        config
    }
}

/// SUBSCRIBE overrides
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscribeOptions {
    /// Listening port; unset or the well-known port keeps the configured one
    pub port: Option<u16>,
    pub connection: ConnectionOverrides,
}

impl SubscribeOptions {
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn merged(&self, base: &Config, id: &str, name: &str) -> Config {
        let mut config = base.clone();
        self.connection.apply(&mut config);

        let subscribe = &mut config.subscribe;
        subscribe.id = id.to_string();
        subscribe.name = name.to_string();
        if let Some(port) = self.port.filter(|p| *p != DEFAULT_PORT) {
            subscribe.port = port;
        }

        config
    }
}
