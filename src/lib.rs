//! GNTP client - send Growl notifications from Rust
//!
//! This library registers applications with, sends notifications to and
//! subscribes to a remote daemon speaking the Growl Notification Transport
//! Protocol (GNTP).

pub mod cli;
pub mod commands;
pub mod common;
pub mod gntp;

// Re-export commonly used types for tests
pub use common::config::Config;
pub use common::{Error, Result};
pub use gntp::{Client, NotifyOptions, RegisterOptions, SubscribeOptions};
