//! Growl Notification Transport Protocol (GNTP) implementation
//!
//! This module implements the client side of GNTP: building REGISTER,
//! NOTIFY and SUBSCRIBE requests, exchanging them with a daemon over TCP
//! and interpreting the reply.

pub mod auth;
pub mod boolean;
pub mod client;
pub mod message;
pub mod options;
pub mod response;
pub mod transport;
pub mod types;

pub use client::Client;
pub use options::{ConnectionOverrides, NotifyOptions, RegisterOptions, SubscribeOptions};
pub use response::{Response, Status};
pub use types::*;
