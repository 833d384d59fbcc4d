//! CLI command definitions
//!
//! Defines the clap commands for the gntp CLI.

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Options shared by every command
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Configuration file (default: platform config dir, or $GNTP_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Daemon host
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Daemon port
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Password for the auth hash; empty sends unauthenticated requests
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Hash algorithm: md5, sha1, sha256 or sha512
    #[arg(long = "hash", global = true)]
    pub hash_method: Option<String>,

    /// Connect timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Print the daemon response as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register the application and its notification types
    Register {
        /// Application name (default: from config)
        #[arg(long = "app")]
        application_name: Option<String>,

        /// Application icon URL
        #[arg(long)]
        icon: Option<String>,

        /// Notification type to register; can be specified multiple times:
        /// --notification build --notification deploy
        #[arg(long = "notification", short = 'n')]
        notifications: Vec<String>,
    },

    /// Send a notification
    Notify {
        /// Registered notification type
        name: String,

        /// Title to display
        title: String,

        /// Body text
        text: Option<String>,

        /// Unique id for this notification
        #[arg(long)]
        id: Option<String>,

        /// Keep the notification on screen until dismissed
        #[arg(long)]
        sticky: bool,

        /// Priority from -2 (very low) to 2 (emergency)
        #[arg(long, allow_negative_numbers = true)]
        priority: Option<i32>,

        /// Icon URL
        #[arg(long)]
        icon: Option<String>,

        /// Replace an earlier notification with the same id
        #[arg(long)]
        coalescing_id: Option<String>,

        /// Callback context (only sent together with --coalescing-id)
        #[arg(long)]
        callback_context: Option<String>,

        /// Callback context type
        #[arg(long)]
        callback_context_type: Option<String>,

        /// URL to open when the notification is clicked
        #[arg(long)]
        callback_target: Option<String>,
    },

    /// Subscribe to notifications forwarded by the daemon
    Subscribe {
        /// Unique subscriber id (UUID)
        id: String,

        /// Friendly name of this machine
        name: String,

        /// Port this machine listens on
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show the effective configuration
    Config,
}
