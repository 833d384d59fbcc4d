//! CLI command handling
//!
//! Loads configuration, dispatches a command to the client and formats the
//! daemon's reply.

use std::path::Path;

use crate::commands::{Commands, GlobalArgs};
use crate::common::config::Config;
use crate::common::paths;
use crate::common::Result;
use crate::gntp::types::NotificationDescriptor;
use crate::gntp::{
    Client, ConnectionOverrides, NotifyOptions, RegisterOptions, Response, SubscribeOptions,
};

/// Dispatch a CLI command
pub async fn dispatch(global: GlobalArgs, command: Commands) -> Result<()> {
    let config = load_config(&global)?;
    let connection = connection_overrides(&global);

    let mut client = Client::new(config);

    let result = match command {
        Commands::Config => return print_config(client.config(), global.config.as_deref()),

        Commands::Register {
            application_name,
            icon,
            notifications,
        } => {
            let notifications = (!notifications.is_empty())
                .then(|| notifications.into_iter().map(NotificationDescriptor::new).collect());

            client
                .register(RegisterOptions {
                    application_name,
                    application_icon: icon,
                    notifications,
                    connection,
                })
                .await
        }

        Commands::Notify {
            name,
            title,
            text,
            id,
            sticky,
            priority,
            icon,
            coalescing_id,
            callback_context,
            callback_context_type,
            callback_target,
        } => {
            let options = NotifyOptions {
                id,
                sticky: sticky.then_some(true.into()),
                priority,
                icon,
                coalescing_id,
                callback_context,
                callback_context_type,
                callback_target,
                connection,
            };

            client
                .notify(&name, &title, text.as_deref().unwrap_or(""), options)
                .await
        }

        Commands::Subscribe { id, name, port } => {
            client
                .subscribe(&id, &name, SubscribeOptions { port, connection })
                .await
        }
    };

    match result {
        Ok(response) => print_response(&response, global.json),
        Err(e) => {
            if let Some(raw) = client.last_raw_response() {
                tracing::debug!("Daemon response:\n{}", raw.trim_end());
            }
            if global.json {
                if let Some(response) = client.last_response() {
                    println!("{}", serde_json::to_string_pretty(response)?);
                }
            }
            Err(e)
        }
    }
}

fn load_config(global: &GlobalArgs) -> Result<Config> {
    match &global.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn connection_overrides(global: &GlobalArgs) -> ConnectionOverrides {
    ConnectionOverrides {
        host: global.host.clone(),
        port: global.port,
        timeout_secs: global.timeout,
        password: global.password.clone(),
        hash_method: global.hash_method.clone(),
        version: None,
    }
}

fn print_response(response: &Response, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }

    match response.action() {
        Some(action) => println!("OK ({})", action),
        None => println!("OK"),
    }
    Ok(())
}

fn print_config(config: &Config, explicit: Option<&Path>) -> Result<()> {
    match explicit.map(Path::to_path_buf).or_else(paths::config_path) {
        Some(path) if path.exists() => println!("# {}", path.display()),
        Some(path) => println!("# {} (not found, using defaults)", path.display()),
        None => println!("# no config directory, using defaults"),
    }
    print!("{}", config.to_toml_string()?);
    Ok(())
}
