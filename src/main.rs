//! gntp - send Growl notifications from the command line
//!
//! Registers applications, sends notifications and subscribes to a
//! daemon speaking the Growl Notification Transport Protocol.

use clap::Parser;
use gntp::cli;
use gntp::commands::{Commands, GlobalArgs};
use gntp::common::logging;

#[derive(Parser)]
#[command(name = "gntp", about = "Growl Notification Transport Protocol client")]
#[command(version, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_cli(cli.global.verbose);

    if let Err(e) = cli::dispatch(cli.global, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
