#![deny(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::must_use_candidate)]

use std::path::PathBuf;

use clap::Parser;
use sendeml::{config::Settings, controller::Controller, dispatch::Dispatch, internal, logging};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION_MAJOR"),
    ".",
    env!("CARGO_PKG_VERSION_MINOR")
);

/// Send EML files to an SMTP server
#[derive(Parser, Debug)]
#[command(name = "SendEML")]
#[command(disable_version_flag = true)]
#[command(after_help = format!("json_file sample:\n{}", Settings::sample()))]
struct Cli {
    /// Settings files, processed in order
    #[arg(value_name = "json_file", required_unless_present = "version")]
    json_files: Vec<PathBuf>,

    /// Exit as soon as the last settings file is dispatched, cancelling
    /// parallel sessions still in flight
    #[arg(long)]
    no_wait: bool,

    /// Print the version
    #[arg(short = 'v', long)]
    version: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("SendEML / Version: {VERSION}");
        return Ok(());
    }

    logging::init();

    let mut pending = Dispatch::default();
    for json_file in &cli.json_files {
        let settings = match Settings::load(json_file) {
            Ok(settings) => settings,
            Err(err) => {
                internal!(level = ERROR, "error: {}: {err}", json_file.display());
                continue;
            }
        };

        pending.merge(Controller::new(settings).run().await);
    }

    if cli.no_wait {
        if !pending.is_empty() {
            internal!(
                level = WARN,
                "Not waiting for {} parallel sessions",
                pending.len()
            );
        }
    } else if !pending.is_empty() {
        internal!(
            level = DEBUG,
            "Waiting for {} parallel sessions",
            pending.len()
        );
        pending.join().await;
    }

    Ok(())
}
