//! RP1210 Driver Inspector
//!
//! Lists the RP1210 vendor drivers installed on this machine with their
//! devices and protocols, and reports drivers that failed to load.

mod report;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rp_catalog::CatalogBuilder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Inspector command line arguments
#[derive(Parser, Debug)]
#[command(name = "rp-inspect", version)]
#[command(about = "Inspect installed RP1210 drivers, devices and protocols")]
struct Args {
    /// RP1210 root directory, overriding the config file and RP1210_HOME
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Discovery config file (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List installed drivers and any that failed to load
    List,
    /// Show each device with the protocols it supports
    Devices {
        /// Only show devices of this driver
        #[arg(long)]
        driver: Option<String>,
    },
    /// Show every device that supports a protocol
    Protocol {
        /// Protocol string, e.g. J1939
        name: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rp_inspect=info,rp_catalog=info,rp_ini=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = settings::resolve(args.config.as_deref(), args.root)?;

    let catalog = CatalogBuilder::with_config(config)
        .discover()
        .context("RP1210 driver discovery failed")?;

    let output = match &args.command {
        Command::List => report::render_drivers(&catalog, args.json)?,
        Command::Devices { driver } => report::render_devices(&catalog, driver.as_deref(), args.json)?,
        Command::Protocol { name } => report::render_protocol(&catalog, name, args.json)?,
    };
    println!("{output}");

    Ok(())
}
