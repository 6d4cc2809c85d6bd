//! Pipe transport entry point
//!
//! The MTA hands veil one message on stdin along with its envelope:
//!
//! ```text
//! veil  unix  -  n  n  -  -  pipe
//!   flags=Rq user=veil argv=/usr/bin/veil --from ${sender} --to ${recipient} --size ${size}
//! ```
//!
//! Exit status follows `sysexits.h`: a rejected message exits with
//! `EX_NOPERM` and the reason on stdout, an unusable configuration with
//! `EX_CONFIG`, and everything else with success.

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use clap::Parser;
use veil::{
    DispatchError, Dispatcher, Outcome, PipedMessage,
    common::{Config, logging},
    relay::MailjetRelay,
};

const EX_NOPERM: u8 = 77;
const EX_CONFIG: u8 = 78;

/// Relay one message through a reversible alias
#[derive(Parser, Debug)]
#[command(name = "veil")]
#[command(about = "Relay mail through reversible aliases", long_about = None)]
#[command(version)]
struct Cli {
    /// Envelope sender
    #[arg(short, long)]
    from: String,

    /// Envelope recipient
    #[arg(short, long)]
    to: String,

    /// Size of the message in bytes, if known
    #[arg(short, long)]
    size: Option<usize>,

    /// RON configuration file; the environment is read when not given
    #[arg(short, long, env = "VEIL_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("veil: {err:#}");
            return ExitCode::from(EX_CONFIG);
        }
    };

    logging::init(config.enable_logs);

    match run(cli, &config).await {
        Ok(Some(reason)) => {
            println!("{reason}");
            ExitCode::from(EX_NOPERM)
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("veil: {err:#}");

            if err
                .downcast_ref::<DispatchError>()
                .is_some_and(DispatchError::is_configuration)
            {
                ExitCode::from(EX_CONFIG)
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}

/// Dispatch the message on stdin, returning the rejection reason if any.
async fn run(cli: Cli, config: &Config) -> anyhow::Result<Option<String>> {
    let relay = MailjetRelay::new(&config.relay).map_err(DispatchError::from)?;
    let dispatcher = Dispatcher::new(config, Arc::new(relay))?;

    let mut message =
        PipedMessage::stdin(cli.from, cli.to, config.sendmail.clone()).with_size(cli.size);

    match dispatcher.dispatch(&mut message).await? {
        Outcome::Rejected { reason } => Ok(Some(reason)),
        Outcome::Relayed { .. } | Outcome::Forwarded { .. } | Outcome::Dropped(_) => Ok(None),
    }
}
