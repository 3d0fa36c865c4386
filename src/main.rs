use clap::Parser;
use mirra::commands::sync;
use mirra::config::Cli;
use mirra::ui::console::{self, MessageKind};
use mirra::{MirraError, RunOutcome, SyncConfig};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let beep = cli.beep;

    let success = match execute(cli) {
        Ok(_) => true,
        Err(err) => {
            report_error(&err);
            false
        }
    };

    console::print_outcome(success);
    if beep {
        console::beep(success);
    }

    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

fn execute(cli: Cli) -> anyhow::Result<RunOutcome> {
    // Convert CLI args to config - this validates immediately
    let config = SyncConfig::try_from(cli)?;
    Ok(sync::run(&config))
}

fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<MirraError>() {
        Some(error) => {
            let (message, hint) = sync::humanize_error(error);
            console::print_tagged(MessageKind::Error, &message);
            if let Some(hint) = hint {
                console::print_tagged(MessageKind::Error, hint);
            }
        }
        None => console::print_tagged(MessageKind::Error, &format!("{:#}", err)),
    }
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the verbosity flag.
fn init_tracing(verbose: bool) {
    let default = if verbose { "mirra=debug" } else { "mirra=warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
