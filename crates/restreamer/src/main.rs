mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Local-only commands never touch the daemon
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),
        Command::Services(args) => commands::services::handle(&args, &cli.global),
        Command::Multistream(args) if args.command.is_local() => {
            commands::multistream::local(&args.command, &cli.global)
        }

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "restreamer", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let (mut client, target) = config::resolve_client(&cli.global)?;

            tracing::debug!(command = ?cmd, url = %target.url, "dispatching command");
            commands::dispatch(cmd, &mut client, &cli.global)
                .await
                .map_err(|e| e.with_context(&target.url, &target.profile))
        }
    }
}
