//! Command dispatch: bridges CLI args -> client calls -> output formatting.

pub mod config_cmd;
pub mod fs;
pub mod metadata;
pub mod monitoring;
pub mod multistream;
pub mod outputs;
pub mod playout;
pub mod processes;
pub mod services;
pub mod system;
pub mod util;

use restreamer_api::RestreamerClient;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a daemon-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: &mut RestreamerClient,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Ping => system::ping(client, global).await,
        Command::Info => system::info(client, global).await,
        Command::Login => system::login(client, global).await,
        Command::Processes(args) => processes::handle(client, args, global).await,
        Command::Outputs(args) => outputs::handle(client, args, global).await,
        Command::Multistream(args) => multistream::handle(client, args, global).await,
        Command::Metadata(args) => metadata::handle(client, args, global).await,
        Command::Playout(args) => playout::handle(client, args, global).await,
        Command::Fs(args) => fs::handle(client, args, global).await,
        Command::Sessions(args) => monitoring::sessions(client, args, global).await,
        Command::Logs => monitoring::logs(client, global).await,
        Command::Metrics(args) => monitoring::metrics(client, args, global).await,
        Command::Streams(args) => monitoring::streams(client, args, global).await,
        Command::Skills(args) => system::skills(client, args, global).await,
        Command::ServerConfig(args) => system::server_config(client, args, global).await,
        // Handled before a client is built
        Command::Config(_) | Command::Services(_) | Command::Completions(_) => unreachable!(),
    }
}
