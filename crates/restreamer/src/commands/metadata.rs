//! Metadata command handlers.

use restreamer_api::RestreamerClient;

use crate::cli::{GlobalOpts, MetadataArgs, MetadataCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    client: &mut RestreamerClient,
    args: MetadataArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        MetadataCommand::Get { key, process } => {
            let value = match process.as_deref() {
                Some(pid) => client.get_process_metadata(pid, &key).await?,
                None => client.get_metadata(&key).await?,
            };
            output::print_output(&output::render_value(&global.output, &value), global.quiet);
            Ok(())
        }

        MetadataCommand::Set {
            key,
            process,
            value,
        } => {
            let value = util::read_json_input(&value)?;
            match process.as_deref() {
                Some(pid) => client.set_process_metadata(pid, &key, &value).await?,
                None => client.set_metadata(&key, &value).await?,
            }
            if !global.quiet {
                eprintln!("Metadata '{key}' stored");
            }
            Ok(())
        }
    }
}
