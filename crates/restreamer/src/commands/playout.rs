//! Playout command handlers.

use restreamer_api::{PlayoutStatus, RestreamerClient};

use crate::cli::{GlobalOpts, PlayoutArgs, PlayoutCommand};
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(s: &PlayoutStatus) -> String {
    [
        format!("Input:      {}", s.input_id),
        format!("URL:        {}", s.url),
        format!("State:      {}", s.state),
        format!("Connected:  {}", s.is_connected),
        format!("Received:   {}", output::bytes(s.bytes_received)),
        format!("Bitrate:    {} kbit/s", s.bitrate),
    ]
    .join("\n")
}

pub async fn handle(
    client: &mut RestreamerClient,
    args: PlayoutArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PlayoutCommand::Status { process, input } => {
            let status = client.get_playout_status(&process, &input).await?;
            let out = output::render_single(&global.output, &status, detail, |s| s.state.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PlayoutCommand::Switch {
            process,
            input,
            url,
        } => {
            client.switch_input_stream(&process, &input, &url).await?;
            if !global.quiet {
                eprintln!("Input '{input}' switched to {url}");
            }
            Ok(())
        }

        PlayoutCommand::Reopen { process, input } => {
            client.reopen_input(&process, &input).await?;
            if !global.quiet {
                eprintln!("Input '{input}' reopened");
            }
            Ok(())
        }

        PlayoutCommand::Keyframe {
            process,
            input,
            name,
            out,
        } => {
            let image = client.get_keyframe(&process, &input, &name).await?;
            util::write_bytes(out.as_deref(), &image)?;
            if let Some(path) = out.filter(|_| !global.quiet) {
                eprintln!(
                    "Saved {} keyframe to {}",
                    output::bytes(u64::try_from(image.len()).unwrap_or(u64::MAX)),
                    path.display()
                );
            }
            Ok(())
        }
    }
}
