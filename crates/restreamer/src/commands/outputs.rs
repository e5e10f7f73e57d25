//! Dynamic output and encoding command handlers.

use tabled::Tabled;

use restreamer_api::{EncodingParams, OutputInfo, RestreamerClient};

use crate::cli::{EncodingOpts, GlobalOpts, OutputsArgs, OutputsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct OutputRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Video filter")]
    video_filter: String,
}

impl From<&OutputInfo> for OutputRow {
    fn from(o: &OutputInfo) -> Self {
        Self {
            id: o.id.clone(),
            url: o.url.clone().unwrap_or_else(|| "-".into()),
            video_filter: o.video_filter.clone().unwrap_or_else(|| "-".into()),
        }
    }
}

fn or_unchanged(value: u32, unit: &str) -> String {
    if value == 0 {
        "-".into()
    } else {
        format!("{value}{unit}")
    }
}

fn encoding_detail(e: &EncodingParams) -> String {
    let resolution = if e.width > 0 && e.height > 0 {
        format!("{}x{}", e.width, e.height)
    } else {
        "-".into()
    };
    let fps = if e.fps_num > 0 && e.fps_den > 0 {
        format!("{}/{}", e.fps_num, e.fps_den)
    } else {
        "-".into()
    };
    [
        format!("Video bitrate:  {}", or_unchanged(e.video_bitrate_kbps, " kbit/s")),
        format!("Audio bitrate:  {}", or_unchanged(e.audio_bitrate_kbps, " kbit/s")),
        format!("Resolution:     {resolution}"),
        format!("Frame rate:     {fps}"),
        format!("Preset:         {}", e.preset.as_deref().unwrap_or("-")),
        format!("Profile:        {}", e.profile.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

/// Turn the flags into an update where every unset flag means "keep".
fn encoding_from_opts(opts: EncodingOpts) -> Result<EncodingParams, CliError> {
    let (width, height) = opts
        .resolution
        .as_deref()
        .map(util::parse_resolution)
        .transpose()?
        .unwrap_or_default();
    let (fps_num, fps_den) = opts
        .fps
        .as_deref()
        .map(util::parse_fps)
        .transpose()?
        .unwrap_or_default();

    Ok(EncodingParams {
        video_bitrate_kbps: opts.video_bitrate.unwrap_or_default(),
        audio_bitrate_kbps: opts.audio_bitrate.unwrap_or_default(),
        width,
        height,
        fps_num,
        fps_den,
        preset: opts.preset,
        profile: opts.profile,
    })
}

pub async fn handle(
    client: &mut RestreamerClient,
    args: OutputsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        OutputsCommand::List { process } => {
            let outputs = client.get_process_outputs(&process).await?;
            let out = output::render_list(
                &global.output,
                &outputs,
                |o| OutputRow::from(o),
                |o| o.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        OutputsCommand::Add {
            process,
            output: output_id,
            url,
            video_filter,
        } => {
            client
                .add_process_output(&process, &output_id, &url, video_filter.as_deref())
                .await?;
            if !global.quiet {
                eprintln!("Output '{output_id}' added to '{process}'");
            }
            Ok(())
        }

        OutputsCommand::Update {
            process,
            output: output_id,
            url,
            video_filter,
        } => {
            if url.is_none() && video_filter.is_none() {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "pass --url and/or --video-filter".into(),
                });
            }
            client
                .update_process_output(&process, &output_id, url.as_deref(), video_filter.as_deref())
                .await?;
            if !global.quiet {
                eprintln!("Output '{output_id}' updated");
            }
            Ok(())
        }

        OutputsCommand::Remove {
            process,
            output: output_id,
        } => {
            if !util::confirm(
                &format!("Remove output '{output_id}' from '{process}'?"),
                global.yes,
                "outputs remove",
            )? {
                return Ok(());
            }
            client.remove_process_output(&process, &output_id).await?;
            if !global.quiet {
                eprintln!("Output '{output_id}' removed");
            }
            Ok(())
        }

        OutputsCommand::EncodingGet {
            process,
            output: output_id,
        } => {
            let encoding = client.get_output_encoding(&process, &output_id).await?;
            let out = output::render_single(&global.output, &encoding, encoding_detail, |e| {
                e.video_bitrate_kbps.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        OutputsCommand::EncodingSet {
            process,
            output: output_id,
            encoding,
        } => {
            let params = encoding_from_opts(encoding)?;
            if params.is_empty() {
                return Err(CliError::Validation {
                    field: "encoding".into(),
                    reason: "nothing to change, pass at least one encoding flag".into(),
                });
            }
            client
                .update_output_encoding(&process, &output_id, &params)
                .await?;
            if !global.quiet {
                eprintln!("Encoding of '{output_id}' updated");
            }
            Ok(())
        }
    }
}
