//! Multistream command handlers: one input fanned out to several platforms.

use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;

use restreamer_api::multistream::video_filter;
use restreamer_api::{Destination, Multistream, Orientation, Platform, RestreamerClient};

use crate::cli::{GlobalOpts, MultistreamArgs, MultistreamCommand, OrientationArg};
use crate::error::CliError;
use crate::output;

#[derive(Clone, Serialize, Tabled)]
struct PlatformRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Ingest URL")]
    ingest_url: &'static str,
}

fn orientation(arg: OrientationArg) -> Orientation {
    match arg {
        OrientationArg::Auto => Orientation::Auto,
        OrientationArg::Horizontal => Orientation::Horizontal,
        OrientationArg::Vertical => Orientation::Vertical,
        OrientationArg::Square => Orientation::Square,
    }
}

/// Parse `PLATFORM=KEY`.
fn parse_destination(raw: &str, orientation: Orientation) -> Result<Destination, CliError> {
    let invalid = |reason: String| CliError::Validation {
        field: "to".into(),
        reason,
    };
    let (platform, key) = raw
        .split_once('=')
        .ok_or_else(|| invalid(format!("expected PLATFORM=KEY, got '{raw}'")))?;
    let platform: Platform = platform
        .trim()
        .parse()
        .map_err(|_| invalid(format!("unknown platform '{}'", platform.trim())))?;
    Ok(Destination::new(platform, key.trim(), orientation)?)
}

/// Commands that never contact the daemon.
pub fn local(command: &MultistreamCommand, global: &GlobalOpts) -> Result<(), CliError> {
    match command {
        MultistreamCommand::Platforms { orientation: arg } => {
            let orientation = orientation(*arg);
            let rows: Vec<PlatformRow> = Platform::iter()
                .filter(|p| *p != Platform::Custom)
                .map(|p| PlatformRow {
                    key: p.to_string(),
                    name: p.display_name(),
                    ingest_url: p.ingest_url(orientation),
                })
                .collect();
            let out =
                output::render_list(&global.output, &rows, PlatformRow::clone, |r| r.key.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        MultistreamCommand::Filter { from, to } => {
            let filter = video_filter(orientation(*from), orientation(*to)).unwrap_or("-");
            output::print_output(filter, global.quiet);
            Ok(())
        }

        MultistreamCommand::Start { .. }
        | MultistreamCommand::Stop { .. }
        | MultistreamCommand::Status { .. } => Err(CliError::Validation {
            field: "multistream".into(),
            reason: "this action needs a daemon connection".into(),
        }),
    }
}

pub async fn handle(
    client: &mut RestreamerClient,
    args: MultistreamArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        MultistreamCommand::Start {
            input,
            destinations,
            custom,
            orientation: arg,
            reference,
        } => {
            let orientation = orientation(arg);
            let mut set = reference.map_or_else(Multistream::new, Multistream::with_reference);
            for raw in &destinations {
                set.add_destination(parse_destination(raw, orientation)?);
            }
            for url in custom {
                set.add_destination(Destination::custom(url, "", orientation)?);
            }
            set.start(client, &input).await?;
            let reference = set.reference().unwrap_or_default();
            output::print_output(reference, global.quiet);
            if !global.quiet {
                eprintln!(
                    "Multistream '{reference}' started with {} destination(s)",
                    set.destinations.len()
                );
            }
            Ok(())
        }

        MultistreamCommand::Stop { reference } => {
            Multistream::with_reference(&reference).stop(client).await?;
            if !global.quiet {
                eprintln!("Multistream '{reference}' stopped");
            }
            Ok(())
        }

        MultistreamCommand::Status { reference } => {
            let active = Multistream::with_reference(reference)
                .is_active(client)
                .await?;
            output::print_output(if active { "running" } else { "inactive" }, global.quiet);
            Ok(())
        }

        command => local(&command, global),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn destinations_parse_platform_and_key() {
        let d = parse_destination("YouTube=abc", Orientation::Auto).unwrap();
        assert_eq!(d.platform, Platform::YouTube);
        assert_eq!(d.publish_url(), "rtmp://a.rtmp.youtube.com/live2/abc");
    }

    #[test]
    fn malformed_destinations_are_usage_errors() {
        for raw in ["twitch", "myspace=k", "twitch=", "custom=k"] {
            let err = parse_destination(raw, Orientation::Auto).unwrap_err();
            assert!(matches!(err, CliError::Validation { .. }), "{raw}: {err:?}");
        }
    }
}
