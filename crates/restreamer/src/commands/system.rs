//! Daemon-level command handlers: health, identity, login, skills and
//! daemon configuration.

use std::fmt::Write as _;

use restreamer_api::{ApiInfo, CodecKind, RestreamerClient, Skills};

use crate::cli::{
    CodecKindArg, GlobalOpts, OutputFormat, ServerConfigArgs, ServerConfigCommand, SkillsArgs,
    SkillsCommand,
};
use crate::error::CliError;
use crate::output;

use super::util;

impl From<CodecKindArg> for CodecKind {
    fn from(kind: CodecKindArg) -> Self {
        match kind {
            CodecKindArg::Audio => Self::Audio,
            CodecKindArg::Video => Self::Video,
            CodecKindArg::Subtitle => Self::Subtitle,
        }
    }
}

fn info_detail(i: &ApiInfo) -> String {
    [
        format!("Name:       {}", i.name),
        format!("Version:    {}", i.version),
        format!("Built:      {}", i.build_date),
        format!("Commit:     {}", i.commit),
    ]
    .join("\n")
}

fn skills_detail(s: &Skills) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "FFmpeg:     {}", s.ffmpeg.version);
    let _ = writeln!(out, "Compiler:   {}", s.ffmpeg.compiler);
    for lib in &s.ffmpeg.libs {
        let _ = writeln!(out, "  {:<14} {}", lib.name, lib.linked);
    }
    let _ = writeln!(
        out,
        "Codecs:     {} video, {} audio, {} subtitle",
        s.codecs.video.len(),
        s.codecs.audio.len(),
        s.codecs.subtitle.len()
    );
    let _ = writeln!(out, "Filters:    {}", s.filters.len());
    let _ = writeln!(
        out,
        "Formats:    {} demuxers, {} muxers",
        s.formats.demuxers.len(),
        s.formats.muxers.len()
    );
    let _ = writeln!(
        out,
        "Protocols:  {} input, {} output",
        s.protocols.input.len(),
        s.protocols.output.len()
    );
    let hwaccels: Vec<&str> = s.hwaccels.iter().map(|h| h.id.as_str()).collect();
    let _ = write!(
        out,
        "HW accel:   {}",
        if hwaccels.is_empty() {
            "-".into()
        } else {
            hwaccels.join(", ")
        }
    );
    out
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn ping(client: &mut RestreamerClient, global: &GlobalOpts) -> Result<(), CliError> {
    client.ping().await?;
    output::print_output("pong", global.quiet);
    Ok(())
}

pub async fn info(client: &mut RestreamerClient, global: &GlobalOpts) -> Result<(), CliError> {
    let info = client.get_info().await?;
    let out = output::render_single(&global.output, &info, info_detail, |i| i.version.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn login(client: &mut RestreamerClient, global: &GlobalOpts) -> Result<(), CliError> {
    client.force_login().await?;
    if !global.quiet {
        match client.token_expires_at() {
            Some(expiry) => eprintln!(
                "Logged in to {}, token valid until {}",
                client.base_url(),
                expiry
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M:%S")
            ),
            None => eprintln!("Logged in to {}", client.base_url()),
        }
    }
    Ok(())
}

pub async fn skills(
    client: &mut RestreamerClient,
    args: SkillsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SkillsCommand::Show => {
            let skills = client.get_skills().await?;
            let out = output::render_single(&global.output, &skills, skills_detail, |s| {
                s.ffmpeg.version.clone()
            });
            output::print_output(&out, global.quiet);
        }
        SkillsCommand::Reload => {
            client.reload_skills().await?;
            if !global.quiet {
                eprintln!("FFmpeg capabilities re-detected");
            }
        }
        SkillsCommand::Encoders { kind } => {
            let skills = client.get_skills().await?;
            let encoders: Vec<&str> = skills.encoders(kind.into()).collect();
            let out = match global.output {
                OutputFormat::Json => output::render_json_pretty(&encoders),
                OutputFormat::JsonCompact => output::render_json_compact(&encoders),
                OutputFormat::Yaml => output::render_yaml(&encoders),
                OutputFormat::Table | OutputFormat::Plain => encoders.join("\n"),
            };
            output::print_output(&out, global.quiet);
        }
    }
    Ok(())
}

pub async fn server_config(
    client: &mut RestreamerClient,
    args: ServerConfigArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ServerConfigCommand::Get => {
            let config = client.get_config().await?;
            output::print_output(&output::render_value(&global.output, &config), global.quiet);
        }
        ServerConfigCommand::Set { config, reload } => {
            let config = util::read_json_input(&config)?;
            if !util::confirm(
                "Replace the daemon configuration?",
                global.yes,
                "server-config set",
            )? {
                return Ok(());
            }
            client.set_config(&config).await?;
            if reload {
                client.reload_config().await?;
            }
            if !global.quiet {
                eprintln!(
                    "Daemon configuration stored{}",
                    if reload { " and reloaded" } else { "" }
                );
            }
        }
        ServerConfigCommand::Reload => {
            client.reload_config().await?;
            if !global.quiet {
                eprintln!("Daemon configuration reloaded");
            }
        }
    }
    Ok(())
}
