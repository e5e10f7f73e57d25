//! Process command handlers.

use std::time::Duration;

use tabled::Tabled;

use restreamer_api::{
    LogEntry, NewProcess, ProbeInfo, Process, ProcessState, RestreamerClient, StreamInfo,
};

use crate::cli::{GlobalOpts, ProcessesArgs, ProcessesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProcessRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Reference")]
    reference: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Uptime")]
    uptime: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "Memory")]
    memory: String,
}

impl ProcessRow {
    fn new(p: &Process, color: bool) -> Self {
        Self {
            id: p.id.clone(),
            reference: p.reference.clone(),
            state: output::paint_state(&p.state, color),
            uptime: output::uptime(p.uptime),
            cpu: format!("{:.1}%", p.cpu_usage),
            memory: output::bytes(p.memory),
        }
    }
}

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "Time")]
    timestamp: String,
    #[tabled(rename = "Level")]
    level: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl From<&LogEntry> for LogRow {
    fn from(l: &LogEntry) -> Self {
        Self {
            timestamp: l.timestamp.clone(),
            level: l.level.clone(),
            message: l.message.clone(),
        }
    }
}

// ── Detail views ────────────────────────────────────────────────────

fn detail(p: &Process) -> String {
    [
        format!("ID:         {}", p.id),
        format!("Reference:  {}", p.reference),
        format!("State:      {}", p.state),
        format!("Uptime:     {}", output::uptime(p.uptime)),
        format!("CPU:        {:.1}%", p.cpu_usage),
        format!("Memory:     {}", output::bytes(p.memory)),
        format!("Command:    {}", p.command),
    ]
    .join("\n")
}

fn state_detail(s: &ProcessState) -> String {
    [
        format!("Order:      {}", s.order),
        format!("Running:    {}", s.is_running),
        format!("Progress:   {:.1}%", s.progress),
        format!("Frames:     {} ({} dropped)", s.frames, s.dropped_frames),
        format!("FPS:        {:.2}", s.fps),
        format!("Bitrate:    {} kbit/s", s.current_bitrate),
        format!("Written:    {}", output::bytes(s.bytes_written)),
        format!("Packets:    {}", s.packets_sent),
    ]
    .join("\n")
}

fn micros(us: i64) -> String {
    match u64::try_from(us) {
        Ok(us) if us > 0 => humantime::format_duration(Duration::from_micros(us)).to_string(),
        _ => "-".into(),
    }
}

fn stream_line(index: usize, s: &StreamInfo) -> String {
    let mut line = format!("  #{index} {:<9} {}", s.codec_type, s.codec_name);
    if s.width > 0 && s.height > 0 {
        line.push_str(&format!(" {}x{}", s.width, s.height));
    }
    if let Some(fps) = s.fps() {
        line.push_str(&format!(" @ {fps:.2} fps"));
    }
    if s.sample_rate > 0 {
        line.push_str(&format!(" {} Hz, {} ch", s.sample_rate, s.channels));
    }
    if s.bitrate > 0 {
        line.push_str(&format!(" {} kbit/s", s.bitrate / 1000));
    }
    line
}

fn probe_detail(p: &ProbeInfo) -> String {
    let mut lines = vec![
        format!("Format:     {} ({})", p.format_name, p.format_long_name),
        format!("Duration:   {}", micros(p.duration)),
        format!("Size:       {}", output::bytes(p.size)),
        format!("Bitrate:    {} kbit/s", p.bitrate / 1000),
        format!("Streams:    {}", p.streams.len()),
    ];
    lines.extend(p.streams.iter().enumerate().map(|(i, s)| stream_line(i, s)));
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    client: &mut RestreamerClient,
    args: ProcessesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        ProcessesCommand::List => {
            let processes = client.get_processes().await?;
            let out = output::render_list(
                &global.output,
                &processes,
                |p| ProcessRow::new(p, color),
                |p| p.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProcessesCommand::Get { id } => {
            let process = client.get_process(&id).await?;
            let out = output::render_single(&global.output, &process, detail, |p| p.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProcessesCommand::Create {
            reference,
            input,
            outputs,
            video_filter,
        } => {
            let params = NewProcess {
                reference: reference.clone(),
                input_url: input,
                output_urls: outputs,
                video_filter,
            };
            client.create_process(&params).await?;
            if !global.quiet {
                eprintln!(
                    "Process '{reference}' created with {} destination(s)",
                    params.output_urls.len()
                );
            }
            Ok(())
        }

        ProcessesCommand::Update { id, config } => {
            let body = util::read_json_input(&config)?;
            client.update_process(&id, &body).await?;
            if !global.quiet {
                eprintln!("Process '{id}' updated");
            }
            Ok(())
        }

        ProcessesCommand::Delete { id } => {
            if !util::confirm(
                &format!("Delete process '{id}'? It will stop streaming."),
                global.yes,
                "processes delete",
            )? {
                return Ok(());
            }
            client.delete_process(&id).await?;
            if !global.quiet {
                eprintln!("Process '{id}' deleted");
            }
            Ok(())
        }

        ProcessesCommand::Start { id } => {
            client.start_process(&id).await?;
            if !global.quiet {
                eprintln!("Process '{id}' starting");
            }
            Ok(())
        }

        ProcessesCommand::Stop { id } => {
            client.stop_process(&id).await?;
            if !global.quiet {
                eprintln!("Process '{id}' stopping");
            }
            Ok(())
        }

        ProcessesCommand::Restart { id } => {
            client.restart_process(&id).await?;
            if !global.quiet {
                eprintln!("Process '{id}' restarting");
            }
            Ok(())
        }

        ProcessesCommand::State { id } => {
            let state = client.get_process_state(&id).await?;
            let out = output::render_single(&global.output, &state, state_detail, |s| {
                s.order.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProcessesCommand::Probe { id } => {
            let probe = client.probe_input(&id).await?;
            let out = output::render_single(&global.output, &probe, probe_detail, |p| {
                p.format_name.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProcessesCommand::Logs { id } => {
            let logs = client.get_process_logs(&id).await?;
            let out = output::render_list(&global.output, &logs, |l| LogRow::from(l), |l| {
                format!("{} {}", l.timestamp, l.message)
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProcessesCommand::Config { id } => {
            let config = client.get_process_config(&id).await?;
            let out = output::render_value(&global.output, &config);
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
