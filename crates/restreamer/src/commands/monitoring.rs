//! Session, log, metric and stream command handlers.

use tabled::Tabled;

use restreamer_api::{ActiveSessions, RemoteSession, RestreamerClient};

use crate::cli::{
    GlobalOpts, MetricsArgs, MetricsCommand, SessionsArgs, SessionsCommand, StreamsArgs,
    StreamsCommand,
};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct SessionRow {
    #[tabled(rename = "Session")]
    session_id: String,
    #[tabled(rename = "Reference")]
    reference: String,
    #[tabled(rename = "Remote")]
    remote_addr: String,
    #[tabled(rename = "Sent")]
    sent: String,
    #[tabled(rename = "Received")]
    received: String,
}

impl From<&RemoteSession> for SessionRow {
    fn from(s: &RemoteSession) -> Self {
        Self {
            session_id: s.session_id.clone(),
            reference: s.reference.clone(),
            remote_addr: s.remote_addr.clone(),
            sent: output::bytes(s.bytes_sent),
            received: output::bytes(s.bytes_received),
        }
    }
}

fn active_detail(a: &ActiveSessions) -> String {
    [
        format!("Sessions:   {}", a.session_count),
        format!("Received:   {}", output::bytes(a.total_rx_bytes)),
        format!("Sent:       {}", output::bytes(a.total_tx_bytes)),
    ]
    .join("\n")
}

pub async fn sessions(
    client: &mut RestreamerClient,
    args: SessionsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SessionsCommand::List => {
            let sessions = client.get_sessions().await?;
            let out = output::render_list(
                &global.output,
                &sessions,
                |s| SessionRow::from(s),
                |s| s.session_id.clone(),
            );
            output::print_output(&out, global.quiet);
        }
        SessionsCommand::Active => {
            let active = client.get_active_sessions().await?;
            let out = output::render_single(&global.output, &active, active_detail, |a| {
                a.session_count.to_string()
            });
            output::print_output(&out, global.quiet);
        }
    }
    Ok(())
}

pub async fn logs(client: &mut RestreamerClient, global: &GlobalOpts) -> Result<(), CliError> {
    let text = client.get_logs().await?;
    output::print_output(&text, global.quiet);
    Ok(())
}

pub async fn metrics(
    client: &mut RestreamerClient,
    args: MetricsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = match args.command {
        MetricsCommand::List => {
            let description = client.get_metrics_list().await?;
            output::render_value(&global.output, &description)
        }
        MetricsCommand::Query { query } => {
            let query = util::read_json_input(&query)?;
            let result = client.query_metrics(&query).await?;
            output::render_value(&global.output, &result)
        }
        // Prometheus exposition format is already text; no re-rendering.
        MetricsCommand::Prometheus => client.get_prometheus_metrics().await?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn streams(
    client: &mut RestreamerClient,
    args: StreamsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let streams = match args.command {
        StreamsCommand::Rtmp => client.get_rtmp_streams().await?,
        StreamsCommand::Srt => client.get_srt_streams().await?,
    };
    output::print_output(&output::render_value(&global.output, &streams), global.quiet);
    Ok(())
}
