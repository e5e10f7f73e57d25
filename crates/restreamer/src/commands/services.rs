//! Streaming service catalog handlers. Purely local: nothing here talks to
//! the daemon.

use tabled::Tabled;

use restreamer_config::{ServiceCatalog, StreamingService};

use crate::cli::{GlobalOpts, ServicesArgs, ServicesCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Common")]
    common: String,
    #[tabled(rename = "Servers")]
    servers: usize,
    #[tabled(rename = "Codecs")]
    codecs: String,
}

impl From<&StreamingService> for ServiceRow {
    fn from(s: &StreamingService) -> Self {
        Self {
            name: s.name.clone(),
            common: if s.common { "yes".into() } else { String::new() },
            servers: s.servers.len(),
            codecs: if s.supported_video_codecs.is_empty() {
                "-".into()
            } else {
                s.supported_video_codecs.join(", ")
            },
        }
    }
}

fn detail(s: &StreamingService) -> String {
    let mut lines = vec![format!("Service:    {}", s.name)];
    if let Some(link) = &s.stream_key_link {
        lines.push(format!("Stream key: {link}"));
    }
    if !s.supported_video_codecs.is_empty() {
        lines.push(format!("Codecs:     {}", s.supported_video_codecs.join(", ")));
    }
    lines.push("Servers:".into());
    let width = s.servers.iter().map(|srv| srv.name.len()).max().unwrap_or(0);
    lines.extend(
        s.servers
            .iter()
            .map(|srv| format!("  {:<width$}  {}", srv.name, srv.url)),
    );
    lines.join("\n")
}

pub fn handle(args: &ServicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let catalog = ServiceCatalog::load(&args.file)?;
    tracing::debug!(services = catalog.len(), "loaded service catalog");

    match &args.command {
        ServicesCommand::List { common } => {
            let services: Vec<&StreamingService> = catalog
                .services()
                .iter()
                .filter(|s| !*common || s.common)
                .collect();
            let out = output::render_list(
                &global.output,
                &services,
                |s| ServiceRow::from(*s),
                |s| s.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ServicesCommand::Show { name } => {
            let service = catalog.get(name).ok_or_else(|| CliError::Validation {
                field: "service".into(),
                reason: format!("no service named '{name}' in {}", args.file.display()),
            })?;
            let out =
                output::render_single(&global.output, service, detail, |s| s.name.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
