//! Filesystem command handlers.

use tabled::Tabled;

use restreamer_api::{FsEntry, RestreamerClient};

use crate::cli::{FsArgs, FsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct FileRow {
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Modified")]
    modified: String,
}

impl From<&FsEntry> for FileRow {
    fn from(f: &FsEntry) -> Self {
        let path = if f.path.is_empty() {
            f.name.clone()
        } else {
            f.path.clone()
        };
        Self {
            path: if f.is_directory { format!("{path}/") } else { path },
            size: output::bytes(f.size),
            modified: output::timestamp(f.modified),
        }
    }
}

pub async fn handle(
    client: &mut RestreamerClient,
    args: FsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        FsCommand::Filesystems => {
            let storages = client.list_filesystems().await?;
            output::print_output(&output::render_value(&global.output, &storages), global.quiet);
            Ok(())
        }

        FsCommand::List { storage, glob } => {
            let files = client.list_files(&storage, glob.as_deref()).await?;
            let out = output::render_list(
                &global.output,
                &files,
                |f| FileRow::from(f),
                |f| f.path.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FsCommand::Download { storage, path, out } => {
            let data = client.download_file(&storage, &path).await?;
            util::write_bytes(out.as_deref(), &data)?;
            if let Some(dest) = out.filter(|_| !global.quiet) {
                eprintln!("Downloaded {storage}:{path} to {}", dest.display());
            }
            Ok(())
        }

        FsCommand::Upload {
            storage,
            path,
            file,
        } => {
            let data = std::fs::read(&file)?;
            let size = u64::try_from(data.len()).unwrap_or(u64::MAX);
            client.upload_file(&storage, &path, data).await?;
            if !global.quiet {
                eprintln!("Uploaded {} to {storage}:{path}", output::bytes(size));
            }
            Ok(())
        }

        FsCommand::Delete { storage, path } => {
            if !util::confirm(
                &format!("Delete {storage}:{path}?"),
                global.yes,
                "fs delete",
            )? {
                return Ok(());
            }
            client.delete_file(&storage, &path).await?;
            if !global.quiet {
                eprintln!("Deleted {storage}:{path}");
            }
            Ok(())
        }
    }
}
