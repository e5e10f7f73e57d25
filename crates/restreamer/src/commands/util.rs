//! Shared helpers for command handlers.

use std::io::{IsTerminal, Write};
use std::path::Path;

use serde_json::Value;

use crate::cli::JsonInput;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so the operation is refused.
pub fn confirm(message: &str, yes_flag: bool, action: &str) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Parse the document given via `--json` or `--from-file`.
pub fn read_json_input(input: &JsonInput) -> Result<Value, CliError> {
    match (&input.json, &input.from_file) {
        (Some(inline), _) => serde_json::from_str(inline).map_err(|e| CliError::Validation {
            field: "json".into(),
            reason: format!("invalid JSON: {e}"),
        }),
        (None, Some(path)) => read_json_file(path),
        (None, None) => Err(CliError::Validation {
            field: "json".into(),
            reason: "pass --json or --from-file".into(),
        }),
    }
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Write binary data to a file, or to stdout when no path is given.
pub fn write_bytes(out: Option<&Path>, data: &[u8]) -> Result<(), CliError> {
    match out {
        Some(path) => std::fs::write(path, data)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// `1280x720` -> (1280, 720).
pub fn parse_resolution(raw: &str) -> Result<(u32, u32), CliError> {
    let invalid = || CliError::Validation {
        field: "resolution".into(),
        reason: format!("expected WIDTHxHEIGHT, got '{raw}'"),
    };
    let (w, h) = raw.split_once(['x', 'X']).ok_or_else(invalid)?;
    let width = w.trim().parse().map_err(|_| invalid())?;
    let height = h.trim().parse().map_err(|_| invalid())?;
    Ok((width, height))
}

/// `30000/1001` -> (30000, 1001); a bare integer means `/1`.
pub fn parse_fps(raw: &str) -> Result<(u32, u32), CliError> {
    let invalid = || CliError::Validation {
        field: "fps".into(),
        reason: format!("expected NUM/DEN or an integer, got '{raw}'"),
    };
    let (num, den) = raw.split_once('/').unwrap_or((raw, "1"));
    let num: u32 = num.trim().parse().map_err(|_| invalid())?;
    let den: u32 = den.trim().parse().map_err(|_| invalid())?;
    if den == 0 {
        return Err(invalid());
    }
    Ok((num, den))
}
