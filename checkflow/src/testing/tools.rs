//! Generated shell-script tools.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Writes an executable shell script into `dir` and returns its path.
///
/// The body runs under `/bin/sh`; the script's arguments are available
/// as `$1`, `$2`, ...
///
/// # Errors
///
/// Returns an error if the script cannot be written or marked
/// executable.
pub fn script_tool(dir: &Path, name: &str, body: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    let script = format!("#!/bin/sh\n{body}\n");
    std::fs::write(&path, script)
        .with_context(|| format!("writing tool script '{}'", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(&path)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("marking '{}' executable", path.display()))?;
    }

    Ok(path)
}

/// A tool that appends its invocation (tool name plus arguments) to a
/// log file and exits cleanly.
///
/// Lets tests assert which stages actually ran, and in what order.
///
/// # Errors
///
/// Returns an error if the script cannot be written.
pub fn spy_tool(dir: &Path, name: &str, log: &Path) -> Result<PathBuf> {
    let body = format!(r#"printf '%s %s\n' "{name}" "$*" >> "{}""#, log.display());
    script_tool(dir, name, &body)
}

/// A tool that exits with the given code without producing output.
///
/// # Errors
///
/// Returns an error if the script cannot be written.
pub fn failing_tool(dir: &Path, name: &str, code: i32) -> Result<PathBuf> {
    script_tool(dir, name, &format!("exit {code}"))
}
