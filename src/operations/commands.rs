//! External command execution with proper working directory context

use crate::error::PackagerError;
use anyhow::{Context as _, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run a program and capture its output
///
/// `GIT_PAGER` is cleared so that git never waits on a pager.
///
/// # Errors
///
/// Returns an error if:
/// - The program cannot be spawned
/// - The program exits with a non-zero status
pub fn run_command(program: &str, args: &[&str], working_dir: &Path) -> Result<CommandOutput> {
    let command_line = command_line(program, args);
    debug!("$ {command_line} (in {})", working_dir.display());

    let output = Command::new(program)
        .args(args)
        .current_dir(working_dir)
        .env("GIT_PAGER", "")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("Failed to execute command: {command_line}"))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(PackagerError::external_command(
            command_line,
            output.status.code().unwrap_or(-1),
            stderr.trim(),
        )
        .into());
    }

    Ok(CommandOutput { stdout, stderr })
}

/// Run a program with inherited stdio (editors, package builders)
///
/// # Errors
///
/// Returns an error if the program cannot be spawned or exits with a
/// non-zero status
pub fn run_interactive(program: &str, args: &[&str], working_dir: &Path) -> Result<()> {
    let command_line = command_line(program, args);
    debug!("$ {command_line} (in {})", working_dir.display());

    let status = Command::new(program)
        .args(args)
        .current_dir(working_dir)
        .status()
        .with_context(|| format!("Failed to execute command: {command_line}"))?;

    if !status.success() {
        return Err(PackagerError::external_command(
            command_line,
            status.code().unwrap_or(-1),
            "",
        )
        .into());
    }

    Ok(())
}

fn command_line(program: &str, args: &[&str]) -> String {
    let mut line = program.to_owned();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
