use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

use crate::error::{OpError, Outcome};

/// Captured result of one finished child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Runs external programs to completion.
///
/// Implementations block until the child exits and return everything it wrote.
/// A program that cannot be started is reported as [`OpError::ProcessSpawn`],
/// never as a non-zero exit code.
pub trait ProcessRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: &Path,
        env: &[(&str, &str)],
    ) -> Outcome<CommandResult>;

    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// [`ProcessRunner`] backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        cwd: &Path,
        env: &[(&str, &str)],
    ) -> Outcome<CommandResult> {
        debug!(program, ?args, cwd = %cwd.display(), "running command");

        // `envs` layers on top of the inherited environment
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .envs(env.iter().copied())
            .output()
            .map_err(|e| OpError::ProcessSpawn {
                program: program.to_string(),
                reason: e.to_string(),
            })?;

        // Killed by a signal: no exit code, still a failed run.
        let exit_code = output.status.code().unwrap_or(-1);

        Ok(CommandResult {
            exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Runs `program` and maps a non-zero exit into [`OpError::ProcessExecution`].
///
/// On success the untouched stdout is returned.
pub fn run_checked<R: ProcessRunner + ?Sized>(
    runner: &R,
    program: &str,
    args: &[&str],
    cwd: &Path,
    env: &[(&str, &str)],
) -> Outcome<String> {
    let result = runner.run(program, args, cwd, env)?;
    if result.success() {
        return Ok(result.stdout_text());
    }

    let command = describe(program, args);
    let stderr = result.stderr_text().trim().to_string();
    warn!(%command, exit_code = result.exit_code, "command failed");

    Err(OpError::ProcessExecution {
        command,
        stderr: if stderr.is_empty() {
            "unknown error".to_string()
        } else {
            stderr
        },
    })
}

fn describe(program: &str, args: &[&str]) -> String {
    // subcommand only, message bodies can be long
    match args.first() {
        Some(sub) => format!("{} {}", program, sub),
        None => program.to_string(),
    }
}
