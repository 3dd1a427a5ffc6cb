/*!

`agent-utils` is a collection of functions that may be used by agent implementations: logger
setup and helpers for running external commands.

!*/

use constants::DEFAULT_AGENT_LEVEL_FILTER;
use env_logger::Builder;
pub use error::Error;
use log::{trace, LevelFilter};
use resource_agent::clients::{ClientError, ClientResult, CommandOutput};
use snafu::ResultExt;
use std::env;
use std::ffi::OsStr;
use std::process::Command;

pub mod constants;
mod error;

/// Extract the value of `RUST_LOG` if it exists, otherwise log this application at
/// `DEFAULT_AGENT_LEVEL_FILTER`.
pub fn init_agent_logger(bin_crate: &str, log_level: Option<LevelFilter>) {
    match env::var(env_logger::DEFAULT_FILTER_ENV).ok() {
        Some(_) => {
            // RUST_LOG exists; env_logger will use it.
            Builder::from_default_env().init();
        }
        None => {
            // RUST_LOG does not exist; use default log level for our crates only.
            let log_level = log_level.unwrap_or(DEFAULT_AGENT_LEVEL_FILTER);
            Builder::new()
                // Set log level to Error for crates other than our own.
                .filter_level(LevelFilter::Error)
                // Set all of our crates to the desired level.
                .filter(Some(bin_crate), log_level)
                .filter(Some("agent_utils"), log_level)
                .filter(Some("fixture_model"), log_level)
                .filter(Some("resource_agent"), log_level)
                .filter(Some("rosa_agents"), log_level)
                .init();
        }
    }
}

/// Run `program` with `args` to completion and capture what it printed. Fails only if the
/// process could not be started; a non-zero exit is reported in the returned [`CommandOutput`].
pub fn run_command<I, S>(program: &str, args: I) -> error::Result<CommandOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_command_with_env(program, args, &[])
}

/// Like [`run_command`], with extra environment variables set for the child process.
pub fn run_command_with_env<I, S>(
    program: &str,
    args: I,
    envs: &[(&str, &OsStr)],
) -> error::Result<CommandOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<String> = args
        .into_iter()
        .map(|arg| arg.as_ref().to_string_lossy().to_string())
        .collect();
    let command = command_line(program, &args);
    trace!("Running '{}'", command);
    let output = Command::new(program)
        .args(&args)
        .envs(envs.iter().copied())
        .output()
        .context(error::CommandStartSnafu { command: &command })?;
    let output = CommandOutput {
        command,
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };
    trace!(
        "'{}' exited with {:?}\nstdout:\n{}\nstderr:\n{}",
        output.command,
        output.code,
        output.stdout,
        output.stderr
    );
    Ok(output)
}

/// The command line as a shell would show it. Arguments containing whitespace or quotes are
/// single-quoted.
pub fn command_line<S: AsRef<str>>(program: &str, args: &[S]) -> String {
    std::iter::once(program.to_string())
        .chain(args.iter().map(|arg| shell_quote(arg.as_ref())))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(arg: &str) -> String {
    if !arg.is_empty()
        && !arg
            .chars()
            .any(|c| c.is_whitespace() || c == '\'' || c == '"' || c == '$' || c == '\\')
    {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// If the command was successful (exit code zero), returns the command's `stdout`. Otherwise
/// returns a [`ClientError::CommandFailed`] carrying the output.
pub fn client_result_for_cmd_output(output: CommandOutput) -> ClientResult<String> {
    if output.success() {
        Ok(output.stdout)
    } else {
        Err(ClientError::CommandFailed(output))
    }
}
