use crate::error::ErrorEnum;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// The result type returned by [`ClusterClient`] and [`InfoClient`] implementations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// The error type returned by [`ClusterClient`] and [`InfoClient`] implementations.
#[derive(Debug)]
pub enum ClientError {
    /// The client could not be created, or the external command could not be started.
    InitializationFailed(Option<Box<dyn std::error::Error + Send + Sync + 'static>>),

    /// An external command ran and reported failure. Its output is kept so that callers can
    /// inspect what the command said.
    CommandFailed(CommandOutput),

    /// An error occurred serializing or deserializing.
    Serialization(Option<Box<dyn std::error::Error + Send + Sync + 'static>>),

    /// Reading or writing persisted records failed.
    StorageFailed(Option<Box<dyn std::error::Error + Send + Sync + 'static>>),
}

impl ClientError {
    /// The output of the failed command, if this error came from a command that ran.
    pub fn output(&self) -> Option<&CommandOutput> {
        match self {
            ClientError::CommandFailed(output) => Some(output),
            _ => None,
        }
    }

    /// Whether the failed command's output mentions `needle`.
    pub fn output_contains(&self, needle: &str) -> bool {
        self.output()
            .map(|output| output.contains(needle))
            .unwrap_or(false)
    }
}

impl ErrorEnum for ClientError {
    fn variant_name(&self) -> &'static str {
        match self {
            ClientError::InitializationFailed(_) => "Initialization failed",
            ClientError::CommandFailed(_) => "Command failed",
            ClientError::Serialization(_) => "Serialization error",
            ClientError::StorageFailed(_) => "Storage error",
        }
    }

    fn inner(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            ClientError::InitializationFailed(e) => e.as_ref().map(|some| some.as_ref()),
            ClientError::CommandFailed(output) => {
                Some(output as &(dyn std::error::Error + Send + Sync + 'static))
            }
            ClientError::Serialization(e) => e.as_ref().map(|some| some.as_ref()),
            ClientError::StorageFailed(e) => e.as_ref().map(|some| some.as_ref()),
        }
    }
}

impl Error for ClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner_as_source()
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

impl From<fixture_model::Error> for ClientError {
    fn from(e: fixture_model::Error) -> Self {
        ClientError::Serialization(Some(Box::new(e)))
    }
}

/// What an external command printed, and how it exited.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct CommandOutput {
    /// The command line that was run, e.g. `rosa delete cluster -c abc -y`.
    pub command: String,
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// `stdout` followed by `stderr`.
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
        }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.stdout.contains(needle) || self.stderr.contains(needle)
    }
}

impl Display for CommandOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Error running '{}', exit code {}\nstderr:\n{}\nstdout:\n{}",
            self.command,
            self.code.unwrap_or(-1),
            self.stderr,
            self.stdout
        )
    }
}

impl Error for CommandOutput {}

#[test]
fn command_output_is_searchable() {
    let error = ClientError::CommandFailed(CommandOutput {
        command: "rosa delete cluster -c abc -y".to_string(),
        code: Some(1),
        stdout: String::new(),
        stderr: "E: There is no cluster with identifier or name 'abc'".to_string(),
    });
    assert!(error.output_contains("There is no cluster with identifier or name 'abc'"));
    assert!(!error.output_contains("def"));
    assert!(error.to_string().starts_with("Command failed: Error running 'rosa delete"));
    assert!(!ClientError::StorageFailed(None).output_contains("abc"));
}
