use snafu::Snafu;
use std::path::PathBuf;

#[derive(Debug, Snafu)]
pub struct Error(OpaqueError);
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum OpaqueError {
    #[snafu(display("Error deserializing configuration: {}", source))]
    ConfigDeserialization { source: serde_json::Error },

    #[snafu(display("Error serializing configuration: {}", source))]
    ConfigSerialization { source: serde_json::Error },

    #[snafu(display("Unable to read environment settings: {}", source))]
    EnvSettings { source: envy::Error },

    #[snafu(display("No profile named '{}' was found in '{}'", name, dir.display()))]
    ProfileNotFound { name: String, dir: PathBuf },

    #[snafu(display("Unable to parse profiles in '{}': {}", path.display(), source))]
    ProfileParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[snafu(display("Unable to read profiles from '{}': {}", path.display(), source))]
    ProfileRead {
        path: PathBuf,
        source: std::io::Error,
    },
}
