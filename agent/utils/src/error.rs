use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Unable to start '{}': {}", command, source))]
    CommandStart {
        command: String,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
