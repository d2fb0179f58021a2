use thiserror::Error;

#[derive(Error, Debug)]
pub enum InterfaceError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zenoh bridge error: {0}")]
    Bridge(String),

    #[error("CDR encoding error: {0}")]
    Cdr(#[from] cdr::Error),

    #[error("drawing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Drawing(#[from] brain::Error),
}

impl From<toml::de::Error> for InterfaceError {
    fn from(e: toml::de::Error) -> Self {
        InterfaceError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, InterfaceError>;
