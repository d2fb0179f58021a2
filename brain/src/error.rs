use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The batch carries more shape commands than allowed; nothing is drawn.
    #[error("at most {max} shapes may be given per code, got {count}")]
    TooManyShapes { count: usize, max: usize },

    /// Unknown shape letter or wrong number of fields.
    #[error("malformed command `{token}`: {reason}")]
    MalformedToken { token: String, reason: &'static str },

    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    #[error("dimension {value} cm is outside {min}-{max} cm")]
    OutOfRangeDimension { value: i64, min: u32, max: u32 },

    #[error("sides {a}, {b}, {c} cm do not form a triangle")]
    DegenerateTriangle { a: u32, b: u32, c: u32 },

    /// The motor driver rejected or failed a drive command.
    #[error("actuation failure: {0}")]
    ActuationFailure(String),

    #[error("optical code capture failed: {0}")]
    Capture(String),

    #[error("status light failure: {0}")]
    StatusLight(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
#[error("command {index} (`{token}`): {error}")]
pub struct TokenError {
    pub index: usize,
    pub token: String,
    #[source]
    pub error: Error,
}
