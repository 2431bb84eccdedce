use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The channel needs capacity for at least one message.
    #[error("response limit must be at least 1")]
    InvalidResponseLimit,

    /// The delivery loop has terminated; no further messages will be read.
    #[error("message channel closed")]
    SinkClosed,

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
