use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed agi environment line: {line:?}")]
    MalformedEnv { line: String },

    #[error("agi command rejected: {reply:?}")]
    CommandRejected { reply: String },

    #[error("agi channel closed")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
