use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Recording(#[from] bellbot_media::Error),

    #[error("transport failure: {source}")]
    Transport {
        #[source]
        source: anyhow::Error,
    },
}

impl Error {
    #[must_use]
    pub fn transport(source: anyhow::Error) -> Self {
        Self::Transport { source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Process exit statuses, one per terminal branch of a session.
///
/// The dial-plan integration keys off these values, so they are part of the
/// external contract and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    UnknownError,
    RecordingNotFound,
    UnsupportedRecordingFormat,
    Interrupted,
}

impl ExitStatus {
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::UnknownError => 1,
            Self::RecordingNotFound => 2,
            Self::UnsupportedRecordingFormat => 3,
            Self::Interrupted => 4,
        }
    }
}

impl From<&Error> for ExitStatus {
    fn from(err: &Error) -> Self {
        match err {
            Error::Recording(bellbot_media::Error::NotFound { .. }) => Self::RecordingNotFound,
            Error::Recording(bellbot_media::Error::UnsupportedFormat { .. }) => {
                Self::UnsupportedRecordingFormat
            },
            Error::Recording(_) | Error::Transport { .. } => Self::UnknownError,
        }
    }
}
