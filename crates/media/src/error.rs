use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("recording not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("unsupported recording format: {extension:?}")]
    UnsupportedFormat { extension: String },

    #[error("ffmpeg not found in PATH")]
    TranscoderMissing,

    #[error("transcode failed: {stderr}")]
    TranscodeFailed { stderr: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    #[must_use]
    pub fn unsupported_format(extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            extension: extension.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
