//! Recording resolver: normalize a dial-plan recording for voice upload.
//!
//! The telephony system hands us a file path per call. Compressed containers
//! (mp3, m4a) are accepted by the transport as-is; uncompressed wav is
//! transcoded to m4a with ffmpeg. The container kind is taken from the file
//! extension only — the dial-plan controls the recording format, so content
//! sniffing buys nothing.

use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use {tempfile::NamedTempFile, tokio::process::Command, tracing::debug};

use crate::error::{Error, Result};

/// Recording container kinds the resolver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Mp3,
    M4a,
    Wav,
}

impl ContainerKind {
    /// Detect the container kind from a path's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "mp3" => Some(Self::Mp3),
            "m4a" => Some(Self::M4a),
            "wav" => Some(Self::Wav),
            _ => None,
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::M4a => "m4a",
            Self::Wav => "wav",
        }
    }

    /// Whether the transport accepts this container without conversion.
    #[must_use]
    pub const fn upload_ready(self) -> bool {
        matches!(self, Self::Mp3 | Self::M4a)
    }
}

/// A recording guaranteed to be in a container the transport accepts.
#[derive(Debug, Clone)]
pub struct NormalizedRecording {
    pub path: PathBuf,
    pub kind: ContainerKind,
    /// True when `path` points at a freshly produced temp file rather than
    /// the original recording.
    pub transcoded: bool,
}

/// Validate and normalize the recording at `path`.
///
/// Returns the original path unchanged for upload-ready containers, or the
/// path of a transcoded copy for wav input. The original file is never
/// modified. Temp files produced here are intentionally not cleaned up —
/// the process is short-lived and the dial-plan recycles its spool.
pub async fn resolve(path: &Path) -> Result<NormalizedRecording> {
    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|_| Error::not_found(path))?;
    if !meta.is_file() {
        return Err(Error::not_found(path));
    }

    let Some(kind) = ContainerKind::from_path(path) else {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        return Err(Error::unsupported_format(ext));
    };

    if kind.upload_ready() {
        debug!(path = %path.display(), kind = kind.extension(), "recording is upload-ready");
        return Ok(NormalizedRecording {
            path: path.to_path_buf(),
            kind,
            transcoded: false,
        });
    }

    let output = transcode_to_m4a(path).await?;
    debug!(
        input = %path.display(),
        output = %output.display(),
        "recording transcoded for upload"
    );
    Ok(NormalizedRecording {
        path: output,
        kind: ContainerKind::M4a,
        transcoded: true,
    })
}

/// Transcode `input` to m4a at a fresh temp path via ffmpeg.
async fn transcode_to_m4a(input: &Path) -> Result<PathBuf> {
    let ffmpeg = which::which("ffmpeg").map_err(|_| Error::TranscoderMissing)?;

    // Fresh output path so the original can never be clobbered. `keep()`
    // persists the file past this scope; the upload happens later.
    let temp = NamedTempFile::with_suffix(".m4a")?;
    let (_file, output) = temp.keep().map_err(|e| Error::Io(e.error))?;

    let mut cmd = Command::new(&ffmpeg);
    cmd.arg("-nostdin");
    cmd.arg("-loglevel").arg("error");
    cmd.arg("-i").arg(input);
    // -y only overwrites the temp file we just created.
    cmd.arg("-y").arg(&output);
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::piped());

    let result = cmd.output().await?;
    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
        return Err(Error::TranscodeFailed { stderr });
    }

    Ok(output)
}
