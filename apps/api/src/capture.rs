//! Stimulus capture for the PPDT. Turns the fixed picture into a base64 data URI.
//!
//! The picture-analysis call cannot be issued without a captured image, so any
//! failure here is terminal for the session until it is reset.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no stimulus image was captured")]
    Missing,

    #[error("failed to read stimulus image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid image data URI: {0}")]
    InvalidDataUri(String),
}

/// Image formats accepted by the picture-analysis call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn from_subtype(subtype: &str) -> Option<Self> {
        match subtype.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_subtype)
    }

    pub fn media_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }
}

/// A borrowed view over a validated `data:image/...;base64,...` URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUri<'a> {
    pub format: ImageFormat,
    pub data: &'a str,
}

impl DataUri<'_> {
    pub fn media_type(&self) -> &'static str {
        self.format.media_type()
    }
}

/// Validates `data:image/(jpeg|jpg|png);base64,<payload>` and splits it.
pub fn parse_data_uri(uri: &str) -> Result<DataUri<'_>, CaptureError> {
    let rest = uri
        .strip_prefix("data:image/")
        .ok_or_else(|| CaptureError::InvalidDataUri("missing data:image/ prefix".to_string()))?;
    let (subtype, data) = rest
        .split_once(";base64,")
        .ok_or_else(|| CaptureError::InvalidDataUri("missing ;base64, marker".to_string()))?;
    let format = ImageFormat::from_subtype(subtype)
        .ok_or_else(|| CaptureError::UnsupportedFormat(subtype.to_string()))?;
    if data.trim().is_empty() {
        return Err(CaptureError::InvalidDataUri("empty payload".to_string()));
    }
    Ok(DataUri { format, data })
}

/// Encodes raw image bytes as a data URI.
pub fn encode_data_uri(format: ImageFormat, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", format.media_type(), STANDARD.encode(bytes))
}

/// Produces the PPDT stimulus as a data URI.
#[async_trait]
pub trait ImageCapture: Send + Sync {
    async fn capture(&self) -> Result<String, CaptureError>;
}

/// Reads the stimulus picture from disk on every capture.
pub struct FileStimulus {
    path: PathBuf,
}

impl FileStimulus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ImageCapture for FileStimulus {
    async fn capture(&self) -> Result<String, CaptureError> {
        let format = ImageFormat::from_path(&self.path).ok_or_else(|| {
            CaptureError::UnsupportedFormat(self.path.display().to_string())
        })?;
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| CaptureError::Io {
                path: self.path.clone(),
                source,
            })?;
        info!(
            "Captured stimulus {} ({} bytes)",
            self.path.display(),
            bytes.len()
        );
        Ok(encode_data_uri(format, &bytes))
    }
}
