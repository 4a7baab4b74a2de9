//! Image staging: turns a picked or dropped file into a validated data URI
//! that serves both as the composer preview and as the `/chat` payload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use base64::Engine;
use thiserror::Error;

pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported image format `{0}` (expected png, jpeg, gif or webp)")]
    UnsupportedFormat(String),

    #[error("image is too large ({size} bytes, max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("{file_name} does not look like a valid {media_type} image")]
    InvalidImage {
        file_name: String,
        media_type: &'static str,
    },
}

/// An image staged in the composer or attached to a sent message.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedImage {
    /// Process-unique; keys the decoded texture in egui's image cache.
    pub id: u64,
    pub file_name: String,
    pub media_type: &'static str,
    pub byte_len: usize,
    pub data_uri: String,
    /// Raw file bytes, shared with the thumbnail renderer.
    pub bytes: Arc<[u8]>,
}

impl StagedImage {
    /// Short human-readable description, e.g. `pills.png (12.3 KiB)`.
    pub fn summary(&self) -> String {
        format!("{} ({})", self.file_name, format_size(self.byte_len))
    }

    /// `bytes://` URI for egui's loaders. Ends in the file name so the
    /// decoder can pick the format from the extension.
    pub fn texture_uri(&self) -> String {
        format!("bytes://staged-{}/{}", self.id, self.file_name)
    }
}

pub fn media_type_for(file_name: &str) -> Result<&'static str, MediaError> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        _ => Err(MediaError::UnsupportedFormat(ext)),
    }
}

fn magic_matches(media_type: &str, data: &[u8]) -> bool {
    match media_type {
        "image/png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47]),
        "image/jpeg" => data.starts_with(&[0xFF, 0xD8, 0xFF]),
        "image/gif" => data.starts_with(b"GIF8"),
        "image/webp" => data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP",
        _ => false,
    }
}

/// Validate raw bytes and build the data URI.
pub fn encode(file_name: &str, data: &[u8], max_bytes: usize) -> Result<StagedImage, MediaError> {
    let media_type = media_type_for(file_name)?;
    if data.len() > max_bytes {
        return Err(MediaError::TooLarge {
            size: data.len(),
            max: max_bytes,
        });
    }
    if !magic_matches(media_type, data) {
        return Err(MediaError::InvalidImage {
            file_name: file_name.to_string(),
            media_type,
        });
    }

    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    log::debug!(
        "Encoded {} ({}, {} raw bytes, {} base64 chars)",
        file_name,
        media_type,
        data.len(),
        encoded.len()
    );

    Ok(StagedImage {
        id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
        file_name: file_name.to_string(),
        media_type,
        byte_len: data.len(),
        data_uri: format!("data:{media_type};base64,{encoded}"),
        bytes: Arc::from(data),
    })
}

/// Read `path` asynchronously and encode it.
pub async fn load(path: &Path, max_bytes: usize) -> Result<StagedImage, MediaError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    // Reject unknown extensions before touching the disk.
    media_type_for(&file_name)?;

    let io_err = |source: std::io::Error| MediaError::Io {
        path: path.to_path_buf(),
        source,
    };
    let metadata = tokio::fs::metadata(path).await.map_err(io_err)?;
    let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
    if size > max_bytes {
        return Err(MediaError::TooLarge {
            size,
            max: max_bytes,
        });
    }

    let data = tokio::fs::read(path).await.map_err(io_err)?;
    encode(&file_name, &data, max_bytes)
}

fn format_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let bytes = bytes as f64;
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < KIB * KIB {
        format!("{:.1} KiB", bytes / KIB)
    } else {
        format!("{:.1} MiB", bytes / (KIB * KIB))
    }
}
