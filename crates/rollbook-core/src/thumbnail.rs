//! Photo thumbnails.
//!
//! Attaching a photo is two phases. [`Thumbnail::encode`] turns raw image
//! bytes into a bounded data URL and is a pure function: it never sees the
//! store. The resulting [`Thumbnail`] then travels inside a
//! [`NewRecord`](crate::model::NewRecord) or a
//! [`Change::Set`](crate::model::Change::Set) patch, which is the
//! only way a photo reaches stored state.

use std::fmt;
use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default budget for an encoded thumbnail, in bytes of data URL text.
pub const DEFAULT_PHOTO_BUDGET: usize = 200 * 1024;

/// Longest edge, in pixels, tried for each downscaled thumbnail, largest first.
const THUMBNAIL_EDGES: [u32; 6] = [512, 384, 256, 192, 128, 96];

const JPEG_QUALITY: u8 = 80;

/// Errors from thumbnail encoding.
#[derive(Debug, Error, PartialEq)]
pub enum ThumbnailError {
    #[error("image is empty")]
    Empty,

    #[error("unsupported image format (expected PNG, JPEG, GIF or WebP)")]
    UnsupportedFormat,

    #[error("encoded image is {size} bytes, budget is {budget} bytes")]
    TooLarge { size: usize, budget: usize },

    #[error("not an image data URL")]
    InvalidDataUrl,

    #[error("could not decode image: {0}")]
    Decode(String),
}

/// An encoded image stored on a record as a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Thumbnail(String);

impl Thumbnail {
    /// Encode raw image bytes as a data URL of at most `budget` bytes.
    ///
    /// Images that already fit are stored as-is. Larger ones are decoded,
    /// downscaled and re-encoded as JPEG at shrinking sizes until one fits;
    /// `TooLarge` reports the smallest attempt when none does.
    pub fn encode(bytes: &[u8], budget: usize) -> Result<Self, ThumbnailError> {
        if bytes.is_empty() {
            return Err(ThumbnailError::Empty);
        }
        let mime = sniff_mime(bytes).ok_or(ThumbnailError::UnsupportedFormat)?;

        if data_url_len(mime, bytes.len()) <= budget {
            return Ok(Self::from_bytes(mime, bytes));
        }

        let decoded =
            image::load_from_memory(bytes).map_err(|e| ThumbnailError::Decode(e.to_string()))?;
        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

        let mut smallest = usize::MAX;
        for edge in THUMBNAIL_EDGES {
            let scaled = if rgb.width().max(rgb.height()) > edge {
                rgb.thumbnail(edge, edge)
            } else {
                rgb.clone()
            };
            let jpeg = encode_jpeg(&scaled)?;
            let size = data_url_len("image/jpeg", jpeg.len());
            if size <= budget {
                debug!(
                    original = bytes.len(),
                    width = scaled.width(),
                    height = scaled.height(),
                    size,
                    "downscaled photo"
                );
                return Ok(Self::from_bytes("image/jpeg", &jpeg));
            }
            smallest = smallest.min(size);
        }
        Err(ThumbnailError::TooLarge {
            size: smallest,
            budget,
        })
    }

    fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        let mut url = format!("data:{mime};base64,");
        BASE64.encode_string(bytes, &mut url);
        Thumbnail(url)
    }

    /// Wrap an already-encoded data URL.
    pub fn from_data_url(url: &str) -> Result<Self, ThumbnailError> {
        let rest = url
            .strip_prefix("data:image/")
            .ok_or(ThumbnailError::InvalidDataUrl)?;
        if !rest.contains(";base64,") {
            return Err(ThumbnailError::InvalidDataUrl);
        }
        Ok(Thumbnail(url.to_string()))
    }

    pub fn as_data_url(&self) -> &str {
        &self.0
    }

    /// MIME type declared in the data URL.
    pub fn mime(&self) -> &str {
        self.0
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .unwrap_or_default()
    }

    /// Size of the encoded data URL in bytes.
    pub fn encoded_len(&self) -> usize {
        self.0.len()
    }
}

impl TryFrom<String> for Thumbnail {
    type Error = ThumbnailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Thumbnail::from_data_url(&value)
    }
}

impl From<Thumbnail> for String {
    fn from(value: Thumbnail) -> Self {
        value.0
    }
}

impl fmt::Display for Thumbnail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.mime(), self.encoded_len())
    }
}

/// Length of the data URL for `len` raw bytes: base64 is 4 bytes per
/// 3-byte group, padded.
fn data_url_len(mime: &str, len: usize) -> usize {
    "data:;base64,".len() + mime.len() + len.div_ceil(3) * 4
}

fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>, ThumbnailError> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_with_encoder(JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY))
        .map_err(|e| ThumbnailError::Decode(e.to_string()))?;
    Ok(out.into_inner())
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}
