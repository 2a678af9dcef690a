//! # ph-sniff
//!
//! Image type detection from magic numbers.
//!
//! Classification looks only at a fixed-size prefix of the payload (at most
//! [`SNIFF_LEN`] bytes) and compares it against a static signature table. It
//! never decodes or validates the rest of the image, so the cost is constant
//! regardless of payload size.
//!
//! ## Quick start
//!
//! ```
//! use ph_sniff::{classify, ImageFormat};
//!
//! let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
//! assert_eq!(classify(&png), Some(ImageFormat::Png));
//! assert_eq!(ImageFormat::Png.mime_type(), "image/png");
//!
//! assert_eq!(classify(b"not an image"), None);
//! ```

mod signature;

use serde::Serialize;
use std::fmt;

pub use signature::SNIFF_LEN;

/// MIME type reported for payloads no signature recognises.
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// Image formats recognised by their leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Avif,
    Heic,
    Tiff,
    Exr,
    Ico,
    SunRaster,
    SgiRgb,
    Pbm,
    Pgm,
    Ppm,
    Xbm,
    Bmp,
}

impl ImageFormat {
    /// Canonical MIME type for this format.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
            Self::Avif => "image/avif",
            Self::Heic => "image/heic",
            Self::Tiff => "image/tiff",
            Self::Exr => "image/x-exr",
            Self::Ico => "image/vnd.microsoft.icon",
            Self::SunRaster => "image/x-cmu-raster",
            Self::SgiRgb => "image/x-rgb",
            Self::Pbm => "image/x-portable-bitmap",
            Self::Pgm => "image/x-portable-graymap",
            Self::Ppm => "image/x-portable-pixmap",
            Self::Xbm => "image/x-xbitmap",
            Self::Bmp => "image/bmp",
        }
    }

    /// Conventional file extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
            Self::Avif => "avif",
            Self::Heic => "heic",
            Self::Tiff => "tiff",
            Self::Exr => "exr",
            Self::Ico => "ico",
            Self::SunRaster => "ras",
            Self::SgiRgb => "rgb",
            Self::Pbm => "pbm",
            Self::Pgm => "pgm",
            Self::Ppm => "ppm",
            Self::Xbm => "xbm",
            Self::Bmp => "bmp",
        }
    }

    /// Short human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Gif => "GIF",
            Self::Webp => "WebP",
            Self::Avif => "AVIF",
            Self::Heic => "HEIC",
            Self::Tiff => "TIFF",
            Self::Exr => "OpenEXR",
            Self::Ico => "ICO",
            Self::SunRaster => "Sun raster",
            Self::SgiRgb => "SGI RGB",
            Self::Pbm => "PBM",
            Self::Pgm => "PGM",
            Self::Ppm => "PPM",
            Self::Xbm => "XBM",
            Self::Bmp => "BMP",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classify a payload by its leading bytes.
///
/// Returns the format of the first signature in the table that matches, or
/// `None` when the payload is too short or matches nothing. Only the first
/// [`SNIFF_LEN`] bytes are ever inspected.
#[must_use]
pub fn classify(payload: &[u8]) -> Option<ImageFormat> {
    let prefix = &payload[..payload.len().min(SNIFF_LEN)];
    signature::SIGNATURES
        .iter()
        .find(|sig| sig.matches(prefix))
        .map(|sig| sig.format)
}

/// Classify a payload and return its canonical MIME type.
#[must_use]
pub fn classify_mime(payload: &[u8]) -> Option<&'static str> {
    classify(payload).map(ImageFormat::mime_type)
}
