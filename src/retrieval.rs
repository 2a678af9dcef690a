//! Outbound image delivery: load a payload and label it with its MIME type.

use bytes::Bytes;
use ph_core::{Error, ImageId, Result};
use ph_sniff::ImageFormat;
use serde::Serialize;

use crate::store::ContentStore;

/// A payload ready to stream, with the type its leading bytes declare.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedImage {
    pub image_id: ImageId,
    pub format: ImageFormat,
    pub mime_type: &'static str,
    #[serde(skip)]
    pub bytes: Bytes,
}

/// Fetch an image and classify it.
///
/// Fails with [`Error::NotFound`] for an unknown id and
/// [`Error::UnknownFormat`] when the bytes match no known signature.
pub fn fetch_image(store: &ContentStore, image_id: ImageId) -> Result<TypedImage> {
    let bytes = store.get(image_id)?;
    let format = ph_sniff::classify(&bytes).ok_or_else(|| Error::UnknownFormat {
        id: image_id.to_string(),
    })?;

    Ok(TypedImage {
        image_id,
        format,
        mime_type: format.mime_type(),
        bytes,
    })
}

impl TypedImage {
    /// Default file name for saving the payload: `<id>.<extension>`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.image_id, self.format.extension())
    }
}
