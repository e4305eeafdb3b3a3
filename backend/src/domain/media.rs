//! Validated profile image uploads.

use std::fmt;

/// Largest accepted upload in bytes (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Profile image position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Avatar,
    Cover,
}

impl ImageSlot {
    /// Storage prefix for this slot.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::Cover => "cover",
        }
    }
}

/// Accepted image encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Png,
    Jpeg,
    Webp,
    Gif,
}

impl ImageType {
    /// Match a `Content-Type` value, ignoring parameters and case.
    pub fn from_mime(raw: &str) -> Option<Self> {
        let essence = raw.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// File extension used when storing.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }
}

/// Reasons an upload is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageValidationError {
    UnsupportedType(String),
    Empty,
    TooLarge { max: usize, actual: usize },
}

impl ImageValidationError {
    /// Stable code for error details.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedType(_) => "unsupported_media_type",
            Self::Empty => "missing_field",
            Self::TooLarge { .. } => "payload_too_large",
        }
    }
}

impl fmt::Display for ImageValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedType(raw) => write!(f, "unsupported image type: {raw}"),
            Self::Empty => write!(f, "image body must not be empty"),
            Self::TooLarge { max, actual } => {
                write!(f, "image is {actual} bytes; the limit is {max}")
            }
        }
    }
}

impl std::error::Error for ImageValidationError {}

/// Image bytes with a verified type and size.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    kind: ImageType,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Validate the declared content type and the body size.
    pub fn new(content_type: &str, bytes: Vec<u8>) -> Result<Self, ImageValidationError> {
        let kind = ImageType::from_mime(content_type)
            .ok_or_else(|| ImageValidationError::UnsupportedType(content_type.to_owned()))?;
        if bytes.is_empty() {
            return Err(ImageValidationError::Empty);
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageValidationError::TooLarge {
                max: MAX_IMAGE_BYTES,
                actual: bytes.len(),
            });
        }
        Ok(Self { kind, bytes })
    }

    /// Declared encoding.
    pub fn kind(&self) -> ImageType {
        self.kind
    }

    /// Raw image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("kind", &self.kind)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("image/png", Some(ImageType::Png))]
    #[case("IMAGE/JPEG; charset=binary", Some(ImageType::Jpeg))]
    #[case("image/webp", Some(ImageType::Webp))]
    #[case("image/gif", Some(ImageType::Gif))]
    #[case("image/svg+xml", None)]
    #[case("text/plain", None)]
    fn recognises_supported_mime_types(#[case] raw: &str, #[case] expected: Option<ImageType>) {
        assert_eq!(ImageType::from_mime(raw), expected);
    }

    #[rstest]
    fn rejects_oversized_body() {
        let error = ImageUpload::new("image/png", vec![0; MAX_IMAGE_BYTES + 1]).expect_err("big");
        assert_eq!(error.code(), "payload_too_large");
    }

    #[rstest]
    fn rejects_empty_body() {
        let error = ImageUpload::new("image/png", Vec::new()).expect_err("empty");
        assert_eq!(error, ImageValidationError::Empty);
    }

    #[rstest]
    fn accepts_limit_sized_body() {
        let upload = ImageUpload::new("image/gif", vec![1; MAX_IMAGE_BYTES]).expect("fits");
        assert_eq!(upload.kind().extension(), "gif");
    }
}
