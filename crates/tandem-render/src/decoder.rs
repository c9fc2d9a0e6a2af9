//! [`ImageDecoder`] backed by the `image` crate.

use image::ImageError;
use tandem_core::decode::{BoxFuture, DecodeError, DecodedImage, ImageDecoder};

/// Decodes PNG, JPEG and WebP bytes into RGBA8.
///
/// Decoding runs when the returned future is first polled.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

impl ImageCrateDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode synchronously.
    pub fn decode_now(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        let decoded = image::load_from_memory(bytes).map_err(|e| match e {
            ImageError::Unsupported(_) => DecodeError::Unsupported,
            other => DecodeError::InvalidData(other.to_string()),
        })?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::debug!("Decoded image: {}x{}", width, height);
        DecodedImage::new(width, height, rgba.into_raw())
    }
}

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, bytes: Vec<u8>) -> BoxFuture<'static, Result<DecodedImage, DecodeError>> {
        Box::pin(async move { Self::decode_now(&bytes) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::encode_png;

    #[test]
    fn test_decodes_png() {
        let bytes = encode_png(&[10, 20, 30, 255, 40, 50, 60, 128], 2, 1).unwrap();
        let decoded = pollster::block_on(ImageCrateDecoder::new().decode(bytes)).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (2, 1));
        assert_eq!(decoded.pixel(1, 0), Some([40, 50, 60, 128]));
    }

    #[test]
    fn test_empty_bytes() {
        let result = pollster::block_on(ImageCrateDecoder::new().decode(Vec::new()));
        assert_eq!(result, Err(DecodeError::Empty));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let result = pollster::block_on(ImageCrateDecoder::new().decode(b"definitely not an image".to_vec()));
        assert!(matches!(result, Err(DecodeError::Unsupported | DecodeError::InvalidData(_))));
    }
}
