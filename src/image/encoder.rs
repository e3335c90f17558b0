//! Converts selected images into base64 payloads.

use crate::error::{Result, SceneError};
use crate::image::types::{EncodedImage, ImageSource};
use base64::Engine;

/// Reads `source` and encodes it as standard base64 tagged with `media_type`.
///
/// Suspends until the underlying read completes. A failed read surfaces as
/// [`SceneError::Read`] and affects only this call.
pub async fn encode(source: &ImageSource, media_type: &str) -> Result<EncodedImage> {
    let bytes = match source {
        ImageSource::Bytes(bytes) => std::borrow::Cow::Borrowed(bytes.as_slice()),
        ImageSource::Path(path) => std::borrow::Cow::Owned(tokio::fs::read(path).await?),
    };

    tracing::debug!(media_type, size = bytes.len(), "encoded image");

    Ok(EncodedImage {
        media_type: media_type.to_string(),
        payload: base64::engine::general_purpose::STANDARD.encode(&bytes),
    })
}

/// Decodes an encoded image back to raw bytes.
pub fn decode(encoded: &EncodedImage) -> Result<Vec<u8>> {
    decode_payload(&encoded.payload)
}

/// Decodes a base64 payload, tolerating missing padding and embedded whitespace.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>> {
    let cleaned: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if let Ok(data) = base64::engine::general_purpose::STANDARD.decode(&cleaned) {
        return Ok(data);
    }

    base64::engine::general_purpose::STANDARD_NO_PAD
        .decode(cleaned.trim_end_matches('='))
        .map_err(|e| SceneError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_encode_bytes_round_trip() {
        let original: Vec<u8> = (0..=255).collect();
        let source = ImageSource::Bytes(original.clone());

        let encoded = encode(&source, "image/png").await.unwrap();
        assert_eq!(encoded.media_type, "image/png");
        assert_eq!(decode(&encoded).unwrap(), original);
    }

    #[tokio::test]
    async fn test_encode_file_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "scenegen-encoder-{}-{}.png",
            std::process::id(),
            line!()
        ));
        let original = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 7, 7];
        std::fs::write(&path, &original).unwrap();

        let encoded = encode(&ImageSource::Path(path.clone()), "image/png")
            .await
            .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(decode(&encoded).unwrap(), original);
    }

    #[tokio::test]
    async fn test_encode_missing_file_is_read_error() {
        let source = ImageSource::Path("/definitely/not/here/cat.png".into());
        let err = encode(&source, "image/png").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Read);
    }

    #[test]
    fn test_decode_payload_lenient() {
        assert_eq!(decode_payload("AAEC").unwrap(), vec![0, 1, 2]);
        assert_eq!(decode_payload("AAE").unwrap(), vec![0, 1]);
        assert_eq!(decode_payload("AA\nEC").unwrap(), vec![0, 1, 2]);
        assert!(decode_payload("!!!").is_err());
    }
}
