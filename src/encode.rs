//! Turning selected image files into attachments.

use crate::error::{FlyerError, Result};
use crate::flyer::{ImageAttachment, ImageFormat};
use base64::Engine;
use std::path::{Path, PathBuf};

/// Media type for `bytes`, from magic bytes first, then the file extension.
fn detect_mime_type(path: &Path, bytes: &[u8]) -> Result<&'static str> {
    ImageFormat::from_magic_bytes(bytes)
        .or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .and_then(ImageFormat::from_extension)
        })
        .map(|f| f.mime_type())
        .ok_or_else(|| {
            FlyerError::InvalidRequest(format!("{} is not a supported image", path.display()))
        })
}

/// Reads and encodes one image file.
pub async fn encode_file(path: impl AsRef<Path>) -> Result<ImageAttachment> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    let mime_type = detect_mime_type(path, &bytes)?;
    tracing::debug!(path = %path.display(), mime_type, size = bytes.len(), "encoded image");

    Ok(ImageAttachment::new(
        base64::engine::general_purpose::STANDARD.encode(&bytes),
        mime_type,
    ))
}

/// Reads and encodes several files concurrently.
///
/// The result keeps the order of `paths`; the first failure aborts the batch.
pub async fn encode_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<ImageAttachment>> {
    let handles: Vec<_> = paths
        .iter()
        .map(|p| {
            let path: PathBuf = p.as_ref().to_path_buf();
            tokio::spawn(async move { encode_file(path).await })
        })
        .collect();

    let mut attachments = Vec::with_capacity(handles.len());
    for handle in handles {
        let attachment = handle
            .await
            .map_err(|e| FlyerError::Io(std::io::Error::other(e)))??;
        attachments.push(attachment);
    }
    Ok(attachments)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 1];
    const JPEG: [u8; 6] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 2];

    fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[tokio::test]
    async fn test_encode_file_detects_mime_from_content() {
        let dir = tempfile::tempdir().unwrap();
        // Extension lies; magic bytes win
        let path = write(dir.path(), "photo.png", &JPEG);

        let attachment = encode_file(&path).await.unwrap();
        assert_eq!(attachment.mime_type, "image/jpeg");
        assert_eq!(
            base64::engine::general_purpose::STANDARD
                .decode(&attachment.data)
                .unwrap(),
            JPEG.to_vec()
        );
    }

    #[tokio::test]
    async fn test_encode_file_falls_back_to_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "logo.webp", b"not really webp");

        let attachment = encode_file(&path).await.unwrap();
        assert_eq!(attachment.mime_type, "image/webp");
    }

    #[tokio::test]
    async fn test_encode_file_rejects_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "notes.txt", b"hello");

        let err = encode_file(&path).await.unwrap_err();
        assert!(matches!(err, FlyerError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_encode_files_preserves_selection_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![
            write(dir.path(), "c.jpg", &JPEG),
            write(dir.path(), "a.png", &PNG),
            write(dir.path(), "b.jpg", &[0xFF, 0xD8, 0xFF, 0xDB, 9]),
        ];

        let attachments = encode_files(&paths).await.unwrap();
        assert_eq!(attachments.len(), 3);
        assert_eq!(attachments[0], encode_file(&paths[0]).await.unwrap());
        assert_eq!(attachments[1].mime_type, "image/png");
        assert_eq!(attachments[2], encode_file(&paths[2]).await.unwrap());
    }

    #[tokio::test]
    async fn test_encode_files_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![
            write(dir.path(), "a.png", &PNG),
            dir.path().join("missing.png"),
        ];

        let err = encode_files(&paths).await.unwrap_err();
        assert!(matches!(err, FlyerError::Io(_)));
    }
}
