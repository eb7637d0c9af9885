//! Image files sent as multipart parts.

use std::path::Path;

use reqwest::multipart::Part;

use super::ApiError;

/// Largest image the API accepts.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// An image ready to be attached to a multipart request.
#[derive(Clone)]
pub struct ImageUpload {
    file_name: String,
    content_type: &'static str,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    /// Wrap in-memory image bytes. The content type comes from the extension.
    ///
    /// # Errors
    ///
    /// Returns an error for an unsupported extension, an empty file, or a
    /// file above [`MAX_IMAGE_BYTES`].
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ApiError> {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).ok_or_else(|| {
            ApiError::Upload(format!("unsupported image type: {file_name}"))
        })?;
        if bytes.is_empty() {
            return Err(ApiError::Upload(format!("{file_name} is empty")));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(too_large(&file_name));
        }
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    /// Read an image from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not an accepted image.
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ApiError::Upload(format!("invalid file name: {}", path.display())))?
            .to_string();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| ApiError::Upload(format!("{}: {e}", path.display())))?;
        if metadata.len() > MAX_IMAGE_BYTES as u64 {
            return Err(too_large(&file_name));
        }
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::Upload(format!("{}: {e}", path.display())))?;
        Self::new(file_name, bytes)
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub(super) fn into_part(self) -> Result<Part, ApiError> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(self.content_type)?)
    }
}

fn too_large(file_name: &str) -> ApiError {
    ApiError::Upload(format!(
        "{file_name} is larger than {} MB",
        MAX_IMAGE_BYTES / (1024 * 1024)
    ))
}

fn content_type_for(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_from_extension() {
        assert_eq!(content_type_for("a.JPG"), Some("image/jpeg"));
        assert_eq!(content_type_for("a.png"), Some("image/png"));
        assert_eq!(content_type_for("a.pdf"), None);
        assert_eq!(content_type_for("noext"), None);
    }

    #[test]
    fn test_rejects_empty_and_oversized() {
        assert!(ImageUpload::new("a.png", Vec::new()).is_err());
        assert!(ImageUpload::new("a.png", vec![0; MAX_IMAGE_BYTES + 1]).is_err());
        let ok = ImageUpload::new("a.png", vec![1, 2, 3]).unwrap();
        assert_eq!(ok.content_type(), "image/png");
    }

    #[tokio::test]
    async fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avatar.webp");
        tokio::fs::write(&path, b"RIFF").await.unwrap();
        let upload = ImageUpload::from_path(&path).await.unwrap();
        assert_eq!(upload.file_name(), "avatar.webp");
        assert_eq!(upload.content_type(), "image/webp");
    }

    #[tokio::test]
    async fn test_from_path_checks_size_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poster.png");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(MAX_IMAGE_BYTES as u64 * 200).unwrap();

        let err = ImageUpload::from_path(&path).await.unwrap_err();

        assert!(matches!(err, ApiError::Upload(ref msg) if msg.contains("larger than 5 MB")));
    }
}
