//! File attachments and the limits the backend expects for them.
//!
//! Company documents and news images must be images of at most 1 MiB.
//! Notice attachments must be PDFs of at most 10 MiB.

use std::path::Path;

use thiserror::Error;

/// Largest accepted image upload.
pub const IMAGE_MAX_BYTES: u64 = 1024 * 1024;

/// Largest accepted PDF upload.
pub const PDF_MAX_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("{field} must be an image")]
    NotAnImage { field: String },

    #[error("Only PDF files are allowed")]
    NotAPdf,

    #[error("{field} must be under {}", human_size(.limit))]
    TooLarge { field: String, size: u64, limit: u64 },

    #[error("Please upload a {0}")]
    MissingFile(&'static str),

    #[error("Please fill in the {0}")]
    MissingField(&'static str),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A file ready to be sent as a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Load an image for `field` (e.g. "photo"), enforcing type and size.
    pub fn image(path: &Path, field: &str) -> Result<Self, UploadError> {
        let file_name = file_name(path);
        let size = file_size(path)?;
        let mime = check_image(&file_name, size, field)?;
        Ok(Self { file_name, mime, bytes: read(path)? })
    }

    /// Load a notice PDF, enforcing type and size.
    pub fn pdf(path: &Path) -> Result<Self, UploadError> {
        let file_name = file_name(path);
        let size = file_size(path)?;
        let mime = check_pdf(&file_name, size)?;
        Ok(Self { file_name, mime, bytes: read(path)? })
    }
}

/// MIME type implied by the file extension, if it is one we recognise.
pub fn mime_for(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(mime)
}

pub fn check_image(file_name: &str, size: u64, field: &str) -> Result<&'static str, UploadError> {
    let mime = mime_for(file_name)
        .filter(|m| m.starts_with("image/"))
        .ok_or_else(|| UploadError::NotAnImage { field: field.to_string() })?;
    if size > IMAGE_MAX_BYTES {
        return Err(UploadError::TooLarge {
            field: field.to_string(),
            size,
            limit: IMAGE_MAX_BYTES,
        });
    }
    Ok(mime)
}

pub fn check_pdf(file_name: &str, size: u64) -> Result<&'static str, UploadError> {
    let mime = mime_for(file_name)
        .filter(|m| *m == "application/pdf")
        .ok_or(UploadError::NotAPdf)?;
    if size > PDF_MAX_BYTES {
        return Err(UploadError::TooLarge {
            field: "PDF".to_string(),
            size,
            limit: PDF_MAX_BYTES,
        });
    }
    Ok(mime)
}

fn human_size(bytes: &u64) -> String {
    format!("{}MB", bytes / (1024 * 1024))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_size(path: &Path) -> Result<u64, UploadError> {
    std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|source| UploadError::Io { path: path.display().to_string(), source })
}

fn read(path: &Path) -> Result<Vec<u8>, UploadError> {
    std::fs::read(path).map_err(|source| UploadError::Io { path: path.display().to_string(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for_extensions() {
        assert_eq!(mime_for("photo.JPG"), Some("image/jpeg"));
        assert_eq!(mime_for("scan.png"), Some("image/png"));
        assert_eq!(mime_for("notice.pdf"), Some("application/pdf"));
        assert_eq!(mime_for("archive.zip"), None);
        assert_eq!(mime_for("no_extension"), None);
    }

    #[test]
    fn test_image_limit_is_inclusive() {
        assert!(check_image("a.jpg", IMAGE_MAX_BYTES, "photo").is_ok());
        let err = check_image("a.jpg", IMAGE_MAX_BYTES + 1, "photo").unwrap_err();
        assert_eq!(err.to_string(), "photo must be under 1MB");
    }

    #[test]
    fn test_pdf_is_not_an_image() {
        let err = check_image("scan.pdf", 10, "registration").unwrap_err();
        assert_eq!(err.to_string(), "registration must be an image");
    }

    #[test]
    fn test_pdf_rules() {
        assert_eq!(check_pdf("n.pdf", PDF_MAX_BYTES).unwrap(), "application/pdf");
        assert!(matches!(check_pdf("n.docx", 10), Err(UploadError::NotAPdf)));
        assert!(matches!(
            check_pdf("n.pdf", PDF_MAX_BYTES + 1),
            Err(UploadError::TooLarge { limit: PDF_MAX_BYTES, .. })
        ));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let small = dir.path().join("logo.png");
        std::fs::write(&small, [0u8; 64]).unwrap();
        let big = dir.path().join("poster.png");
        std::fs::write(&big, vec![0u8; (IMAGE_MAX_BYTES + 1) as usize]).unwrap();

        let attachment = Attachment::image(&small, "photo").unwrap();
        assert_eq!(attachment.file_name, "logo.png");
        assert_eq!(attachment.mime, "image/png");
        assert_eq!(attachment.bytes.len(), 64);

        assert!(matches!(Attachment::image(&big, "photo"), Err(UploadError::TooLarge { .. })));
        assert!(matches!(
            Attachment::pdf(&dir.path().join("missing.pdf")),
            Err(UploadError::Io { .. })
        ));
    }
}
