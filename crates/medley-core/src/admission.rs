//! Upload admission pipeline
//!
//! Pre-persistence validation of upload candidates. Each candidate is checked
//! independently, in a fixed order: content type (category derivation), then
//! file extension, then size against the per-category ceiling. The first
//! failing check wins; reasons are never aggregated for a single candidate.
//!
//! Nothing here performs I/O - callers decide what to do with the per-file
//! results (fail fast or partial accept).

use std::path::Path;

use crate::models::media::MediaCategory;

const MIB: u64 = 1024 * 1024;

/// Size ceiling for video uploads.
pub const VIDEO_MAX_SIZE_BYTES: u64 = 50 * MIB;
/// Size ceiling for all non-video uploads.
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 5 * MIB;

/// File extensions accepted for upload, lowercase.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "mp4", "mov", "avi", "mkv", "pdf",
];

/// One file of an incoming batch, before any validation.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: u64,
}

/// A candidate that passed all admission checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmittedUpload {
    pub original_name: String,
    pub content_type: String,
    pub category: MediaCategory,
    pub extension: String,
    pub size_bytes: u64,
}

/// Per-candidate admission failure. Exactly one reason per candidate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    #[error("unsupported file type {content_type}")]
    UnsupportedType { content_type: String },

    #[error("file extension '{extension}' is not allowed")]
    UnsupportedExtension { extension: String },

    #[error("file size exceeds the maximum limit of {}MB", .limit_bytes / MIB)]
    SizeExceeded { size_bytes: u64, limit_bytes: u64 },
}

/// Size ceiling in bytes for a category.
pub fn size_limit_for(category: MediaCategory) -> u64 {
    match category {
        MediaCategory::Video => VIDEO_MAX_SIZE_BYTES,
        MediaCategory::Image | MediaCategory::Pdf => DEFAULT_MAX_SIZE_BYTES,
    }
}

/// Strip MIME parameters (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
fn normalize_content_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// Validate a single candidate: type derivation, then extension, then size.
pub fn admit(candidate: &UploadCandidate) -> Result<AdmittedUpload, AdmissionError> {
    let content_type = normalize_content_type(&candidate.content_type).to_lowercase();

    let category = MediaCategory::from_content_type(&content_type).ok_or_else(|| {
        AdmissionError::UnsupportedType {
            content_type: candidate.content_type.clone(),
        }
    })?;

    let extension = extension_of(&candidate.original_name);
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AdmissionError::UnsupportedExtension { extension });
    }

    let limit_bytes = size_limit_for(category);
    if candidate.size_bytes > limit_bytes {
        return Err(AdmissionError::SizeExceeded {
            size_bytes: candidate.size_bytes,
            limit_bytes,
        });
    }

    Ok(AdmittedUpload {
        original_name: candidate.original_name.clone(),
        content_type,
        category,
        extension,
        size_bytes: candidate.size_bytes,
    })
}

/// Validate every candidate of a batch independently. The caller decides the
/// batch policy (fail fast vs partial accept) from the per-file results.
pub fn admit_batch(
    candidates: &[UploadCandidate],
) -> Vec<Result<AdmittedUpload, AdmissionError>> {
    candidates.iter().map(admit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, content_type: &str, size: u64) -> UploadCandidate {
        UploadCandidate {
            original_name: name.to_string(),
            content_type: content_type.to_string(),
            size_bytes: size,
        }
    }

    #[test]
    fn test_admit_png_image() {
        let admitted = admit(&candidate("photo.png", "image/png", MIB)).unwrap();
        assert_eq!(admitted.category, MediaCategory::Image);
        assert_eq!(admitted.extension, "png");
    }

    #[test]
    fn test_admit_is_case_insensitive() {
        let admitted = admit(&candidate("PHOTO.PNG", "IMAGE/PNG", MIB)).unwrap();
        assert_eq!(admitted.category, MediaCategory::Image);
        assert_eq!(admitted.extension, "png");
    }

    #[test]
    fn test_admit_strips_content_type_parameters() {
        let admitted = admit(&candidate("a.jpg", "image/jpeg; charset=utf-8", MIB)).unwrap();
        assert_eq!(admitted.content_type, "image/jpeg");
    }

    #[test]
    fn test_unknown_content_type_rejected_first() {
        // Type derivation runs before the extension check, so a bad MIME wins
        // even when the extension is also bad.
        let err = admit(&candidate("archive.zip", "application/zip", MIB)).unwrap_err();
        assert!(matches!(err, AdmissionError::UnsupportedType { .. }));
    }

    #[test]
    fn test_disallowed_extension_rejected_regardless_of_mime() {
        let err = admit(&candidate("payload.exe", "image/png", MIB)).unwrap_err();
        assert_eq!(
            err,
            AdmissionError::UnsupportedExtension {
                extension: "exe".to_string()
            }
        );
    }

    #[test]
    fn test_missing_extension_rejected() {
        let err = admit(&candidate("noextension", "image/png", MIB)).unwrap_err();
        assert!(matches!(err, AdmissionError::UnsupportedExtension { .. }));
    }

    #[test]
    fn test_video_size_ceiling_boundary() {
        assert!(admit(&candidate("clip.mp4", "video/mp4", VIDEO_MAX_SIZE_BYTES)).is_ok());

        let err =
            admit(&candidate("clip.mp4", "video/mp4", VIDEO_MAX_SIZE_BYTES + 1)).unwrap_err();
        assert_eq!(
            err,
            AdmissionError::SizeExceeded {
                size_bytes: VIDEO_MAX_SIZE_BYTES + 1,
                limit_bytes: VIDEO_MAX_SIZE_BYTES,
            }
        );
        assert!(err.to_string().contains("50MB"));
    }

    #[test]
    fn test_default_size_ceiling_boundary() {
        assert!(admit(&candidate("doc.pdf", "application/pdf", DEFAULT_MAX_SIZE_BYTES)).is_ok());

        let err = admit(&candidate(
            "doc.pdf",
            "application/pdf",
            DEFAULT_MAX_SIZE_BYTES + 1,
        ))
        .unwrap_err();
        assert!(matches!(err, AdmissionError::SizeExceeded { .. }));
        assert!(err.to_string().contains("5MB"));
    }

    #[test]
    fn test_mislabeled_video_gets_image_ceiling() {
        // Declared MIME drives the limit selection: a video claiming to be an
        // image is held to the stricter image ceiling.
        let err = admit(&candidate("movie.gif", "image/gif", 10 * MIB)).unwrap_err();
        assert_eq!(
            err,
            AdmissionError::SizeExceeded {
                size_bytes: 10 * MIB,
                limit_bytes: DEFAULT_MAX_SIZE_BYTES,
            }
        );
    }

    #[test]
    fn test_batch_results_are_independent() {
        let results = admit_batch(&[
            candidate("ok.png", "image/png", MIB),
            candidate("bad.exe", "image/png", MIB),
            candidate("big.mp4", "video/mp4", 60 * MIB),
        ]);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(AdmissionError::UnsupportedExtension { .. })
        ));
        assert!(matches!(results[2], Err(AdmissionError::SizeExceeded { .. })));
    }
}
