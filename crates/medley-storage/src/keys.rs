//! Shared storage-key generation.
//!
//! Key format: `<category-dir>/<uuid>.<extension>`. The uuid component makes
//! keys collision-free under concurrent uploads; two requests can never be
//! assigned the same key.

use medley_core::models::MediaCategory;
use uuid::Uuid;

/// Generate a fresh storage key for an object of the given category.
pub fn generate_storage_key(category: MediaCategory, extension: &str) -> String {
    format!("{}/{}.{}", category.storage_dir(), Uuid::new_v4(), extension)
}

/// The generated object name (final key segment) for a key produced by
/// [`generate_storage_key`].
pub fn file_name_of(storage_key: &str) -> &str {
    storage_key.rsplit('/').next().unwrap_or(storage_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_shape() {
        let key = generate_storage_key(MediaCategory::Image, "png");
        assert!(key.starts_with("images/"));
        assert!(key.ends_with(".png"));

        let key = generate_storage_key(MediaCategory::Video, "mp4");
        assert!(key.starts_with("media/"));
    }

    #[test]
    fn test_keys_are_unique() {
        let a = generate_storage_key(MediaCategory::Pdf, "pdf");
        let b = generate_storage_key(MediaCategory::Pdf, "pdf");
        assert_ne!(a, b);
    }

    #[test]
    fn test_file_name_of() {
        let key = generate_storage_key(MediaCategory::Image, "jpg");
        let name = file_name_of(&key);
        assert!(!name.contains('/'));
        assert!(name.ends_with(".jpg"));
    }
}
