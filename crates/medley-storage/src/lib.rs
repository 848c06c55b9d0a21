//! Medley storage backends.
//!
//! Defines the [`Storage`] trait plus the local filesystem implementation and
//! the shared storage-key scheme (`<category-dir>/<uuid>.<ext>`).

pub mod keys;
pub mod local;
pub mod traits;

pub use keys::generate_storage_key;
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
