//! Domain models shared across crates.

pub mod media;
pub mod tag;
pub mod user;

pub use media::{MediaCategory, MediaRecord, MediaRow};
pub use tag::Tag;
pub use user::{User, UserResponse, UserRole, UserStatus};
