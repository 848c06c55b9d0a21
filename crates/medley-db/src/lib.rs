//! Database repositories for the data access layer.
//!
//! Each repository owns the queries for one entity and returns clean domain
//! models from medley-core. All concurrency-sensitive invariants (atomic view
//! counting, per-file commit transactions) are enforced here, at the
//! persistence boundary.

pub mod db;

pub use db::media::{MediaFileUpdate, MediaRepository, NewMedia};
pub use db::tags::TagRepository;
pub use db::users::UserRepository;
