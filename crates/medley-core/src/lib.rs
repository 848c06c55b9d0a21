//! Medley Core Library
//!
//! This crate provides the domain models, error types, configuration, and the
//! upload admission pipeline shared across all Medley components.

pub mod admission;
pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use admission::{admit, AdmissionError, AdmittedUpload, UploadCandidate};
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
