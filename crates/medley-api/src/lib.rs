//! Medley HTTP API.
//!
//! Request flow: bearer token verification → fresh principal resolution →
//! per-route access decision → handler. Upload endpoints additionally run
//! every file through the admission pipeline before anything is persisted.

pub mod api_doc;
pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod response;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
