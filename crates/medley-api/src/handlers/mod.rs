//! HTTP handlers, one module per resource.

pub mod auth;
pub mod media;
pub mod tags;
pub mod users;
