//! HTTP surface.

pub mod handlers;
pub mod routes;
