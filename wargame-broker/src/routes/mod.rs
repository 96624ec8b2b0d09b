//! HTTP route handlers

pub mod moves;
pub mod status;
