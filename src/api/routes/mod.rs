//! HTTP route handlers

pub mod health;
pub mod info;
pub mod logs;
pub mod metrics;
pub mod status;
