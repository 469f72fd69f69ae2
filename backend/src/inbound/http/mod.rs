//! HTTP inbound adapter exposing REST endpoints.

pub mod cache_control;
pub mod error;
pub mod health;
pub mod map;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod tracker;

pub use error::{ApiResult, json_error_handler};
