//! HTTP layer for Chatdeck.
//!
//! # Architecture
//!
//! - [`api::ChatApi`]: trait describing every backend endpoint the UI consumes
//! - [`http::HttpApiClient`]: `reqwest` implementation with bearer auth and timeouts
//! - [`error::ApiError`]: typed failures, including the backend's `message`

pub mod api;
pub mod error;
pub mod http;

pub use api::{ChatApi, ChatRequest};
pub use error::{ApiError, ApiResult};
pub use http::HttpApiClient;
