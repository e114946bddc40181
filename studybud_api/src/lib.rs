#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! HTTP surface for the studybud service.
//!
//! Thin axum handlers over the orchestration core; every decision of
//! consequence lives in `studybud_core`.

pub mod error;
pub mod routes;

pub use error::ApiError;
pub use routes::{AppState, ChatRequest, ChatResponse, build_router};
