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

//! Stateless helper capabilities: safe arithmetic evaluation and
//! best-effort encyclopedia lookup.

pub mod calculator;
pub mod encyclopedia;

pub use calculator::evaluate;
pub use encyclopedia::WikipediaClient;
