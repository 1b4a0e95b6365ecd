//! Storage Integration Tests
//!
//! Tests for the step log backends: lifecycle, concurrency, on-disk
//! compatibility, and properties shared by every backend.

#[path = "../common/mod.rs"]
mod common;

mod concurrency;
mod lifecycle;
