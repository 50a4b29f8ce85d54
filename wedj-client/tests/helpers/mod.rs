//! Test Helper Utilities
//!
//! Shared utilities for testing wedj-client

#![allow(dead_code)]

pub mod fake_backend;

pub use fake_backend::{audio, image, FakeBackend};
