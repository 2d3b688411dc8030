//! Integration test suite for wikins
//!
//! End-to-end tests through the public API and the `wikins` binary. None of them touch
//! the network: cache tests use the stub source from `test_utils`, binary tests stick
//! to commands that need no fetch.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cache**: concurrent loading and rendering through the public API
//! - **cli**: the `wikins` binary (host resolution, config management, errors)
//! - **config**: configuration files feeding host resolution and the cache

mod cache;
mod cli;
mod config;
