//! # content-agent-rs
//!
//! AI-assisted content generation with WordPress publishing.
//!
//! Articles and multi-file projects are produced through a text-generation
//! endpoint, exported locally as markdown or HTML, and optionally pushed to a
//! self-hosted WordPress site or a WordPress.com site via their REST APIs.

pub mod ai;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod markdown;
pub mod media;
pub mod wordpress;

pub use error::{Error, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::Unsupported("media upload".to_string());
        assert!(err.to_string().contains("media upload"));
    }
}
