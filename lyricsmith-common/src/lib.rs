//! # Lyricsmith Common Library
//!
//! Shared code for the lyricsmith services:
//! - Configuration file model and loading
//! - Upload work directory resolution
//! - Common error type

pub mod config;
pub mod error;

pub use error::{Error, Result};
