//! # Shipfit Development Tools
//!
//! Command-line tools for development:
//! - Catalog and config validators
//! - Grid preview rendering
//! - Stats and permalink inspection

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod report;
pub mod validate;
