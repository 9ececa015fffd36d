//! # release-kit
//!
//! Builds a structured release record from two sources:
//!
//! - the `Unreleased` section of a Markdown changelog, split into typed
//!   changes and free-form notes, and
//! - dependency bump commits written by Dependabot or Renovate, each tagged
//!   with the commit hash and pull request number it came from.
//!
//! The result is merged into a previously stored record without duplicating
//! what is already there.
//!
//! ## Quick Start
//!
//! ```rust
//! use release_kit::classify::ClassifierConfig;
//! use release_kit::data::{to_yaml, Document};
//! use release_kit::generate::generate;
//! use release_kit::git::Commit;
//!
//! let changelog = "## Unreleased\n### Breaking\n- Dropped the old API\n";
//! let commits = [Commit::new(
//!     "0123abcd",
//!     "dependabot[bot] <support@github.com>",
//!     "chore(deps): bump serde from 1.0.1 to 1.0.2 (#12)",
//! )];
//!
//! let document = generate(
//!     Document::default(),
//!     changelog,
//!     &commits,
//!     &ClassifierConfig::default(),
//! );
//! assert_eq!(document.changes.len(), 1);
//! assert_eq!(document.dependencies[0].meta.pr.as_deref(), Some("12"));
//! print!("{}", to_yaml(&document));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod changelog;
pub mod classify;
pub mod cli;
pub mod data;
pub mod generate;
pub mod git;
pub mod utils;

pub use crate::cli::Cli;

/// The current version of release-kit.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
