//! # hd-core
//!
//! Shared foundation for the histdrift workspace: the workspace error type,
//! the tri-state [`Status`] model with its dominance aggregation rule, and
//! the [`Memo`] compute-once cell used for lazily derived check attributes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Memo, Status};

/// Workspace version, stamped into emitted artifacts.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
