//! Building blocks of the `keyless-fund` command-line tool.

mod cmd;
pub use cmd::*;

/// Build a funding tree from a payout file
pub mod build;
/// Shared argument groups, loaders and errors
pub mod common;
/// Re-check a funding tree report
pub mod verify;
