//! Verify module for re-checking funding tree reports.

mod cmd;

pub use cmd::*;

pub use crate::common::{BytecodeArgs, CliError, LogArgs, Result};
