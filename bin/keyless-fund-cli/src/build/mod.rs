//! Build module for constructing keyless funding trees from payout files.

mod cmd;

pub use cmd::*;

pub use crate::common::{load_payouts, write_json, BytecodeArgs, LogArgs, Result};
