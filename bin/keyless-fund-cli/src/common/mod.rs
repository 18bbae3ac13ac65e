mod bytecode;
mod error;
mod logging;
mod output;
mod payouts;

pub use bytecode::*;
pub use error::*;
pub use logging::*;
pub use output::*;
pub use payouts::*;
