//! Keyless funding trees.
//!
//! Funds an ordered list of payouts through a tree of pre-signed keyless contract deployments, so
//! that a single root sender has to be funded from outside.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod constants;

mod builder;
pub use builder::*;

mod encoder;
pub use encoder::*;

mod error;
pub use error::*;

mod funding;
pub use funding::*;

mod partition;
pub use partition::*;

mod search;
pub use search::*;

mod tree;
pub use tree::*;

mod tx;
pub use tx::*;

mod types;
pub use types::*;
