//! Core invoice model, totals engine and business rules.
//!
//! This module provides the EN 16931 semantic model as plain Rust types,
//! the per-field rounding matrix, the totals engine and the rule
//! registry that presets plug into.

mod arith;
mod builder;
pub mod codes;
mod error;
mod invoice;
mod line;
mod party;
mod registry;
pub mod rounding;
mod totals;
mod types;
mod validation;

pub use builder::*;
pub use codes::CodeList;
pub use error::*;
pub use invoice::*;
pub use line::*;
pub use party::*;
pub use registry::*;
pub use rounding::{DEFAULT_DECIMALS, RoundingMatrix, round_half_up};
pub use totals::*;
pub use types::*;
pub use validation::{Rule, en16931_rules, validate, validate_all};

pub(crate) use validation::is_blank;
