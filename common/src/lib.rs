//! LedgerLock Common Types
//!
//! This crate contains the types shared across the LedgerLock crates:
//! account identifiers, strict amount parsing, and the error taxonomy.

pub mod amount;
pub mod error;
pub mod identifiers;

pub use amount::*;
pub use error::*;
pub use identifiers::*;
