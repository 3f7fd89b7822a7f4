//! Strict transaction amount parsing.
//!
//! Amounts arrive as raw text from loosely-typed callers. They are parsed
//! into a [`Decimal`] exactly once, before any collaborator is contacted,
//! and anything that is not a plain finite decimal is rejected.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{LedgerLockError, Result};

/// Parse a raw amount string into a [`Decimal`].
///
/// Surrounding whitespace is tolerated; empty input, `NaN`, `Infinity` and
/// any other non-decimal text fail with [`LedgerLockError::InvalidAmount`].
/// `Decimal` has no NaN or infinite states, so a successful parse is a
/// finite number by construction.
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LedgerLockError::InvalidAmount {
            input: raw.to_string(),
        });
    }

    Decimal::from_str(trimmed).map_err(|_| LedgerLockError::InvalidAmount {
        input: raw.to_string(),
    })
}
