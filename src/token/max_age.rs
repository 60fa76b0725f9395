//! Compact duration-literal parsing for the token max age.
//!
//! Accepts composable day/hour/minute literals: `"20m"`, `"2h"`, `"1d"`,
//! `"1d2h30m"`. Units must appear in order and each at most once.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MaxAgeError {
    #[error("empty duration literal")]
    Empty,
    #[error("unexpected character {0:?} in duration literal")]
    UnexpectedChar(char),
    #[error("duration component without a value")]
    MissingValue,
    #[error("duration units out of order or repeated")]
    UnitOrder,
    #[error("duration literal overflows")]
    Overflow,
}

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * 60;
const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Parse a compact duration literal into a `Duration`.
pub fn parse_max_age(literal: &str) -> Result<Duration, MaxAgeError> {
    let literal = literal.trim();
    if literal.is_empty() {
        return Err(MaxAgeError::Empty);
    }

    let mut total_secs = 0u64;
    let mut value: Option<u64> = None;
    // d > h > m; strictly decreasing across components
    let mut last_rank = 4u8;

    for c in literal.chars() {
        if let Some(digit) = c.to_digit(10) {
            let next = value
                .unwrap_or(0)
                .checked_mul(10)
                .and_then(|v| v.checked_add(u64::from(digit)))
                .ok_or(MaxAgeError::Overflow)?;
            value = Some(next);
            continue;
        }

        let (rank, secs) = match c {
            'd' => (3, SECS_PER_DAY),
            'h' => (2, SECS_PER_HOUR),
            'm' => (1, SECS_PER_MINUTE),
            other => return Err(MaxAgeError::UnexpectedChar(other)),
        };

        if rank >= last_rank {
            return Err(MaxAgeError::UnitOrder);
        }
        last_rank = rank;

        let v = value.take().ok_or(MaxAgeError::MissingValue)?;
        total_secs = v
            .checked_mul(secs)
            .and_then(|s| total_secs.checked_add(s))
            .ok_or(MaxAgeError::Overflow)?;
    }

    if value.is_some() {
        // trailing digits without a unit
        return Err(MaxAgeError::MissingValue);
    }

    Ok(Duration::from_secs(total_secs))
}
