// error.rs
//
// Error taxonomy for the numeric core (component H).
//
// Every public operation returns `Result<T, RatpackError>` rather than
// the C ABI's out-parameter + numeric return code, but the codes
// themselves are kept stable since they are part of the historical
// Calculator wire format (see `ErrorCode`).

use std::fmt;

/// Stable numeric error codes, mirroring the `CALC_E_*` constants of the
/// original C ABI. Kept as a distinct type from [`RatpackError`] so the
/// numeric value can be recovered by callers that need ABI compatibility.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    DivideByZero = 0x8000_0000,
    Domain = 0x8000_0001,
    Indefinite = 0x8000_0002,
    PosInfinity = 0x8000_0003,
    NegInfinity = 0x8000_0004,
    InvalidRange = 0x8000_0006,
    OutOfMemory = 0x8000_0007,
    Overflow = 0x8000_0008,
    NoResult = 0x8000_0009,
    Internal = 0x8000_000A,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", *self as u32)
    }
}

/// Errors produced by the numeric core.
///
/// Deterministic errors (`DivideByZero`, `Domain`, `Overflow`,
/// `InvalidRange`) are pure functions of the input: they leave any
/// receiver value untouched and carry no extra allocation. Systemic
/// errors (`Internal`) additionally populate [`crate::Context::last_error`].
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum RatpackError {
    #[error("division by zero")]
    DivideByZero,

    #[error("input is not within the domain of this operation")]
    Domain,

    #[error("the result of this operation is undefined (indefinite)")]
    Indefinite,

    #[error("the result of this operation is positive infinity")]
    PosInfinity,

    #[error("the result of this operation is negative infinity")]
    NegInfinity,

    #[error("input is in domain but out of computable range")]
    InvalidRange,

    #[error("out of memory")]
    OutOfMemory,

    #[error("overflow converting to a bounded type")]
    Overflow,

    #[error("no result")]
    NoResult,

    #[error("internal failure: {0}")]
    Internal(String),
}

impl RatpackError {
    /// The stable numeric code for this error, matching the original
    /// ABI's `CALC_E_*` constants.
    pub fn code(&self) -> ErrorCode {
        match self {
            RatpackError::DivideByZero => ErrorCode::DivideByZero,
            RatpackError::Domain => ErrorCode::Domain,
            RatpackError::Indefinite => ErrorCode::Indefinite,
            RatpackError::PosInfinity => ErrorCode::PosInfinity,
            RatpackError::NegInfinity => ErrorCode::NegInfinity,
            RatpackError::InvalidRange => ErrorCode::InvalidRange,
            RatpackError::OutOfMemory => ErrorCode::OutOfMemory,
            RatpackError::Overflow => ErrorCode::Overflow,
            RatpackError::NoResult => ErrorCode::NoResult,
            RatpackError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// True for errors that originate from malformed input rather than
    /// resource exhaustion (see spec §7: deterministic vs. systemic).
    pub fn is_deterministic(&self) -> bool {
        !matches!(self, RatpackError::Internal(_) | RatpackError::OutOfMemory)
    }
}

pub type Result<T> = std::result::Result<T, RatpackError>;
