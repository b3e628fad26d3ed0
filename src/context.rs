// context.rs
//
// Explicit evaluation context (component F/H redesign): the original
// ABI kept working radix, precision and the derived trigonometric/log
// constants as process-global mutable state, refreshed by calling
// `ChangeConstants`. Here that state is an ordinary value threaded
// through the API by reference, and `last_error` is a field on it
// instead of a global `errno`-style slot. `last_error` sits behind a
// `RefCell` rather than requiring `&mut Context` everywhere: every
// arithmetic entry point in `rational::ops`/`transcendental` takes
// `&Context`, and a systemic failure needs to record itself from deep
// inside one of those calls without threading `&mut` through the whole
// call graph -- the same shape as the original ABI's `errno`-style slot
// being writable from anywhere without a mutable handle.

use std::cell::RefCell;

use tracing::debug;

use crate::constants;
use crate::error::{RatpackError, Result};
use crate::rational::Rational;

/// Which unit an angle argument/result is expressed in, for the
/// trigonometric functions in [`crate::transcendental`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AngleUnit {
    Degrees,
    Radians,
    Gradians,
}

/// Evaluation context: working radix, working precision, and the
/// constants derived from them.
#[derive(Clone, Debug)]
pub struct Context {
    pub radix: u32,
    pub precision: u32,
    pub decimal_separator: char,
    pub angle_unit: AngleUnit,

    /// `ln(BASE) / ln(radix)`: how many working-radix digits one
    /// internal `BASE`-digit is worth, used by [`crate::rational::Rational::trim`]
    /// to bound digit growth. Kept as an exact `Rational` (the same
    /// representation `pi`/`ln_base`/`ln_radix` already use) rather
    /// than a floating-point approximation -- this is the one precision-
    /// control quantity every Taylor-series kernel in the crate reads.
    pub(crate) digit_ratio: Rational,
    pub(crate) pi: Rational,
    pub(crate) ln_base: Rational,
    pub(crate) ln_radix: Rational,

    last_error: RefCell<Option<String>>,
}

impl Context {
    /// Builds a context for the given working radix (`2..=64`) and
    /// precision (user-radix significant digits, `>= 1`), computing
    /// `pi` and the log constants at that precision.
    pub fn new(radix: u32, precision: u32) -> Result<Self> {
        if !(2..=64).contains(&radix) {
            return Err(RatpackError::Domain);
        }
        if precision == 0 {
            return Err(RatpackError::Domain);
        }

        debug!(radix, precision, "building ratpack context");

        let pi = constants::compute_pi(precision);
        let ln_base = constants::compute_ln_base(precision);
        let ln_radix = constants::compute_ln_radix(radix, precision);
        let digit_ratio = ln_base
            .div(&ln_radix)
            .expect("ln(radix) is nonzero for radix >= 2");

        Ok(Context {
            radix,
            precision,
            decimal_separator: '.',
            angle_unit: AngleUnit::Degrees,
            digit_ratio,
            pi,
            ln_base,
            ln_radix,
            last_error: RefCell::new(None),
        })
    }

    /// Recomputes the derived constants for a new radix/precision pair
    /// in place, mirroring the original ABI's `ChangeConstants`.
    pub fn change_constants(&mut self, radix: u32, precision: u32) -> Result<()> {
        let fresh = Context::new(radix, precision)?;
        let last_error = self.last_error.get_mut().take();
        *self = fresh;
        *self.last_error.get_mut() = last_error;
        Ok(())
    }

    /// The last systemic error recorded against this context, if any
    /// (see [`RatpackError::is_deterministic`]).
    pub fn last_error(&self) -> Option<String> {
        self.last_error.borrow().clone()
    }

    pub fn clear_last_error(&self) {
        *self.last_error.borrow_mut() = None;
    }

    /// Records `err` as the context's last systemic failure, unless it
    /// is one of the deterministic, input-driven errors -- those are
    /// fully described by their return value and don't need a side
    /// channel. Called from series/root-finding kernels that detect a
    /// non-convergent iteration (see `transcendental::pow_num_den`,
    /// `transcendental::sqrt`).
    pub(crate) fn record_error(&self, err: &RatpackError) {
        if !err.is_deterministic() {
            *self.last_error.borrow_mut() = Some(err.to_string());
        }
    }

    /// `pi` at this context's working precision.
    pub fn pi(&self) -> &Rational {
        &self.pi
    }

    /// `ln(2^32)` at this context's working precision.
    pub fn ln_base(&self) -> &Rational {
        &self.ln_base
    }

    /// `ln(radix)` at this context's working precision.
    pub fn ln_radix(&self) -> &Rational {
        &self.ln_radix
    }
}

impl Default for Context {
    /// Radix 10, 32 significant digits -- the original engine's
    /// out-of-the-box calculator defaults.
    fn default() -> Self {
        Context::new(10, 32).expect("default context parameters are always valid")
    }
}
