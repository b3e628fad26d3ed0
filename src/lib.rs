/*!
`ratpack` is an arbitrary-precision rational arithmetic library for a
calculator engine, modeled on the classic "Ratpack" number core: every
value is an exact fraction of two sign-magnitude bignums rather than a
fixed-width float, so results stay exact until a caller explicitly asks
for a formatted, rounded string.

The library is organized around four layers:
  - [`number`]: [`Number`], the sign-magnitude arbitrary-precision
    integer with an explicit radix-point exponent, and its school-method
    arithmetic.
  - [`rational`]: [`Rational`], an exact `p/q` pair of `Number`s, with
    arithmetic, comparisons, bitwise/shift operations, and the
    precision-bounded `trim`/`flat` normalization steps that keep
    storage from growing without bound.
  - [`radix`]: parsing and formatting a `Number` in any base from 2 to
    64.
  - [`transcendental`]: `sin`/`cos`/`tan` and their inverses and
    hyperbolic counterparts, `exp`/`ln`/`pow`, and `rat_fact`, all
    evaluated as Taylor (or Taylor-adjacent) series in exact rational
    arithmetic.

[`Context`] threads the working radix, precision, and the constants
derived from them (`pi`, `ln(BASE)`, `ln(radix)`) through the API in
place of the original engine's process-global tuning state.
*/

mod constants;
pub mod context;
pub mod error;
pub mod number;
pub mod radix;
pub mod rational;
pub mod transcendental;

pub use crate::context::{AngleUnit, Context};
pub use crate::error::{ErrorCode, RatpackError, Result};
pub use crate::number::Number;
pub use crate::rational::Rational;
