//! Arbitrary-precision sign-magnitude integers with an explicit
//! radix-point exponent (spec components A and B).
//!
//! [`Number`] is the leaf representation everything else in this crate
//! is built from: [`crate::rational::Rational`] pairs two of them,
//! [`crate::radix`] converts them to and from strings, and
//! [`crate::transcendental`] reduces every series evaluation down to
//! the operations in [`ops`].

mod digits;
mod ops;

pub use digits::Number;
