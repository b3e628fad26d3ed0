// transcendental.rs
//
// Transcendental functions via Taylor series (component G): exp, the
// six trigonometric and hyperbolic families, natural log, general
// `pow`, and `rat_fact` (factorial extended to non-integer rationals).
//
// Every series here is evaluated in exact `Rational` arithmetic and
// truncated once a term's magnitude drops below `10^-(precision+2)`,
// giving two guard digits against the final rounding the caller (the
// radix codec) performs when formatting the result.

use tracing::trace;

use crate::constants;
use crate::context::{AngleUnit, Context};
use crate::error::{RatpackError, Result};
use crate::number::Number;
use crate::rational::Rational;

fn threshold(ctx: &Context) -> Rational {
    let ten_pow = Number::from_i32(10).pow_u32(ctx.precision + 2);
    Rational::new(Number::one(), ten_pow).expect("10^n is never zero")
}

/// Converts an angle in `unit` to radians using the context's cached
/// `pi`.
fn to_radians(angle: &Rational, unit: AngleUnit, ctx: &Context) -> Rational {
    match unit {
        AngleUnit::Radians => angle.clone(),
        AngleUnit::Degrees => angle.mul(&ctx.pi).div(&Rational::from_i32(180)).unwrap(),
        AngleUnit::Gradians => angle.mul(&ctx.pi).div(&Rational::from_i32(200)).unwrap(),
    }
}

fn from_radians(angle: &Rational, unit: AngleUnit, ctx: &Context) -> Rational {
    match unit {
        AngleUnit::Radians => angle.clone(),
        AngleUnit::Degrees => angle.mul(&Rational::from_i32(180)).div(&ctx.pi).unwrap(),
        AngleUnit::Gradians => angle.mul(&Rational::from_i32(200)).div(&ctx.pi).unwrap(),
    }
}

/// Reduces `x` into `(-r, r]` by subtracting the nearest multiple of
/// `2*r`, the generic argument-reduction step every series evaluation
/// here uses to keep its argument inside a fast-converging range.
fn scale(x: &Rational, r: &Rational, ctx: &Context) -> Rational {
    let two_r = r.mul(&Rational::from_i32(2));
    let k = x.div(&two_r).unwrap().trunc().unwrap_or_else(|_| Rational::zero());
    let mut reduced = x.sub(&k.mul(&two_r));
    if reduced.gt(r) {
        reduced = reduced.sub(&two_r);
    } else if reduced.le(&r.neg()) {
        reduced = reduced.add(&two_r);
    }
    reduced.trim(ctx)
}

/// Reduces a radian angle into `(-pi, pi]`, the same range-reduction
/// the original engine's `scale2pi` performs before any trigonometric
/// series evaluation.
fn scale2pi(x: &Rational, ctx: &Context) -> Rational {
    scale(x, &ctx.pi, ctx)
}

/// `sin(x)` via the Taylor series `x - x^3/3! + x^5/5! - ...`, after
/// reducing `x` into `(-pi, pi]` so the series converges quickly.
pub fn sin(angle: &Rational, unit: AngleUnit, ctx: &Context) -> Result<Rational> {
    let x = scale2pi(&to_radians(angle, unit, ctx), ctx);
    let eps = threshold(ctx);
    let x2 = x.mul(&x);
    let mut term = x.clone();
    let mut sum = Rational::zero();
    let mut n: i32 = 1;
    loop {
        if term.abs().lt(&eps) {
            break;
        }
        if (n / 2) % 2 == 0 {
            sum = sum.add(&term).trim(ctx);
        } else {
            sum = sum.sub(&term).trim(ctx);
        }
        term = term
            .mul(&x2)
            .div(&Rational::from_i32((n + 1) * (n + 2)))
            .unwrap()
            .trim(ctx);
        n += 2;
    }
    trace!(terms = n / 2, "sin series converged");
    Ok(sum)
}

/// `cos(x) = sin(x + pi/2)`.
pub fn cos(angle: &Rational, unit: AngleUnit, ctx: &Context) -> Result<Rational> {
    let x = to_radians(angle, unit, ctx);
    let half_pi = ctx.pi.div(&Rational::from_i32(2)).unwrap();
    sin(&from_radians(&x.add(&half_pi), AngleUnit::Radians, ctx), AngleUnit::Radians, ctx)
}

/// `tan(x) = sin(x) / cos(x)`.
pub fn tan(angle: &Rational, unit: AngleUnit, ctx: &Context) -> Result<Rational> {
    let s = sin(angle, unit, ctx)?;
    let c = cos(angle, unit, ctx)?;
    if c.is_zero() {
        return Err(RatpackError::PosInfinity);
    }
    s.div(&c)
}

/// `atan(x)` via the same alternating series used to bootstrap `pi`,
/// with the large-argument identity `atan(x) = pi/2 - atan(1/x)`
/// (`x > 0`) or `atan(x) = -pi/2 - atan(1/x)` (`x < 0`) applied first
/// when `|x| > 1` so the series always sees an argument inside its
/// fast-converging range.
pub fn atan(x: &Rational, ctx: &Context) -> Result<Rational> {
    let one = Rational::one();
    if x.abs().gt(&one) {
        let half_pi = ctx.pi.div(&Rational::from_i32(2)).unwrap();
        let recip = one.div(x)?;
        let inner = atan_series(&recip, ctx);
        return Ok(if x.is_negative() {
            half_pi.neg().sub(&inner)
        } else {
            half_pi.sub(&inner)
        });
    }
    Ok(atan_series(x, ctx))
}

fn atan_series(x: &Rational, ctx: &Context) -> Rational {
    let eps = threshold(ctx);
    let x2 = x.mul(x);
    let mut term = x.clone();
    let mut sum = Rational::zero();
    let mut k: i32 = 1;
    loop {
        if term.abs().lt(&eps) {
            break;
        }
        if (k - 1) / 2 % 2 == 0 {
            sum = sum.add(&term.div(&Rational::from_i32(k)).unwrap()).trim(ctx);
        } else {
            sum = sum.sub(&term.div(&Rational::from_i32(k)).unwrap()).trim(ctx);
        }
        term = term.mul(&x2).trim(ctx);
        k += 2;
    }
    sum
}

/// `sqrt(x)` via Newton's method (`x > 0`), used by `asin`/`acos`.
/// Starts from a floating-point estimate of the square root and
/// refines with the exact rational Newton update
/// `y' = (y + x/y) / 2` until two successive iterates agree to the
/// context's precision.
pub fn sqrt(x: &Rational, ctx: &Context) -> Result<Rational> {
    if x.is_negative() {
        return Err(RatpackError::Domain);
    }
    if x.is_zero() {
        return Ok(Rational::zero());
    }
    let approx = x.to_i32(ctx).unwrap_or(1).max(1) as f64;
    let seed = approx.sqrt().max(1.0);
    let mut y = Rational::new(Number::from_u64(seed as u64), Number::one())
        .unwrap_or_else(|_| Rational::one());
    let eps = threshold(ctx);
    let mut converged = false;
    for _ in 0..128 {
        let next = y.add(&x.div(&y)?).div(&Rational::from_i32(2))?;
        if next.sub(&y).abs().lt(&eps) {
            y = next;
            converged = true;
            break;
        }
        y = next;
    }
    if !converged {
        let err = RatpackError::Internal("sqrt: no convergence after 128 iterations".to_string());
        ctx.record_error(&err);
        return Err(err);
    }
    Ok(y.trim(ctx))
}

/// `asin(x) = atan(x / sqrt(1 - x^2))`, `|x| <= 1`.
pub fn asin(x: &Rational, ctx: &Context) -> Result<Rational> {
    if x.abs().gt(&Rational::one()) {
        return Err(RatpackError::Domain);
    }
    if x.equ(&Rational::one()) {
        return Ok(ctx.pi.div(&Rational::from_i32(2)).unwrap());
    }
    if x.equ(&Rational::one().neg()) {
        return Ok(ctx.pi.div(&Rational::from_i32(2)).unwrap().neg());
    }
    let denom = sqrt(&Rational::one().sub(&x.mul(x)), ctx)?;
    atan(&x.div(&denom)?, ctx)
}

/// `acos(x) = pi/2 - asin(x)`.
pub fn acos(x: &Rational, ctx: &Context) -> Result<Rational> {
    Ok(ctx.pi.div(&Rational::from_i32(2)).unwrap().sub(&asin(x, ctx)?))
}

/// `exp(x)` via Taylor series `sum x^n/n!`, range-reduced by halving
/// `x` until `|x| < 1` and squaring the series result back `k` times
/// (`exp(x) = exp(x/2^k)^(2^k)`) to keep the series fast-converging
/// regardless of the input's magnitude.
pub fn exp(x: &Rational, ctx: &Context) -> Result<Rational> {
    let mut reduced = x.clone();
    let mut k: u32 = 0;
    let two = Rational::from_i32(2);
    while reduced.abs().gt(&Rational::one()) {
        reduced = reduced.div(&two)?;
        k += 1;
    }

    let eps = threshold(ctx);
    let mut term = Rational::one();
    let mut sum = Rational::zero();
    let mut n: i32 = 0;
    loop {
        if term.abs().lt(&eps) {
            break;
        }
        sum = sum.add(&term).trim(ctx);
        n += 1;
        term = term.mul(&reduced).div(&Rational::from_i32(n)).unwrap().trim(ctx);
    }
    trace!(terms = n, halvings = k, "exp series converged");

    for _ in 0..k {
        sum = sum.mul(&sum);
    }
    Ok(sum.trim(ctx))
}

/// `ln(x)`, `x > 0`. Delegates to the bootstrap series in
/// [`crate::constants`] at the context's working precision.
pub fn ln(x: &Rational, ctx: &Context) -> Result<Rational> {
    if x.is_zero() {
        return Err(RatpackError::NegInfinity);
    }
    if x.is_negative() {
        return Err(RatpackError::Domain);
    }
    Ok(constants::ln(x, ctx.precision).trim(ctx))
}

pub fn log10(x: &Rational, ctx: &Context) -> Result<Rational> {
    let ln10 = constants::ln(&Rational::from_i32(10), ctx.precision);
    Ok(ln(x, ctx)?.div(&ln10).unwrap())
}

/// Raises `base` to the integer power `k32` exactly, via
/// `Number::pow_u32` on numerator and denominator. `base == 0` is only
/// valid for `k32 >= 0` (negative gives [`RatpackError::DivideByZero`]).
fn int_pow(base: &Rational, k32: i32) -> Result<Rational> {
    if base.is_zero() {
        return if k32 == 0 {
            Ok(Rational::one())
        } else if k32 > 0 {
            Ok(Rational::zero())
        } else {
            Err(RatpackError::DivideByZero)
        };
    }
    if k32 >= 0 {
        let p = base.numerator().pow_u32(k32 as u32);
        let q = base.denominator().pow_u32(k32 as u32);
        Ok(Rational::new(p, q)?.reduce())
    } else {
        let p = base.numerator().pow_u32((-k32) as u32);
        let q = base.denominator().pow_u32((-k32) as u32);
        Ok(Rational::new(q, p)?.reduce())
    }
}

/// `x^(1/n)` via Newton's method (`x >= 0`, `n >= 1`): refines
/// `y' = ((n-1)*y + x/y^(n-1)) / n` starting from a floating-point
/// seed until two successive iterates agree to the context's
/// precision. Generalizes the two-iterate-update `sqrt` uses for
/// `n == 2`.
fn nth_root(x: &Rational, n: u32, ctx: &Context) -> Result<Rational> {
    if x.is_zero() {
        return Ok(Rational::zero());
    }
    if n == 1 {
        return Ok(x.clone());
    }
    let approx = x.to_i32(ctx).unwrap_or(1).max(1) as f64;
    let seed = approx.powf(1.0 / n as f64).max(1.0);
    let mut y = Rational::new(Number::from_u64(seed as u64), Number::one())
        .unwrap_or_else(|_| Rational::one());
    let eps = threshold(ctx);
    let n_rat = Rational::from_i32(n as i32);
    let n_minus_1 = Rational::from_i32(n as i32 - 1);
    let mut converged = false;
    for _ in 0..128 {
        let y_pow = int_pow(&y, n as i32 - 1)?;
        let next = n_minus_1
            .mul(&y)
            .add(&x.div(&y_pow)?)
            .div(&n_rat)
            .unwrap()
            .trim(ctx);
        if next.sub(&y).abs().lt(&eps) {
            y = next;
            converged = true;
            break;
        }
        y = next;
    }
    if !converged {
        let err = RatpackError::Internal(format!("nth_root: no convergence after 128 iterations (n={n})"));
        ctx.record_error(&err);
        return Err(err);
    }
    Ok(y)
}

/// `a^(p/q)` for integers `p`, `q` (`q > 0`), per the spec's dedicated
/// rational-exponent row: takes the real `q`th root of `|a|`, raises it
/// to the `p`th power, and reapplies `a`'s sign when `p` is odd. This
/// is the path that lets negative bases with odd-denominator exponents
/// (e.g. `(-8)^(1/3) == -2`) resolve to a real result instead of the
/// `Domain` error a general `exp(p/q * ln(a))` evaluation would give.
fn pow_num_den(a: &Rational, p: i32, q: i32, ctx: &Context) -> Result<Rational> {
    let (p, q) = if q < 0 { (-p, -q) } else { (p, q) };
    if q == 0 {
        return Err(RatpackError::Domain);
    }
    if a.is_negative() && q % 2 == 0 {
        return Err(RatpackError::Domain);
    }
    let negative_result = a.is_negative() && p % 2 != 0;
    let magnitude = a.abs();

    let root = nth_root(&magnitude, q as u32, ctx)?;
    let mut result = int_pow(&root, p)?;
    if negative_result {
        result = result.neg();
    }

    let check = int_pow(&root, q)?;
    let eps = threshold(ctx);
    let tolerance = magnitude.mul(&eps).add(&eps);
    if check.sub(&magnitude).abs().gt(&tolerance) {
        let err = RatpackError::Internal(format!(
            "pow_num_den: root verification failed for exponent {p}/{q}"
        ));
        ctx.record_error(&err);
        return Err(err);
    }

    Ok(result.trim(ctx))
}

/// `base^exponent`. Integer exponents take the exact path
/// (`Number::pow_u32`); rational exponents with a negative base try
/// the perfect-root path (`pow_num_den`) before falling back to
/// `exp(exponent * ln(base))`, which requires `base > 0`.
pub fn pow(base: &Rational, exponent: &Rational, ctx: &Context) -> Result<Rational> {
    if let Ok(k) = exponent.to_exact_integer(ctx) {
        if let Ok(k32) = k.to_i32() {
            return int_pow(base, k32);
        }
    }
    if base.is_negative() {
        if let (Ok(p), Ok(q)) = (
            exponent.numerator().to_i32(),
            exponent.denominator().to_i32(),
        ) {
            if let Ok(result) = pow_num_den(base, p, q, ctx) {
                return Ok(result);
            }
        }
        return Err(RatpackError::Domain);
    }
    exp(&exponent.mul(&ln(base, ctx)?), ctx)
}

/// Hyperbolic sine/cosine/tangent via `exp`.
pub fn sinh(x: &Rational, ctx: &Context) -> Result<Rational> {
    let ex = exp(x, ctx)?;
    let e_neg_x = Rational::one().div(&ex)?;
    Ok(ex.sub(&e_neg_x).div(&Rational::from_i32(2)).unwrap())
}

pub fn cosh(x: &Rational, ctx: &Context) -> Result<Rational> {
    let ex = exp(x, ctx)?;
    let e_neg_x = Rational::one().div(&ex)?;
    Ok(ex.add(&e_neg_x).div(&Rational::from_i32(2)).unwrap())
}

pub fn tanh(x: &Rational, ctx: &Context) -> Result<Rational> {
    let s = sinh(x, ctx)?;
    let c = cosh(x, ctx)?;
    s.div(&c)
}

/// `asinh(x) = ln(x + sqrt(x^2 + 1))`.
pub fn asinh(x: &Rational, ctx: &Context) -> Result<Rational> {
    let inner = sqrt(&x.mul(x).add(&Rational::one()), ctx)?;
    ln(&x.add(&inner), ctx)
}

/// `acosh(x) = ln(x + sqrt(x^2 - 1))`, `x >= 1`.
pub fn acosh(x: &Rational, ctx: &Context) -> Result<Rational> {
    if x.lt(&Rational::one()) {
        return Err(RatpackError::Domain);
    }
    let inner = sqrt(&x.mul(x).sub(&Rational::one()), ctx)?;
    ln(&x.add(&inner), ctx)
}

/// `atanh(x) = 0.5 * ln((1+x)/(1-x))`, `|x| < 1`.
pub fn atanh(x: &Rational, ctx: &Context) -> Result<Rational> {
    if x.abs().ge(&Rational::one()) {
        return Err(RatpackError::Domain);
    }
    let ratio = Rational::one().add(x).div(&Rational::one().sub(x))?;
    Ok(ln(&ratio, ctx)?.div(&Rational::from_i32(2)).unwrap())
}

/// Factorial extended to non-integer rationals via the Gamma function
/// identity `k! = Gamma(k+1)`. Nonnegative integers take the exact
/// path through [`Number::factorial`]; negative integers are
/// [`RatpackError::Indefinite`] (distinct from `Number::factorial`'s
/// `Domain`, per DESIGN.md); any other value uses Stirling's
/// asymptotic series for `ln(Gamma(k+1))`, which is only a finite-
/// precision approximation rather than an exact rational result.
pub fn rat_fact(k: &Rational, ctx: &Context) -> Result<Rational> {
    if let Ok(n) = k.to_exact_integer(ctx) {
        if let Ok(k32) = n.to_i32() {
            if k32 < 0 {
                return Err(RatpackError::Indefinite);
            }
            return Ok(Rational::from_number(Number::factorial(k32)?));
        }
    }
    if k.le(&Rational::one().neg()) {
        return Err(RatpackError::Domain);
    }
    let x = k.add(&Rational::one());
    let two_pi = ctx.pi.mul(&Rational::from_i32(2));
    let ln_two_pi_x = ln(&two_pi.mul(&x), ctx)?;
    let stirling_ln_gamma = x
        .mul(&ln(&x, ctx)?)
        .sub(&x)
        .add(&ln_two_pi_x.div(&Rational::from_i32(2)).unwrap())
        .add(
            &Rational::one()
                .div(&Rational::from_i32(12).mul(&x))?,
        );
    exp(&stirling_ln_gamma, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Context {
        Context::new(10, 20).unwrap()
    }

    #[test]
    fn sin_of_zero_is_zero() {
        let c = ctx();
        let r = sin(&Rational::zero(), AngleUnit::Radians, &c).unwrap();
        assert!(r.abs().lt(&Rational::new(Number::one(), Number::from_i32(1_000_000)).unwrap()));
    }

    #[test]
    fn cos_of_zero_is_one() {
        let c = ctx();
        let r = cos(&Rational::zero(), AngleUnit::Radians, &c).unwrap();
        assert!(r.sub(&Rational::one()).abs().lt(&Rational::new(Number::one(), Number::from_i32(1_000_000)).unwrap()));
    }

    #[test]
    fn exp_of_zero_is_one() {
        let c = ctx();
        let r = exp(&Rational::zero(), &c).unwrap();
        assert!(r.equ(&Rational::one()));
    }

    #[test]
    fn ln_of_one_is_zero() {
        let c = ctx();
        let r = ln(&Rational::one(), &c).unwrap();
        assert!(r.abs().lt(&Rational::new(Number::one(), Number::from_i32(1_000_000)).unwrap()));
    }

    #[test]
    fn ln_of_zero_is_neg_infinity_error() {
        let c = ctx();
        assert_eq!(ln(&Rational::zero(), &c).unwrap_err(), RatpackError::NegInfinity);
    }

    #[test]
    fn pow_integer_exponent_is_exact() {
        let c = ctx();
        let r = pow(&Rational::from_i32(2), &Rational::from_i32(10), &c).unwrap();
        assert!(r.equ(&Rational::from_i32(1024)));
    }

    #[test]
    fn fact_matches_integer_factorial() {
        let c = ctx();
        let r = rat_fact(&Rational::from_i32(5), &c).unwrap();
        assert!(r.equ(&Rational::from_i32(120)));
    }

    #[test]
    fn fact_negative_integer_is_indefinite() {
        let c = ctx();
        assert_eq!(
            rat_fact(&Rational::from_i32(-1), &c).unwrap_err(),
            RatpackError::Indefinite
        );
    }

    #[test]
    fn sqrt_of_four_is_two() {
        let c = ctx();
        let r = sqrt(&Rational::from_i32(4), &c).unwrap();
        assert!(r.sub(&Rational::from_i32(2)).abs().lt(&Rational::new(Number::one(), Number::from_i32(1_000_000)).unwrap()));
    }

    #[test]
    fn pow_negative_base_odd_cube_root_is_negative_two() {
        let c = ctx();
        let third = Rational::new(Number::one(), Number::from_i32(3)).unwrap();
        let r = pow(&Rational::from_i32(-8), &third, &c).unwrap();
        assert!(r.add(&Rational::from_i32(2)).abs().lt(&Rational::new(Number::one(), Number::from_i32(1_000_000)).unwrap()));
    }

    #[test]
    fn pow_negative_base_even_root_is_domain_error() {
        let c = ctx();
        let half = Rational::new(Number::one(), Number::from_i32(2)).unwrap();
        assert_eq!(pow(&Rational::from_i32(-4), &half, &c).unwrap_err(), RatpackError::Domain);
    }

    #[test]
    fn pow_num_den_matches_int_pow_for_integer_roots() {
        let c = ctx();
        let r = pow_num_den(&Rational::from_i32(2), 3, 1, &c).unwrap();
        assert!(r.equ(&Rational::from_i32(8)));
    }

    #[test]
    fn scale_reduces_into_bounded_range() {
        let c = ctx();
        let r = Rational::from_i32(5);
        let reduced = scale(&r, &Rational::from_i32(2), &c);
        assert!(reduced.le(&Rational::from_i32(2)));
        assert!(reduced.gt(&Rational::from_i32(2).neg()));
    }

    #[test]
    fn sin_series_trims_without_losing_accuracy() {
        let c = ctx();
        let r = sin(&Rational::from_i32(1), AngleUnit::Radians, &c).unwrap();
        // sin(1) ~= 0.8414709848
        let expected = Rational::new(Number::from_i32(84147098), Number::from_i32(100_000_000)).unwrap();
        assert!(r.sub(&expected).abs().lt(&Rational::new(Number::one(), Number::from_i32(1_000_000)).unwrap()));
    }
}
