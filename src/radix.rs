// radix.rs
//
// Radix-aware string codec (component E): parsing a string into an
// exact [`Rational`] and formatting one back out, in any base from 2
// to 64, plus the `num_to_nRadixx` / `nRadixx_to_num` base-conversion
// helpers the original ABI exposed for moving a single `Number`'s
// mantissa between the internal radix and a working radix.

use crate::context::Context;
use crate::error::{RatpackError, Result};
use crate::number::Number;
use crate::rational::Rational;

/// Digit glyphs for radices up to 64: `0-9`, `A-Z`, `a-z`, `@`, `#`.
/// Matches the original engine's extended-radix alphabet (it supports
/// up to base 64 for its internal "any radix" scratch format).
const GLYPHS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz@#";

fn glyph_value(c: char) -> Option<u32> {
    GLYPHS.iter().position(|&g| g as char == c).map(|i| i as u32)
}

fn value_glyph(v: u32) -> char {
    GLYPHS[v as usize] as char
}

/// How a formatted string should present magnitude (spec component E).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberFormat {
    /// Plain positional notation, e.g. `123.456`.
    Float,
    /// `d.dddEsNN`, exponent always shown.
    Scientific,
    /// Like `Scientific` but the exponent is constrained to a multiple
    /// of 3, e.g. `123.456E+003`.
    Engineering,
}

/// Parses a signed, radix-`radix` string (optionally containing a
/// radix-point `.`) into an exact [`Rational`] using Horner's method:
/// each digit folds into the running magnitude as `acc = acc*radix +
/// digit`, and digits past the point additionally count towards a
/// denominator of `radix^fraction_digits`. Returning a `Rational`
/// (rather than coercing into a single `Number`) is what keeps this
/// exact: `Number`'s internal radix is `2^32`, so a literal like
/// `"0.1"` in base 10 has no finite binary expansion and would have to
/// be rounded if forced into one `Number` -- as a `p/q` pair, both `p`
/// and `q` are plain (always-exact) integers.
pub fn parse(s: &str, radix: u32) -> Result<Rational> {
    if !(2..=64).contains(&radix) {
        return Err(RatpackError::Domain);
    }
    let s = s.trim();
    if s.is_empty() {
        return Err(RatpackError::Domain);
    }

    let (negative, rest) = match s.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if rest.is_empty() {
        return Err(RatpackError::Domain);
    }

    let mut acc = Number::zero();
    let radix_num = Number::from_i32(radix as i32);
    let mut seen_point = false;
    let mut fraction_digits: i64 = 0;
    let mut any_digit = false;

    for c in rest.chars() {
        if c == '.' {
            if seen_point {
                return Err(RatpackError::Domain);
            }
            seen_point = true;
            continue;
        }
        let v = glyph_value(c).ok_or(RatpackError::Domain)?;
        if v >= radix {
            return Err(RatpackError::Domain);
        }
        any_digit = true;
        acc = acc.mul(&radix_num).add(&Number::from_i32(v as i32));
        if seen_point {
            fraction_digits += 1;
        }
    }
    if !any_digit {
        return Err(RatpackError::Domain);
    }

    let scale = radix_num.pow_u32(fraction_digits.max(0) as u32);
    let p = if negative { acc.neg() } else { acc };
    Rational::new(p, scale)
}

/// Formats `n` in the given radix, using `precision` significant
/// working-radix digits after the point for non-integral magnitudes.
/// This performs repeated-division digit extraction (the inverse of
/// the mantissa half of [`parse`]'s Horner fold): integer part digits
/// come out least-significant-first via `div_rem` by `radix`, then the
/// remaining fraction is extracted by repeated multiply-by-radix and
/// truncation. Only exact for dyadic magnitudes formatted to an even
/// radix; use [`format`] on the `Rational` itself to format an exact
/// `p/q` value without this rounding.
pub fn format_radix(n: &Number, radix: u32, precision: u32) -> Result<String> {
    if !(2..=64).contains(&radix) {
        return Err(RatpackError::Domain);
    }
    if n.is_zero() {
        return Ok("0".to_string());
    }

    let radix_num = Number::from_i32(radix as i32);
    let negative = n.is_negative();
    let mag = n.abs();

    // split into integer and fractional Number parts at exp == 0
    let (int_part, mut frac_part) = if mag.exp() >= 0 {
        (mag.clone(), Number::zero())
    } else {
        let (q, r) = mag.div_rem(&Number::one(), 0)?;
        (q, r)
    };

    let mut int_digits = Vec::new();
    let mut rest = int_part;
    if rest.is_zero() {
        int_digits.push('0');
    }
    while !rest.is_zero() {
        let (q, r) = rest.div_rem(&radix_num, 0)?;
        let d = r.to_i32().unwrap_or(0) as u32;
        int_digits.push(value_glyph(d));
        rest = q;
    }
    int_digits.reverse();

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.extend(int_digits);

    if !frac_part.is_zero() && precision > 0 {
        out.push('.');
        for _ in 0..precision {
            frac_part = frac_part.mul(&radix_num);
            let (digit_num, remainder) = frac_part.div_rem(&Number::one(), 0)?;
            let d = digit_num.to_i32().unwrap_or(0) as u32;
            out.push(value_glyph(d));
            frac_part = remainder;
            if frac_part.is_zero() {
                break;
            }
        }
    }

    Ok(out)
}

/// Formats an exact `p/q` rational directly (without first flattening
/// it to a `Number`, which would round): the integer part comes from
/// `p.div_rem(q)`, and each fractional digit is extracted by
/// multiplying the running remainder by the radix and dividing by `q`
/// again, exactly mirroring long division by hand. This is the inverse
/// of [`parse`].
pub fn format(r: &Rational, ctx: &Context) -> Result<String> {
    if r.is_zero() {
        return Ok("0".to_string());
    }
    let negative = r.is_negative();
    let p = r.numerator().abs();
    let q = r.denominator().abs();

    let (int_part, mut remainder) = p.div_rem(&q, 0)?;
    let radix_num = Number::from_i32(ctx.radix as i32);

    let mut int_digits = Vec::new();
    let mut rest = int_part;
    if rest.is_zero() {
        int_digits.push('0');
    }
    while !rest.is_zero() {
        let (quot, d) = rest.div_rem(&radix_num, 0)?;
        int_digits.push(value_glyph(d.to_i32().unwrap_or(0) as u32));
        rest = quot;
    }
    int_digits.reverse();

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.extend(int_digits);

    if !remainder.is_zero() {
        out.push(ctx.decimal_separator);
        for _ in 0..ctx.precision {
            remainder = remainder.mul(&radix_num);
            let (digit, next_remainder) = remainder.div_rem(&q, 0)?;
            out.push(value_glyph(digit.to_i32().unwrap_or(0) as u32));
            remainder = next_remainder;
            if remainder.is_zero() {
                break;
            }
        }
    }

    Ok(out)
}

/// Formats `r` in `ctx`'s radix under the given presentation `format`
/// (spec component E's `ratpack_number_format_type`): [`NumberFormat::Float`]
/// is plain positional notation via [`format`]; [`NumberFormat::Scientific`]
/// normalizes the magnitude to one nonzero digit before the point with
/// an explicit signed exponent; [`NumberFormat::Engineering`] is the
/// same but the exponent is rounded down to the nearest multiple of 3.
pub fn format_number(r: &Rational, format_kind: NumberFormat, ctx: &Context) -> Result<String> {
    match format_kind {
        NumberFormat::Float => format(r, ctx),
        NumberFormat::Scientific => format_scientific(r, ctx, 1),
        NumberFormat::Engineering => format_scientific(r, ctx, 3),
    }
}

/// Shared implementation of [`NumberFormat::Scientific`] and
/// [`NumberFormat::Engineering`]: `exponent_step` is `1` for plain
/// scientific notation (mantissa always in `[1, radix)`) or `3` for
/// engineering notation (exponent constrained to a multiple of 3,
/// mantissa in `[1, radix^3)`).
fn format_scientific(r: &Rational, ctx: &Context, exponent_step: i32) -> Result<String> {
    if r.is_zero() {
        return Ok("0".to_string());
    }
    let radix_num = Number::from_i32(ctx.radix as i32);
    let negative = r.is_negative();
    let magnitude = r.abs();

    let mut exponent = mantissa_exponent(&magnitude, &radix_num);
    if exponent_step > 1 {
        exponent -= exponent.rem_euclid(exponent_step);
    }

    let scale = Rational::from_number(radix_num.pow_u32(exponent.unsigned_abs()));
    let scaled = if exponent >= 0 {
        magnitude.div(&scale).expect("radix^n is never zero")
    } else {
        magnitude.mul(&scale)
    };

    let mut mantissa = format(&scaled, ctx)?;
    if negative {
        mantissa.insert(0, '-');
    }
    let exponent_sign = if exponent < 0 { '-' } else { '+' };
    Ok(format!("{mantissa}E{exponent_sign}{:03}", exponent.abs()))
}

/// `floor(log_radix(magnitude))`: how many radix-point places the
/// leading nonzero digit of a positive `magnitude` sits to the left of
/// the point (negative if `magnitude < 1`).
fn mantissa_exponent(magnitude: &Rational, radix_num: &Number) -> i32 {
    let radix_rat = Rational::from_number(radix_num.clone());
    let mut n = magnitude.clone();
    let mut exponent = 0i32;
    while n.ge(&radix_rat) {
        n = n.div(&radix_rat).expect("radix is never zero");
        exponent += 1;
    }
    while n.lt(&Rational::one()) {
        n = n.mul(&radix_rat);
        exponent -= 1;
    }
    exponent
}

/// Converts the mantissa of `n` (treated as an integer, `exp` ignored
/// beyond a domain check) from the internal radix into an explicit
/// digit vector in `to_radix`, mirroring the original ABI's
/// `num_to_nRadixx`.
pub fn num_to_radix_digits(n: &Number, to_radix: u32) -> Result<Vec<u32>> {
    if !(2..=64).contains(&to_radix) {
        return Err(RatpackError::Domain);
    }
    if n.exp() < 0 {
        return Err(RatpackError::Domain);
    }
    let radix_num = Number::from_i32(to_radix as i32);
    let mut rest = n.abs();
    let mut digits = Vec::new();
    if rest.is_zero() {
        digits.push(0);
    }
    while !rest.is_zero() {
        let (q, r) = rest.div_rem(&radix_num, 0)?;
        digits.push(r.to_i32().unwrap_or(0) as u32);
        rest = q;
    }
    Ok(digits)
}

/// The inverse of [`num_to_radix_digits`]: folds a most-significant-
/// first digit vector (each digit `< from_radix`) back into a
/// `Number`, mirroring `nRadixx_to_num`.
pub fn radix_digits_to_num(digits: &[u32], from_radix: u32) -> Result<Number> {
    if !(2..=64).contains(&from_radix) {
        return Err(RatpackError::Domain);
    }
    let radix_num = Number::from_i32(from_radix as i32);
    let mut acc = Number::zero();
    for &d in digits {
        if d >= from_radix {
            return Err(RatpackError::Domain);
        }
        acc = acc.mul(&radix_num).add(&Number::from_i32(d as i32));
    }
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_rational_one_third() {
        let ctx = Context::new(10, 20).unwrap();
        let r = Rational::new(Number::one(), Number::from_i32(3)).unwrap();
        assert_eq!(format(&r, &ctx).unwrap(), "0.33333333333333333333");
    }

    #[test]
    fn parse_and_format_decimal_roundtrip() {
        let ctx = Context::new(10, 8).unwrap();
        let r = parse("1234.5", 10).unwrap();
        assert_eq!(format(&r, &ctx).unwrap(), "1234.5");
    }

    #[test]
    fn parse_is_exact_for_non_dyadic_decimals() {
        // 0.1 has no finite binary expansion; parse must still be exact
        // as a p/q pair rather than rounding it into a single Number.
        let r = parse("0.1", 10).unwrap();
        assert!(r.equ(&Rational::new(Number::one(), Number::from_i32(10)).unwrap()));
    }

    #[test]
    fn parse_hex() {
        let r = parse("FF", 16).unwrap();
        let ctx = Context::new(16, 8).unwrap();
        assert_eq!(r.to_i32(&ctx).unwrap(), 255);
    }

    #[test]
    fn parse_negative() {
        let r = parse("-42", 10).unwrap();
        let ctx = Context::default();
        assert_eq!(r.to_i32(&ctx).unwrap(), -42);
    }

    #[test]
    fn parse_rejects_out_of_range_digit() {
        assert!(parse("129", 8).is_err());
    }

    #[test]
    fn parse_rejects_bad_radix() {
        assert!(parse("1", 1).is_err());
        assert!(parse("1", 65).is_err());
    }

    #[test]
    fn radix_digit_roundtrip() {
        let n = Number::from_i32(1000);
        let digits = num_to_radix_digits(&n, 16).unwrap();
        let back = radix_digits_to_num(&digits, 16).unwrap();
        assert_eq!(back.to_i32().unwrap(), 1000);
    }

    #[test]
    fn format_zero() {
        assert_eq!(format_radix(&Number::zero(), 10, 4).unwrap(), "0");
    }

    #[test]
    fn scientific_notation_normalizes_to_one_leading_digit() {
        let ctx = Context::new(10, 6).unwrap();
        let r = parse("12345", 10).unwrap();
        assert_eq!(
            format_number(&r, NumberFormat::Scientific, &ctx).unwrap(),
            "1.2345E+004"
        );
    }

    #[test]
    fn scientific_notation_handles_fractions_below_one() {
        let ctx = Context::new(10, 6).unwrap();
        let r = parse("0.00125", 10).unwrap();
        assert_eq!(
            format_number(&r, NumberFormat::Scientific, &ctx).unwrap(),
            "1.25E-003"
        );
    }

    #[test]
    fn engineering_notation_constrains_exponent_to_multiple_of_three() {
        let ctx = Context::new(10, 6).unwrap();
        let r = parse("12345", 10).unwrap();
        assert_eq!(
            format_number(&r, NumberFormat::Engineering, &ctx).unwrap(),
            "12.345E+003"
        );
    }

    #[test]
    fn format_number_float_matches_plain_format() {
        let ctx = Context::new(10, 6).unwrap();
        let r = parse("3.5", 10).unwrap();
        assert_eq!(
            format_number(&r, NumberFormat::Float, &ctx).unwrap(),
            format(&r, &ctx).unwrap()
        );
    }

    #[test]
    fn scientific_notation_of_zero_is_zero() {
        let ctx = Context::new(10, 6).unwrap();
        assert_eq!(
            format_number(&Rational::zero(), NumberFormat::Scientific, &ctx).unwrap(),
            "0"
        );
    }
}
