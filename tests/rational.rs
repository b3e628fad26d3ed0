use ratpack::radix;
use ratpack::{Context, Number, Rational};

fn r(p: i32, q: i32) -> Rational {
    Rational::new(Number::from_i32(p), Number::from_i32(q)).unwrap()
}

#[test]
fn scenario_div_by_zero_is_canonical_error() {
    // spec scenario 4
    let zero = Rational::zero();
    let err = zero.div(&zero).unwrap_err();
    assert_eq!(err.code() as u32, 0x8000_0000);
}

#[test]
fn scenario_mod_vs_rem_sign() {
    // spec scenario 9 & 10
    let a = radix::parse("1.5", 10).unwrap();
    let b = radix::parse("0.4", 10).unwrap();
    let got = a.modulo(&b).unwrap();
    assert!(got.equ(&r(3, 10)));

    let neg_a = radix::parse("-1.5", 10).unwrap();
    assert!(neg_a.rem(&b).unwrap().equ(&r(-3, 10)));
    assert!(neg_a.modulo(&b).unwrap().equ(&r(1, 10)));
}

#[test]
fn identity_laws() {
    let a = r(3, 7);
    assert!(a.add(&Rational::zero()).equ(&a));
    assert!(a.mul(&Rational::one()).equ(&a));
    assert!(a.div(&a).unwrap().equ(&Rational::one()));
    assert!(a.sub(&a).is_zero());
}

#[test]
fn sign_law() {
    let a = r(-3, 4);
    let b = r(5, -2);
    let product = a.mul(&b);
    assert_eq!(product.sign(), a.sign() * b.sign());
}

#[test]
fn commutativity_and_associativity() {
    let a = r(1, 3);
    let b = r(2, 5);
    let c = r(-7, 11);
    assert!(a.add(&b).equ(&b.add(&a)));
    assert!(a.add(&b).add(&c).equ(&a.add(&b.add(&c))));
    assert!(a.mul(&b).equ(&b.mul(&a)));
    assert!(a.mul(&b).mul(&c).equ(&a.mul(&b.mul(&c))));
}

#[test]
fn nonzero_denominator_invariant() {
    let a = r(1, 2);
    assert!(!a.denominator().is_zero());
    assert!(Rational::new(Number::one(), Number::zero()).is_err());
}

#[test]
fn comparisons_match_cross_multiplication() {
    assert!(r(1, 2).lt(&r(3, 4)));
    assert!(r(3, 4).gt(&r(1, 2)));
    assert!(r(-1, 2).lt(&r(1, 2)));
    assert!(r(1, -2).equ(&r(-1, 2)));
}

#[test]
fn context_rebuild_is_observable_via_tracing() {
    // Context::new logs through `tracing`; wiring a subscriber here
    // (rather than only in the library's own unit tests) exercises that
    // path the way a downstream binary would via `tracing-subscriber`.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let ctx = Context::new(16, 10).unwrap();
    assert_eq!(ctx.radix, 16);
}

#[test]
fn trim_bounds_growth_without_changing_value_much() {
    let ctx = Context::new(10, 6).unwrap();
    let huge = Rational::new(Number::factorial(40).unwrap(), Number::factorial(39).unwrap()).unwrap();
    let trimmed = huge.trim(&ctx);
    assert!(trimmed.numerator().cdigit() <= huge.numerator().cdigit());
}
