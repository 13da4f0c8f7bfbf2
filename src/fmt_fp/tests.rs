use super::decimal::{decompose, DigitLimit};
use super::{frexp, log10u};

#[test]
fn test_frexp() {
    // Note f64::MIN_POSITIVE is normalized - we want denormal.
    let min_pos_denormal = f64::from_bits(1);
    let min_neg_denormal = -min_pos_denormal;
    let cases = vec![
        (0.0, (0.0, 0)),
        (-0.0, (-0.0, 0)),
        (1.0, (0.5, 1)),
        (-1.0, (-0.5, 1)),
        (2.5, (0.625, 2)),
        (-2.5, (-0.625, 2)),
        (1024.0, (0.5, 11)),
        (f64::MAX, (0.9999999999999999, 1024)),
        (-f64::MAX, (-0.9999999999999999, 1024)),
        (f64::INFINITY, (f64::INFINITY, 0)),
        (f64::NEG_INFINITY, (f64::NEG_INFINITY, 0)),
        (f64::NAN, (f64::NAN, 0)),
        (min_pos_denormal, (0.5, -1073)),
        (min_neg_denormal, (-0.5, -1073)),
    ];

    for (x, (want_frac, want_exp)) in cases {
        let (frac, exp) = frexp(x);
        if x.is_nan() {
            assert!(frac.is_nan());
            continue;
        }
        assert_eq!(frac, want_frac);
        assert_eq!(frac.is_sign_negative(), want_frac.is_sign_negative());
        assert_eq!(exp, want_exp);
    }
}

#[test]
fn test_log10u() {
    assert_eq!(log10u(0), 0);
    assert_eq!(log10u(1), 0);
    assert_eq!(log10u(9), 0);
    assert_eq!(log10u(10), 1);
    assert_eq!(log10u(500), 2);
    assert_eq!(log10u(9999), 3);
    assert_eq!(log10u(70000), 4);
    assert_eq!(log10u(900000), 5);
    assert_eq!(log10u(3000000), 6);
    assert_eq!(log10u(50000000), 7);
    assert_eq!(log10u(100000000), 8);
    assert_eq!(log10u(1840683745), 9);
    assert_eq!(log10u(u32::MAX), 9);
}

// Helper for the oracle: (digits, point).
fn digits_of(y: f64, limit: DigitLimit) -> (String, i32) {
    let conv = decompose(y, limit);
    (conv.digits, conv.point)
}

#[test]
fn decompose_zero() {
    assert_eq!(
        digits_of(0.0, DigitLimit::Fractional(6)),
        ("0".to_string(), 1)
    );
    assert_eq!(digits_of(0.0, DigitLimit::Total(7)), ("0".to_string(), 1));
    assert!(decompose(-0.0, DigitLimit::Total(1)).negative);
    assert!(!decompose(0.0, DigitLimit::Total(1)).negative);
}

#[test]
fn decompose_integers() {
    assert_eq!(
        digits_of(1234.0, DigitLimit::Fractional(6)),
        ("1234".to_string(), 4)
    );
    assert_eq!(digits_of(1e9, DigitLimit::Fractional(0)), ("1".to_string(), 10));
    assert_eq!(
        digits_of(1e20, DigitLimit::Fractional(6)),
        ("1".to_string(), 21)
    );
    // Exactly representable large integer.
    assert_eq!(
        digits_of(340282366920938463463374607431768211456.0, DigitLimit::Fractional(0)),
        ("340282366920938463463374607431768211456".to_string(), 39)
    );
}

#[test]
fn decompose_fractions() {
    assert_eq!(
        digits_of(0.5, DigitLimit::Fractional(6)),
        ("5".to_string(), 0)
    );
    assert_eq!(
        digits_of(0.0001, DigitLimit::Total(6)),
        ("1".to_string(), -3)
    );
    assert_eq!(
        digits_of(123.456, DigitLimit::Fractional(2)),
        ("12346".to_string(), 3)
    );
}

#[test]
fn decompose_rounding_ties() {
    // Ties round to even under the default rounding mode.
    assert_eq!(digits_of(0.5, DigitLimit::Fractional(0)), ("0".to_string(), 1));
    assert_eq!(digits_of(1.5, DigitLimit::Fractional(0)), ("2".to_string(), 1));
    assert_eq!(digits_of(2.5, DigitLimit::Fractional(0)), ("2".to_string(), 1));
    assert_eq!(digits_of(3.5, DigitLimit::Fractional(0)), ("4".to_string(), 1));
}

#[test]
fn decompose_rounding_carries() {
    // Rounding up across a power of ten moves the point.
    assert_eq!(digits_of(9.99, DigitLimit::Total(2)), ("1".to_string(), 2));
    assert_eq!(
        digits_of(999.99, DigitLimit::Fractional(1)),
        ("1".to_string(), 4)
    );
    assert_eq!(digits_of(0.096, DigitLimit::Fractional(2)), ("1".to_string(), 0));
}

#[test]
fn decompose_total_budget() {
    assert_eq!(
        digits_of(1234567.0, DigitLimit::Total(6)),
        ("123457".to_string(), 7)
    );
    assert_eq!(
        digits_of(1234567.0, DigitLimit::Total(7)),
        ("1234567".to_string(), 7)
    );
    // Trailing zeros are trimmed: only significant digits come back.
    assert_eq!(
        digits_of(100000.0, DigitLimit::Total(6)),
        ("1".to_string(), 6)
    );
}

#[test]
fn decompose_subnormal() {
    let tiny = f64::from_bits(1);
    let conv = decompose(tiny, DigitLimit::Fractional(0));
    // 5e-324 rounds to zero at this budget.
    assert_eq!((conv.digits.as_str(), conv.point), ("0", 1));
    let conv = decompose(tiny, DigitLimit::Fractional(330));
    assert_eq!(conv.point, -323);
    assert!(conv.digits.starts_with('4')); // 4.94065...e-324
}
