//! Floating-point rendering: assembles the decimal oracle's digits into
//! `%f`/`%e`/`%g` text with locale decimal point and grouping.

mod decimal;
#[cfg(test)]
mod tests;

use crate::locale::Locale;
use crate::printf_impl::{emit_field, ConversionSpec, Error, ModifierFlags, PendingField};
use crate::sink::OutputSink;
use decimal::{decompose, DigitLimit};

// Number of binary digits in the mantissa, including the implicit 1.
const MANTISSA_BITS: usize = f64::MANTISSA_DIGITS as usize;

// Break a floating point number into a normalized fraction and a power of 2.
// The fraction's magnitude will either be 0, or in the range [1/2, 1).
// We have value = frac * 2^exp.
fn frexp(x: f64) -> (f64, i32) {
    const EXPLICIT_MANTISSA_BITS: i32 = MANTISSA_BITS as i32 - 1;
    const EXPONENT_BIAS: i32 = 1023;
    let mut i = x.to_bits();
    let ee = ((i >> EXPLICIT_MANTISSA_BITS) & 0x7ff) as i32; // exponent
    if ee == 0 {
        if x == 0.0 {
            (x, 0)
        } else {
            // Subnormal. Scale up.
            let (x, e) = frexp(x * 2.0f64.powi(64));
            (x, e - 64)
        }
    } else if ee == 0x7ff {
        // Inf or NaN.
        (x, 0)
    } else {
        // Normal. The mantissa is conceptually in the range [1, 2), but we
        // want to return it in the range [1/2, 1); remove the exponent bias
        // but increase the exponent by 1.
        let e = ee - (EXPONENT_BIAS - 1);
        i &= 0x800fffffffffffff;
        i |= (EXPONENT_BIAS as u64 - 1) << EXPLICIT_MANTISSA_BITS;
        (f64::from_bits(i), e)
    }
}

// Return floor of log base 10 of an unsigned value.
// The log base 10 of 0 is treated as 0, for convenience.
fn log10u(x: u32) -> i32 {
    if x >= 1_000_000_000 {
        return 9;
    }
    let mut result = 0;
    let mut prod = 10;
    while prod <= x {
        result += 1;
        prod *= 10;
    }
    result
}

/// Render the float `y` into the sink under the given width, precision,
/// flags, and locale. Non-finite values bypass the oracle entirely.
pub(crate) fn format_float(
    sink: &mut OutputSink,
    y: f64,
    width: usize,
    prec: Option<usize>,
    flags: ModifierFlags,
    locale: &Locale,
    spec: ConversionSpec,
) -> Result<(), Error> {
    use ConversionSpec as CS;
    debug_assert!(matches!(
        spec,
        CS::e | CS::E | CS::f | CS::F | CS::g | CS::G
    ));
    let lower = spec.is_lower();
    let sign: Option<u8> = match (y.is_sign_negative(), flags.mark_pos, flags.pad_pos) {
        (true, _, _) => Some(b'-'),
        (false, true, _) => Some(b'+'),
        (false, false, true) => Some(b' '),
        (false, false, false) => None,
    };

    if !y.is_finite() {
        let body: &[u8] = match (y.is_nan(), lower) {
            (true, true) => b"nan",
            (true, false) => b"NAN",
            (false, true) => b"inf",
            (false, false) => b"INF",
        };
        // Non-finite values are space padded, never zero padded.
        return emit_field(
            sink,
            &PendingField {
                body,
                sign,
                prefix: None,
                dprec: 0,
                width,
                left_adj: flags.left_adj,
                zero_pad: false,
            },
        );
    }

    // "If the precision is missing, it is taken as 6."
    let prec = prec.unwrap_or(6);
    let e_requested = matches!(spec, CS::e | CS::E);
    let g_mode = matches!(spec, CS::g | CS::G);

    // The oracle's digit budget. For e/E the precision counts digits after
    // the point, so one more in total; for g/G it is the total significant
    // digits ("if the precision is zero, it is treated as 1").
    let total_digits = if e_requested { prec + 1 } else { prec.max(1) };
    let limit = if e_requested || g_mode {
        DigitLimit::Total(total_digits)
    } else {
        DigitLimit::Fractional(prec)
    };
    let conv = decompose(y, limit);
    debug_assert_eq!(conv.negative, y.is_sign_negative());
    let digits = conv.digits.as_bytes();
    let ndig = digits.len();
    let point = conv.point;

    // Choose the presentation. e-style tracks total significant digits,
    // f-style tracks fractional digits.
    let (e_style, digit_budget): (bool, usize) = if g_mode {
        // "Style e is used if the exponent from its conversion is less
        // than -4 or greater than or equal to the precision."
        if point > -4 && point as i64 <= total_digits as i64 {
            let frac = if flags.alt_form {
                total_digits as i64 - point as i64
            } else {
                // Trailing zeros are trimmed: the oracle returned only
                // significant digits.
                ndig as i64 - point as i64
            };
            (false, frac.max(0) as usize)
        } else {
            (true, if flags.alt_form { total_digits } else { ndig })
        }
    } else if e_requested {
        (true, total_digits)
    } else {
        (false, prec)
    };

    let mut dp_buf = [0u8; 4];
    let dp = locale.decimal_point.encode_utf8(&mut dp_buf).as_bytes();

    // Exponent text for e-style: the letter, a mandatory sign, and at
    // least two digits.
    let estr: String = if e_style {
        let exp = point - 1;
        format!(
            "{}{}{:02}",
            if lower { 'e' } else { 'E' },
            if exp < 0 { '-' } else { '+' },
            exp.unsigned_abs()
        )
    } else {
        String::new()
    };

    // Grouping applies to the integer portion of f-style output only.
    let grouped = flags.grouped && locale.thousands_sep.is_some() && !e_style && point > 0;

    // The exact body length, which drives width padding.
    let size: usize = if e_style {
        let frac = digit_budget - 1;
        let point_len = if frac > 0 || flags.alt_form {
            dp.len()
        } else {
            0
        };
        1 + point_len + frac + estr.len()
    } else {
        let int_len = if point > 0 { point as usize } else { 1 };
        let mut n = int_len;
        if grouped {
            let sep_len = locale.thousands_sep.map_or(0, char::len_utf8);
            n += locale.separator_count(int_len) * sep_len;
        }
        if digit_budget > 0 || flags.alt_form {
            n += dp.len() + digit_budget;
        }
        n
    };

    let realsz = size + sign.map_or(0, |_| 1);
    let field_w = width.max(realsz);

    if !flags.left_adj && !flags.zero_pad {
        sink.pad(b' ', field_w - realsz)?;
    }
    if let Some(s) = sign {
        sink.write(&[s])?;
    }
    if !flags.left_adj && flags.zero_pad {
        sink.pad(b'0', field_w - realsz)?;
    }

    if e_style {
        sink.write(&digits[..1])?;
        let frac = digit_budget - 1;
        if frac > 0 || flags.alt_form {
            sink.write(dp)?;
        }
        let avail = (ndig - 1).min(frac);
        sink.write(&digits[1..1 + avail])?;
        sink.pad(b'0', frac - avail)?;
        sink.write(estr.as_bytes())?;
    } else if point <= 0 {
        // No integer digits: 0, the point, leading fractional zeros, then
        // the digits.
        sink.write(b"0")?;
        if digit_budget > 0 || flags.alt_form {
            sink.write(dp)?;
        }
        let lead_zeros = ((-point) as usize).min(digit_budget);
        sink.pad(b'0', lead_zeros)?;
        let remaining = digit_budget - lead_zeros;
        let avail = ndig.min(remaining);
        sink.write(&digits[..avail])?;
        sink.pad(b'0', remaining - avail)?;
    } else {
        let int_len = point as usize;
        let int_avail = ndig.min(int_len);
        if grouped {
            // Build the integer portion so separators can be inserted.
            let mut ipart = String::with_capacity(int_len);
            ipart.push_str(&conv.digits[..int_avail]);
            for _ in int_avail..int_len {
                ipart.push('0');
            }
            sink.write(locale.apply_grouping(&ipart).as_bytes())?;
        } else {
            sink.write(&digits[..int_avail])?;
            sink.pad(b'0', int_len - int_avail)?;
        }
        if digit_budget > 0 || flags.alt_form {
            sink.write(dp)?;
        }
        let frac_avail = (ndig - int_avail).min(digit_budget);
        sink.write(&digits[int_avail..int_avail + frac_avail])?;
        sink.pad(b'0', digit_budget - frac_avail)?;
    }

    if flags.left_adj {
        sink.pad(b' ', field_w - realsz)?;
    }
    Ok(())
}
