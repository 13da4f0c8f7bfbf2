//! The directive scanner: one left-to-right pass over the template,
//! dispatching each `%` directive to the matching converter and assembling
//! sign, prefix, and padding around the rendered body.

use crate::arg::Arg;
use crate::cursor::ArgCursor;
use crate::fmt_fp::format_float;
use crate::itoa::{render_uint, IntBase, IntBuf};
use crate::sink::OutputSink;
use crate::wchar;
use crate::FormatOptions;
use std::result::Result;
use unicode_segmentation::UnicodeSegmentation;

/// Possible errors from rendering.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// Output, width, or precision beyond the representable range.
    #[error("output exceeds the representable length")]
    Overflow,
    /// Growth of a call-owned buffer failed.
    #[error("buffer allocation failed")]
    AllocationFailed,
    /// Illegal or incomplete wide-character input under the strict policy.
    #[error("illegal wide-character sequence")]
    Transcoding,
    /// Too few arguments.
    #[error("too few arguments for the format string")]
    MissingArg,
    /// Argument type doesn't match the conversion.
    #[error("argument type does not match the conversion")]
    BadArgType,
}

#[derive(Debug, Copy, Clone, Default)]
pub(crate) struct ModifierFlags {
    pub alt_form: bool, // #
    pub zero_pad: bool, // 0
    pub left_adj: bool, // - or negative field width
    pub pad_pos: bool,  // space: blank before positive numbers
    pub mark_pos: bool, // +: sign before positive numbers
    pub grouped: bool,  // ': group indicator
}

impl ModifierFlags {
    // If c is a modifier character, set the flag and return true.
    // Otherwise return false. Note we allow repeated modifier flags.
    fn try_set(&mut self, c: u8) -> bool {
        match c {
            b'#' => self.alt_form = true,
            b'0' => self.zero_pad = true,
            b'-' => self.left_adj = true,
            b' ' => self.pad_pos = true,
            b'+' => self.mark_pos = true,
            b'\'' => self.grouped = true,
            _ => return false,
        };
        true
    }
}

// Length modifiers. The value's width is taken from the typed argument
// itself; an explicit hh/h narrows integer conversions below it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub(crate) enum LengthMod {
    Empty,
    hh,
    h,
    l,
    ll,
    j,
    t,
    z,
    L,
}

impl LengthMod {
    pub(crate) fn int_width_limit(self) -> Option<u8> {
        match self {
            LengthMod::hh => Some(8),
            LengthMod::h => Some(16),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[allow(non_camel_case_types)]
#[rustfmt::skip]
pub(crate) enum ConversionSpec {
    // Integers. Note that we treat '%i' as '%d'.
    d, o, u, x, X,

    // Count receiver: no output, stores bytes emitted so far.
    n,

    // Floats.
    e, E, f, F, g, G,

    // Pointer.
    p,

    // Character or string. Note that we treat '%C' as '%c' and '%S' as '%s';
    // wideness comes from the argument itself.
    c, s,
}

impl ConversionSpec {
    // Returns true if the conversion specifier is lowercase,
    // which affects certain rendering.
    #[inline]
    pub(crate) fn is_lower(self) -> bool {
        use ConversionSpec::*;
        match self {
            d | o | u | x | n | e | f | g | p | c | s => true,
            X | E | F | G => false,
        }
    }

    // Returns a ConversionSpec from a character, or None if none.
    fn from_char(cc: char) -> Option<Self> {
        use ConversionSpec::*;
        let res = match cc {
            'd' | 'i' => d,
            'o' => o,
            'u' => u,
            'x' => x,
            'X' => X,
            'n' => n,
            'e' => e,
            'E' => E,
            'f' => f,
            'F' => F,
            'g' => g,
            'G' => G,
            'p' => p,
            'c' | 'C' => c,
            's' | 'S' => s,
            _ => return None,
        };
        Some(res)
    }
}

// A width or precision: absent, literal digits, or fetched from an argument
// (sequentially or by 1-based index).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Num {
    Missing,
    Literal(usize),
    Star,
    StarPos(usize),
}

// The terminating token of a directive.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum ConvToken {
    Spec(ConversionSpec),
    // Unknown conversion: render the character itself.
    Other(char),
    // The template ended mid-directive.
    End,
}

/// One parsed directive. Built and discarded per `%` encountered, by both
/// the render pass and the positional pre-scan.
#[derive(Debug)]
pub(crate) struct Directive {
    pub pos: Option<usize>, // %N$
    pub flags: ModifierFlags,
    pub width: Num,
    pub prec: Num,
    pub length: LengthMod,
    pub conv: ConvToken,
}

fn first_byte(s: &str) -> Option<u8> {
    s.as_bytes().first().copied()
}

// Parse a 1-based argument position (digits followed by '$'), consuming it
// only on success.
fn take_arg_position(rest: &mut &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let ndigits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if ndigits == 0 || bytes.get(ndigits) != Some(&b'$') {
        return None;
    }
    let n: usize = rest[..ndigits].parse().ok()?;
    *rest = &rest[ndigits + 1..];
    Some(n)
}

// Read an int from the template, stopping at the first non-digit.
// If there are no digits, return 0.
fn get_int(rest: &mut &str) -> Result<usize, Error> {
    let mut i: usize = 0;
    while let Some(digit) = first_byte(rest).filter(u8::is_ascii_digit) {
        i = i.checked_mul(10).ok_or(Error::Overflow)?;
        i = i.checked_add((digit - b'0') as usize).ok_or(Error::Overflow)?;
        *rest = &rest[1..];
    }
    Ok(i)
}

// Read a length modifier, advancing past it.
fn get_length_mod(rest: &mut &str) -> LengthMod {
    use LengthMod as LM;
    let length = match first_byte(rest).unwrap_or(0) {
        b'h' if rest.as_bytes().get(1) == Some(&b'h') => LM::hh,
        b'h' => LM::h,
        b'l' if rest.as_bytes().get(1) == Some(&b'l') => LM::ll,
        b'l' => LM::l,
        b'j' => LM::j,
        b't' => LM::t,
        b'z' => LM::z,
        b'L' => LM::L,
        _ => LM::Empty,
    };
    let consumed = match length {
        LM::Empty => 0,
        LM::hh | LM::ll => 2,
        _ => 1,
    };
    *rest = &rest[consumed..];
    length
}

// Parse one directive; the cursor starts just past the '%'.
pub(crate) fn parse_directive(rest: &mut &str) -> Result<Directive, Error> {
    let pos = take_arg_position(rest);

    let mut flags = ModifierFlags::default();
    while flags.try_set(first_byte(rest).unwrap_or(0)) {
        *rest = &rest[1..];
    }

    let width = if first_byte(rest) == Some(b'*') {
        *rest = &rest[1..];
        match take_arg_position(rest) {
            Some(n) => Num::StarPos(n),
            None => Num::Star,
        }
    } else if first_byte(rest).is_some_and(|b| b.is_ascii_digit()) {
        Num::Literal(get_int(rest)?)
    } else {
        Num::Missing
    };

    let prec = if first_byte(rest) == Some(b'.') {
        *rest = &rest[1..];
        if first_byte(rest) == Some(b'*') {
            *rest = &rest[1..];
            match take_arg_position(rest) {
                Some(n) => Num::StarPos(n),
                None => Num::Star,
            }
        } else {
            // "." with no digits means precision zero.
            Num::Literal(get_int(rest)?)
        }
    } else {
        Num::Missing
    };

    let length = get_length_mod(rest);

    let conv = match rest.chars().next() {
        None => ConvToken::End,
        Some(ch) => {
            *rest = &rest[ch.len_utf8()..];
            match ConversionSpec::from_char(ch) {
                Some(spec) => ConvToken::Spec(spec),
                None => ConvToken::Other(ch),
            }
        }
    };

    Ok(Directive {
        pos,
        flags,
        width,
        prec,
        length,
        conv,
    })
}

/// An assembled field awaiting emission: the rendered body plus the sign,
/// base prefix, zero-fill target from an explicit integer precision, and
/// padding controls.
pub(crate) struct PendingField<'a> {
    pub body: &'a [u8],
    pub sign: Option<u8>,
    pub prefix: Option<&'static [u8]>,
    pub dprec: usize,
    pub width: usize,
    pub left_adj: bool,
    pub zero_pad: bool,
}

// All reasonable conversions wind up here: blank padding, sign, prefix,
// zero padding, precision zeros, the body, then left-adjust padding.
pub(crate) fn emit_field(sink: &mut OutputSink, field: &PendingField) -> Result<(), Error> {
    let size = field.body.len();
    let realsz = field.dprec.max(size)
        + field.sign.map_or(0, |_| 1)
        + field.prefix.map_or(0, |p| p.len());
    let width = field.width.max(realsz);

    if !field.left_adj && !field.zero_pad {
        sink.pad(b' ', width - realsz)?;
    }
    if let Some(sign) = field.sign {
        sink.write(&[sign])?;
    }
    if let Some(prefix) = field.prefix {
        sink.write(prefix)?;
    }
    if !field.left_adj && field.zero_pad {
        sink.pad(b'0', width - realsz)?;
    }
    sink.pad(b'0', field.dprec.saturating_sub(size))?;
    sink.write(field.body)?;
    if field.left_adj {
        sink.pad(b' ', width - realsz)?;
    }
    Ok(())
}

// Resolve a '*' width argument: negative flips to left-adjust.
fn star_width(arg: &Arg, flags: &mut ModifierFlags) -> Result<usize, Error> {
    let w = arg.as_sint()?;
    if w < 0 {
        flags.left_adj = true;
    }
    w.unsigned_abs().try_into().map_err(|_| Error::Overflow)
}

// Narrow a signed value to an explicit hh/h length class.
fn truncate_sint(v: i64, limit: Option<u8>) -> i64 {
    match limit {
        Some(8) => v as i8 as i64,
        Some(16) => v as i16 as i64,
        _ => v,
    }
}

// Cap a string at `max` bytes without splitting a grapheme cluster.
fn cap_str(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = 0;
    for (i, g) in s.grapheme_indices(true) {
        if i + g.len() > max {
            break;
        }
        end = i + g.len();
    }
    &s[..end]
}

/// Render `template` with `args` into `sink`. The entry wrappers in the
/// crate root select the destination and locale.
pub(crate) fn vformat<'a, I>(
    sink: &mut OutputSink,
    template: &str,
    opts: &FormatOptions,
    args: I,
) -> Result<(), Error>
where
    I: Iterator<Item = Arg<'a>>,
{
    use ConversionSpec as CS;
    let locale = &opts.locale;
    let mut cursor = ArgCursor::new(args);
    let mut numbuf = IntBuf::new();
    let mut chbuf = [0u8; 4];
    let mut rest = template;

    loop {
        // Literal run up to the next directive.
        match rest.find('%') {
            Some(n) => {
                if n > 0 {
                    sink.write(rest[..n].as_bytes())?;
                }
                rest = &rest[n + 1..];
            }
            None => {
                if !rest.is_empty() {
                    sink.write(rest.as_bytes())?;
                }
                break;
            }
        }

        let dir_body = rest;
        let d = parse_directive(&mut rest)?;

        // A template ending mid-directive is emitted as literal text and
        // terminates the scan; it is never an error.
        if d.conv == ConvToken::End {
            sink.write(b"%")?;
            sink.write(dir_body.as_bytes())?;
            break;
        }

        let mut flags = d.flags;
        if let Some(n) = d.pos {
            cursor.seek(template, n)?;
        }

        let width: usize = match d.width {
            Num::Missing => 0,
            Num::Literal(n) => n,
            Num::Star => star_width(cursor.next_arg()?, &mut flags)?,
            Num::StarPos(n) => star_width(cursor.star_at(template, n)?, &mut flags)?,
        };
        if width > i32::MAX as usize {
            return Err(Error::Overflow);
        }

        // "A negative precision is treated as though it were missing."
        let mut prec: Option<usize> = match d.prec {
            Num::Missing => None,
            Num::Literal(n) => Some(n),
            Num::Star => cursor.next_arg()?.as_sint()?.try_into().ok(),
            Num::StarPos(n) => cursor.star_at(template, n)?.as_sint()?.try_into().ok(),
        };
        // Disallow precisions larger than i32::MAX, in keeping with C.
        if prec.unwrap_or(0) > i32::MAX as usize {
            return Err(Error::Overflow);
        }

        // '-' wins over '0'.
        if flags.left_adj {
            flags.zero_pad = false;
        }

        let spec = match d.conv {
            ConvToken::Spec(spec) => spec,
            ConvToken::Other(ch) => {
                // Unknown conversion: pretend it was %c with the character
                // itself, honoring width and flags.
                let body = ch.encode_utf8(&mut chbuf).as_bytes();
                emit_field(
                    sink,
                    &PendingField {
                        body,
                        sign: None,
                        prefix: None,
                        dprec: 0,
                        width,
                        left_adj: flags.left_adj,
                        zero_pad: flags.zero_pad,
                    },
                )?;
                continue;
            }
            ConvToken::End => unreachable!(),
        };

        match spec {
            CS::n => {
                let total = sink.total();
                cursor.next_arg()?.set_count(total)?;
                continue;
            }
            CS::e | CS::E | CS::f | CS::F | CS::g | CS::G => {
                let y = cursor.next_arg()?.as_float()?;
                format_float(sink, y, width, prec, flags, locale, spec)?;
                continue;
            }
            _ => {}
        }

        // Thousands grouping applies to d, i, u (and f, handled above);
        // it is silently dropped elsewhere.
        let grouping = (flags.grouped
            && locale.thousands_sep.is_some()
            && matches!(spec, CS::d | CS::u))
        .then_some(locale);

        let width_limit = d.length.int_width_limit();
        let arg = cursor.next_arg()?;
        let mut sign: Option<u8> = None;
        let mut prefix: Option<&'static [u8]> = None;
        let wide_storage: String;

        // Numeric conversions leave the body empty iff there are no digits
        // to show: a zero value with an explicit zero precision (except
        // alternate-form octal, which keeps its forced leading zero).
        let body: &[u8] = match spec {
            CS::d => {
                let v = truncate_sint(arg.as_sint()?, width_limit);
                sign = if v < 0 {
                    Some(b'-')
                } else if flags.mark_pos {
                    Some(b'+')
                } else if flags.pad_pos {
                    Some(b' ')
                } else {
                    None
                };
                let mag = v.unsigned_abs();
                if mag != 0 || prec != Some(0) {
                    render_uint(&mut numbuf, mag, IntBase::Decimal, false, false, grouping)
                } else {
                    b""
                }
            }
            CS::u => {
                let (_, v) = arg.as_wrapping_uint(width_limit)?;
                if v != 0 || prec != Some(0) {
                    render_uint(&mut numbuf, v, IntBase::Decimal, false, false, grouping)
                } else {
                    b""
                }
            }
            CS::o => {
                let (_, v) = arg.as_wrapping_uint(width_limit)?;
                if v != 0 || prec != Some(0) || flags.alt_form {
                    render_uint(&mut numbuf, v, IntBase::Octal, flags.alt_form, false, None)
                } else {
                    b""
                }
            }
            CS::x | CS::X => {
                let upper = !spec.is_lower();
                let (_, v) = arg.as_wrapping_uint(width_limit)?;
                if v != 0 && flags.alt_form {
                    prefix = Some(if upper { b"0X" } else { b"0x" });
                }
                if v != 0 || prec != Some(0) {
                    render_uint(&mut numbuf, v, IntBase::Hex, false, upper, None)
                } else {
                    b""
                }
            }
            CS::p => {
                const PTR_HEX_DIGITS: usize = 2 * std::mem::size_of::<*const u8>();
                prec = prec.map(|p| p.max(PTR_HEX_DIGITS));
                let v = arg.as_uint()?;
                if v != 0 {
                    prefix = Some(b"0x");
                    render_uint(&mut numbuf, v, IntBase::Hex, false, false, None)
                } else if prec != Some(0) {
                    render_uint(&mut numbuf, 0, IntBase::Hex, false, false, None)
                } else {
                    b""
                }
            }
            CS::c => {
                flags.zero_pad = false;
                arg.as_char()?.encode_utf8(&mut chbuf).as_bytes()
            }
            CS::s => {
                flags.zero_pad = false;
                let s: &str = match &*arg {
                    Arg::Str(s) => s,
                    Arg::String(s) => s.as_str(),
                    Arg::WStr16(w) => {
                        wide_storage = wchar::utf16_to_utf8(w, prec, opts.transcoding)?;
                        wide_storage.as_str()
                    }
                    Arg::WStr32(w) => {
                        wide_storage = wchar::utf32_to_utf8(w, prec, opts.transcoding)?;
                        wide_storage.as_str()
                    }
                    _ => return Err(Error::BadArgType),
                };
                match prec {
                    Some(p) => cap_str(s, p).as_bytes(),
                    None => s.as_bytes(),
                }
            }
            _ => unreachable!("floats and %n are dispatched above"),
        };

        // "... diouXx conversions ... if a precision is specified, the
        //  0 flag will be ignored." The precision becomes a zero-fill target.
        let dprec = prec.unwrap_or(0);
        if prec.is_some() {
            flags.zero_pad = false;
        }
        emit_field(
            sink,
            &PendingField {
                body,
                sign,
                prefix,
                dprec: if matches!(spec, CS::c | CS::s) { 0 } else { dprec },
                width,
                left_adj: flags.left_adj,
                zero_pad: flags.zero_pad,
            },
        )?;
    }
    Ok(())
}
