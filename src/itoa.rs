//! Integer-to-text conversion: unsigned magnitudes rendered right-to-left
//! in base 8, 10, or 16, with optional locale digit grouping.

use crate::locale::Locale;

// Enough for 20 decimal digits of u64 with a (multibyte) separator
// after every digit under a degenerate grouping rule.
const NUMBUF_LEN: usize = 128;

pub(crate) struct IntBuf {
    bytes: [u8; NUMBUF_LEN],
}

impl IntBuf {
    pub fn new() -> Self {
        IntBuf {
            bytes: [0; NUMBUF_LEN],
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum IntBase {
    Octal,
    Decimal,
    Hex,
}

const XDIGS_LOWER: &[u8; 16] = b"0123456789abcdef";
const XDIGS_UPPER: &[u8; 16] = b"0123456789ABCDEF";

// Decimal digits with grouping, for u32 and u64. Duplicated per width so the
// common 32-bit magnitudes divide in the narrower word.
macro_rules! decimal_digits {
    ($val:expr, $bytes:expr, $cp:expr, $grouping:expr) => {{
        let mut val = $val;
        let mut groups = $grouping.map(|loc: &Locale| loc.group_sizes());
        let mut current = groups.as_mut().and_then(|g| g.next());
        let sep = $grouping.and_then(|loc| loc.thousands_sep);
        let mut ndig = 0;
        loop {
            $cp -= 1;
            $bytes[$cp] = b'0' + (val % 10) as u8;
            ndig += 1;
            val /= 10;
            if val == 0 {
                break;
            }
            if let (Some(sep), Some(group)) = (sep, current) {
                if ndig == group {
                    let mut sep_buf = [0u8; 4];
                    let enc = sep.encode_utf8(&mut sep_buf).as_bytes();
                    $cp -= enc.len();
                    $bytes[$cp..$cp + enc.len()].copy_from_slice(enc);
                    ndig = 0;
                    current = groups.as_mut().and_then(|g| g.next());
                }
            }
        }
    }};
}

/// Render `val` into `buf`, returning the digit bytes.
///
/// `force_octal_zero` prepends a `0` to octal output lacking one (the `#`
/// flag). `grouping` selects separator insertion per the locale rules; it is
/// honored for base 10 only, matching the engine's conversion set.
pub(crate) fn render_uint<'a>(
    buf: &'a mut IntBuf,
    val: u64,
    base: IntBase,
    force_octal_zero: bool,
    upper: bool,
    grouping: Option<&Locale>,
) -> &'a [u8] {
    let bytes = &mut buf.bytes;
    let mut cp = NUMBUF_LEN;
    match base {
        IntBase::Decimal => {
            if val < 10 {
                // Many numbers are one digit.
                cp -= 1;
                bytes[cp] = b'0' + val as u8;
            } else if let Ok(narrow) = u32::try_from(val) {
                decimal_digits!(narrow, bytes, cp, grouping);
            } else {
                decimal_digits!(val, bytes, cp, grouping);
            }
        }
        IntBase::Octal => {
            let mut val = val;
            loop {
                cp -= 1;
                bytes[cp] = b'0' + (val & 7) as u8;
                val >>= 3;
                if val == 0 {
                    break;
                }
            }
            if force_octal_zero && bytes[cp] != b'0' {
                cp -= 1;
                bytes[cp] = b'0';
            }
        }
        IntBase::Hex => {
            let xdigs = if upper { XDIGS_UPPER } else { XDIGS_LOWER };
            let mut val = val;
            loop {
                cp -= 1;
                bytes[cp] = xdigs[(val & 15) as usize];
                val >>= 4;
                if val == 0 {
                    break;
                }
            }
        }
    }
    &buf.bytes[cp..]
}
