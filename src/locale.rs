//! Numeric locale data, captured as a plain value threaded through each call.

use std::sync::Mutex;

/// The numeric locale. Note this is a pure value type.
#[derive(Debug, Clone, Copy)]
pub struct Locale {
    /// The decimal point. Only single-char decimal points are supported.
    pub decimal_point: char,

    /// The thousands separator, or None if none.
    /// Note some obscure locales like it_IT.ISO8859-15 seem to have a multi-char thousands
    /// separator! We do not support that.
    pub thousands_sep: Option<char>,

    /// The grouping of digits, least significant group first.
    /// A value of 0 terminates the list: no grouping beyond that point.
    pub grouping: [u8; 4],

    /// If true, the last group is repeated for all higher digits.
    /// If false, there are no groups after the last.
    pub group_repeat: bool,
}

impl Locale {
    /// Iterate group sizes from the least significant digit upwards.
    /// The iterator ends when grouping stops; a repeating last rule yields forever.
    pub(crate) fn group_sizes(&self) -> GroupSizes<'_> {
        GroupSizes {
            locale: self,
            idx: 0,
        }
    }

    /// Number of separators inserted into a run of `digit_count` integer digits.
    pub(crate) fn separator_count(&self, digit_count: usize) -> usize {
        if self.thousands_sep.is_none() {
            return 0;
        }
        let mut seps = 0;
        let mut remaining = digit_count;
        for group in self.group_sizes() {
            if remaining <= group {
                break;
            }
            remaining -= group;
            seps += 1;
        }
        seps
    }

    /// Given a string of ASCII digits, return a new string with the thousands separator
    /// applied per the grouping rules. Returns the input unchanged if there is no separator.
    pub(crate) fn apply_grouping(&self, input: &str) -> String {
        debug_assert!(input.bytes().all(|b| b.is_ascii_digit()));
        let Some(sep) = self.thousands_sep else {
            return input.to_string();
        };
        let digits = input.as_bytes();
        let total = digits.len() + self.separator_count(digits.len()) * sep.len_utf8();
        let mut out = vec![0u8; total];
        let mut groups = self.group_sizes();
        let mut current = groups.next();
        let mut in_group = 0;
        let mut w = total;
        let mut sep_buf = [0u8; 4];
        let sep_bytes = sep.encode_utf8(&mut sep_buf).as_bytes();
        for (n, &b) in digits.iter().rev().enumerate() {
            if let Some(group) = current {
                if in_group == group && n != 0 {
                    w -= sep_bytes.len();
                    out[w..w + sep_bytes.len()].copy_from_slice(sep_bytes);
                    in_group = 0;
                    current = groups.next();
                }
            }
            w -= 1;
            out[w] = b;
            in_group += 1;
        }
        debug_assert_eq!(w, 0);
        String::from_utf8(out).expect("grouped digits are UTF-8")
    }
}

pub(crate) struct GroupSizes<'a> {
    locale: &'a Locale,
    idx: usize,
}

impl Iterator for GroupSizes<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.idx < self.locale.grouping.len() {
            let g = self.locale.grouping[self.idx];
            if g == 0 {
                // Sentinel: no further grouping. This also absorbs locales whose
                // grouping data leads with a zero-length rule.
                self.idx = self.locale.grouping.len() + 1;
                return None;
            }
            self.idx += 1;
            Some(g as usize)
        } else if self.idx == self.locale.grouping.len() && self.locale.group_repeat {
            // Stay here; the last rule repeats for all remaining digits.
            Some(self.locale.grouping[self.locale.grouping.len() - 1] as usize)
        } else {
            None
        }
    }
}

/// The "C" numeric locale.
pub const C_LOCALE: Locale = Locale {
    decimal_point: '.',
    thousands_sep: None,
    grouping: [0; 4],
    group_repeat: false,
};

/// The fixed portable locale: `.` decimal point, `,` thousands separator,
/// groups of three. Identical output on every host.
pub const PORTABLE_LOCALE: Locale = Locale {
    decimal_point: '.',
    thousands_sep: Some(','),
    grouping: [3, 3, 3, 3],
    group_repeat: true,
};

/// Lock guarding libc `localeconv()` calls to avoid races.
static LOCALE_LOCK: Mutex<()> = Mutex::new(());

/// It's CHAR_MAX.
const CHAR_MAX: libc::c_char = libc::c_char::MAX;

/// Return the first character of a C string, or None if null, empty, longer than 1, or negative.
unsafe fn first_char(s: *const libc::c_char) -> Option<char> {
    #[allow(unused_comparisons, clippy::absurd_extreme_comparisons)]
    if !s.is_null() && *s > 0 && *s <= 127 && *s.offset(1) == 0 {
        Some((*s as u8) as char)
    } else {
        None
    }
}

/// Convert a libc lconv to a Locale.
unsafe fn lconv_to_locale(lconv: &libc::lconv) -> Locale {
    let decimal_point = first_char(lconv.decimal_point).unwrap_or('.');
    let thousands_sep = first_char(lconv.thousands_sep);
    let empty = &[0 as libc::c_char];

    // Up to 4 groups.
    // group_cursor is terminated by either a 0 or CHAR_MAX.
    let mut group_cursor = lconv.grouping as *const libc::c_char;
    if group_cursor.is_null() {
        group_cursor = empty.as_ptr();
    }

    let mut grouping = [0; 4];
    let mut last_group: u8 = 0;
    let mut group_repeat = false;
    for group in grouping.iter_mut() {
        let gc = *group_cursor;
        if gc == 0 {
            // Preserve last_group, do not advance cursor.
            group_repeat = true;
        } else if gc == CHAR_MAX {
            // Remaining groups are 0, do not advance cursor.
            last_group = 0;
            group_repeat = false;
        } else {
            // Record last group, advance cursor.
            last_group = gc as u8;
            group_cursor = group_cursor.offset(1);
        }
        *group = last_group;
    }
    Locale {
        decimal_point,
        thousands_sep,
        grouping,
        group_repeat,
    }
}

/// Capture the process-wide numeric locale, falling back to [`C_LOCALE`]
/// if the data cannot be read. The capture is a snapshot: the returned
/// value stays consistent for the duration of the call it is used in.
pub fn process_locale() -> Locale {
    let _guard = LOCALE_LOCK.lock().unwrap();
    let lconv = unsafe { libc::localeconv() };
    if lconv.is_null() {
        return C_LOCALE;
    }
    unsafe { lconv_to_locale(&*lconv) }
}
