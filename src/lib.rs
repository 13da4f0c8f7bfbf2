/*! Portable locale-aware printf rendering engine, based on BSD vfprintf.

The engine interprets a printf-style template in one pass: literal runs go
straight to the output sink, and each `%` directive resolves its arguments
(sequentially, or through a resolved table once `%N$` positional syntax
appears), renders through the matching converter, and assembles sign,
prefix, and padding around the result.

Output goes either to a caller buffer that truncates silently and is
always NUL terminated (`snprintf` family) or to an owned, exactly-sized
allocation (`asprintf` family). Truncation is success; all fatal
conditions report through [`Error`].

```
use vsnfmt::sprintf;

assert_eq!(sprintf!("%05d", 42), "00042");
assert_eq!(sprintf!("%2$s-%1$s", "a", "b"), "b-a");
assert_eq!(sprintf!("%'d", 1234567), "1,234,567");
```
*/

mod arg;
pub use arg::{Arg, ToArg};

mod cursor;
mod fmt_fp;
mod itoa;
mod printf_impl;
pub use printf_impl::Error;
mod sink;
mod wchar;
pub use wchar::Transcoding;
pub mod locale;
pub use locale::Locale;


use sink::OutputSink;

/// Per-call configuration: the numeric locale and the wide-character
/// conversion policy. Captured once and read-only for the call's duration.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    pub locale: Locale,
    pub transcoding: Transcoding,
}

impl FormatOptions {
    /// The fixed portable mode: `,` thousands separator, `.` decimal
    /// point, groups of three. Identical output on every host.
    pub fn portable() -> Self {
        FormatOptions {
            locale: locale::PORTABLE_LOCALE,
            transcoding: Transcoding::Lenient,
        }
    }

    /// The process-locale mode: grouping and separators captured from the
    /// process-wide locale data at call time.
    pub fn process() -> Self {
        FormatOptions {
            locale: locale::process_locale(),
            transcoding: Transcoding::Lenient,
        }
    }

    pub fn with_locale(locale: Locale) -> Self {
        FormatOptions {
            locale,
            transcoding: Transcoding::Lenient,
        }
    }

    /// Fail on illegal or incomplete wide-character input instead of
    /// substituting U+FFFD.
    pub fn strict_transcoding(mut self) -> Self {
        self.transcoding = Transcoding::Strict;
        self
    }
}

/// Render `template` into the fixed-capacity `dst`, truncating silently
/// once the buffer (less one byte for the NUL terminator) is full. The
/// terminator is always written when the buffer is non-empty.
///
/// Returns the logical byte count: the length the output would have had
/// without truncation, excluding the terminator. Truncation is success.
pub fn snprintf_with<'a>(
    dst: &mut [u8],
    template: &str,
    opts: &FormatOptions,
    args: impl IntoIterator<Item = Arg<'a>>,
) -> Result<usize, Error> {
    let mut sink = OutputSink::fixed(dst);
    printf_impl::vformat(&mut sink, template, opts, args.into_iter())?;
    Ok(sink.finish_fixed())
}

/// [`snprintf_with`] under the process locale and lenient transcoding.
pub fn snprintf<'a>(
    dst: &mut [u8],
    template: &str,
    args: impl IntoIterator<Item = Arg<'a>>,
) -> Result<usize, Error> {
    snprintf_with(dst, template, &FormatOptions::process(), args)
}

/// Render `template` into a new allocation sized exactly to the output.
/// The buffer is grown geometrically while rendering and shrunk to fit;
/// the internal NUL terminator is stripped from the returned bytes, which
/// are always valid UTF-8.
pub fn asprintf_with<'a>(
    template: &str,
    opts: &FormatOptions,
    args: impl IntoIterator<Item = Arg<'a>>,
) -> Result<Vec<u8>, Error> {
    let mut sink = OutputSink::owned(template.len())?;
    printf_impl::vformat(&mut sink, template, opts, args.into_iter())?;
    let mut buf = sink.finish_owned();
    debug_assert_eq!(buf.last(), Some(&0));
    buf.pop();
    Ok(buf)
}

/// [`asprintf_with`] under the process locale and lenient transcoding.
pub fn asprintf<'a>(
    template: &str,
    args: impl IntoIterator<Item = Arg<'a>>,
) -> Result<Vec<u8>, Error> {
    asprintf_with(template, &FormatOptions::process(), args)
}

/// Format into a new `String` under the portable locale.
///
/// This panics if the template or arguments are invalid.
///
/// # Examples
///
/// ```
/// use vsnfmt::sprintf;
///
/// let s = sprintf!("%0.5g", 123456.0);
/// assert_eq!(s, "1.2346e+05");
/// ```
#[macro_export]
macro_rules! sprintf {
    (
        $fmt:expr // format template
        $(, $($arg:expr),*)? // arguments
    ) => {
        {
            // May be no args!
            #[allow(unused_imports)]
            use $crate::ToArg;
            let bytes = $crate::asprintf_with(
                $fmt,
                &$crate::FormatOptions::portable(),
                [$( $($arg.to_arg()),* )?],
            )
            .expect("invalid format template or arguments");
            String::from_utf8(bytes).expect("rendered output is UTF-8")
        }
    };
}
