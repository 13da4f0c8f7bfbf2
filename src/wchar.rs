//! Wide-character arguments transcoded to UTF-8, orchestrating the
//! `widestring` decoders. Illegal or incomplete input is tolerated or
//! fatal depending on the conversion policy.

use crate::printf_impl::Error;
use widestring::{U16Str, U32Str};

/// Policy for ill-formed wide-character input.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Transcoding {
    /// Substitute U+FFFD for illegal or incomplete sequences and keep
    /// everything convertible. The default.
    #[default]
    Lenient,
    /// Fail the whole call on the first illegal or incomplete sequence.
    Strict,
}

pub(crate) fn utf16_to_utf8(
    src: &U16Str,
    max_bytes: Option<usize>,
    policy: Transcoding,
) -> Result<String, Error> {
    collect_utf8(src.chars(), src.len() * 2, max_bytes, policy)
}

pub(crate) fn utf32_to_utf8(
    src: &U32Str,
    max_bytes: Option<usize>,
    policy: Transcoding,
) -> Result<String, Error> {
    collect_utf8(src.chars(), src.len() * 4, max_bytes, policy)
}

// Drive a decode iterator into a UTF-8 scratch buffer. The scratch starts
// sized from the source byte length (capped at the requested maximum) and
// doubles on exhaustion, again capped; growth failures are fatal. A capped
// result never splits a scalar value.
fn collect_utf8<E>(
    chars: impl Iterator<Item = Result<char, E>>,
    source_bytes: usize,
    max_bytes: Option<usize>,
    policy: Transcoding,
) -> Result<String, Error> {
    let mut out = String::new();
    let initial = max_bytes.map_or(source_bytes, |cap| source_bytes.min(cap));
    out.try_reserve(initial).map_err(|_| Error::AllocationFailed)?;

    for decoded in chars {
        let c = match decoded {
            Ok(c) => c,
            Err(_) => match policy {
                Transcoding::Lenient => char::REPLACEMENT_CHARACTER,
                Transcoding::Strict => return Err(Error::Transcoding),
            },
        };
        let len = c.len_utf8();
        if let Some(cap) = max_bytes {
            if out.len() + len > cap {
                break;
            }
        }
        if out.len() + len > out.capacity() {
            let mut want = (out.capacity() * 2).max(out.len() + len);
            if let Some(cap) = max_bytes {
                want = want.min(cap).max(out.len() + len);
            }
            out.try_reserve(want - out.len())
                .map_err(|_| Error::AllocationFailed)?;
        }
        out.push(c);
    }
    Ok(out)
}
