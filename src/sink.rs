//! The output sink: a fixed-capacity truncating destination or an owned
//! growable buffer, with a running count of queued bytes.

use crate::printf_impl::Error;

/// Total output may not exceed this many bytes; beyond it the call fails.
pub(crate) const MAX_OUTPUT: usize = i32::MAX as usize;

/// Owned buffers grow in multiples of this from empty.
const GROWTH_QUANTUM: usize = 64;

const PAD_CHUNK: usize = 16;
const BLANKS: [u8; PAD_CHUNK] = [b' '; PAD_CHUNK];
const ZEROES: [u8; PAD_CHUNK] = [b'0'; PAD_CHUNK];

pub(crate) enum OutputSink<'a> {
    /// A caller-provided buffer. Writes past `capacity - 1` are silently
    /// discarded; the final byte is reserved for the NUL terminator.
    Fixed {
        buf: &'a mut [u8],
        pos: usize,
        total: usize,
    },
    /// An owned buffer, grown geometrically ahead of each write so that
    /// space for the terminator is always reserved.
    Owned {
        buf: Vec<u8>,
        total: usize,
        alloc_limit: Option<usize>,
    },
}

fn round_up(n: usize, unit: usize) -> usize {
    n.div_euclid(unit) * unit + if n % unit == 0 { 0 } else { unit }
}

impl<'a> OutputSink<'a> {
    pub fn fixed(buf: &'a mut [u8]) -> Self {
        OutputSink::Fixed {
            buf,
            pos: 0,
            total: 0,
        }
    }

    /// An owned sink, initially sized from the template length in the manner
    /// of asprintf: an empty template needs one byte, anything else rounds
    /// up to a multiple of 64.
    pub fn owned(template_len: usize) -> Result<Self, Error> {
        Self::owned_impl(template_len, None)
    }

    #[cfg(test)]
    pub fn owned_with_limit(template_len: usize, limit: usize) -> Result<Self, Error> {
        Self::owned_impl(template_len, Some(limit))
    }

    fn owned_impl(template_len: usize, alloc_limit: Option<usize>) -> Result<Self, Error> {
        let initial = if template_len == 0 {
            1
        } else {
            round_up(template_len + 1, GROWTH_QUANTUM)
        };
        if alloc_limit.is_some_and(|limit| initial > limit) {
            return Err(Error::AllocationFailed);
        }
        let mut buf = Vec::new();
        buf.try_reserve_exact(initial)
            .map_err(|_| Error::AllocationFailed)?;
        Ok(OutputSink::Owned {
            buf,
            total: 0,
            alloc_limit,
        })
    }

    /// The number of bytes queued so far, ignoring any truncation.
    pub fn total(&self) -> usize {
        match self {
            OutputSink::Fixed { total, .. } | OutputSink::Owned { total, .. } => *total,
        }
    }

    /// Queue a fragment. Fixed destinations truncate silently; owned
    /// destinations grow first, keeping one byte in hand for the terminator.
    pub fn write(&mut self, frag: &[u8]) -> Result<(), Error> {
        match self {
            OutputSink::Fixed { buf, pos, total } => {
                *total = bump(*total, frag.len())?;
                let room = buf.len().saturating_sub(1).saturating_sub(*pos);
                let n = frag.len().min(room);
                buf[*pos..*pos + n].copy_from_slice(&frag[..n]);
                *pos += n;
            }
            OutputSink::Owned {
                buf,
                total,
                alloc_limit,
            } => {
                *total = bump(*total, frag.len())?;
                let needed = buf.len() + frag.len() + 1;
                if needed > buf.capacity() {
                    // Round up to a multiple of the current capacity.
                    let target = round_up(needed, buf.capacity().max(1));
                    if alloc_limit.is_some_and(|limit| target > limit) {
                        return Err(Error::AllocationFailed);
                    }
                    buf.try_reserve_exact(target - buf.len())
                        .map_err(|_| Error::AllocationFailed)?;
                }
                buf.extend_from_slice(frag);
            }
        }
        Ok(())
    }

    /// Emit `count` copies of `with` (blank or zero padding).
    pub fn pad(&mut self, with: u8, mut count: usize) -> Result<(), Error> {
        debug_assert!(with == b'0' || with == b' ');
        let chunk = if with == b'0' { &ZEROES } else { &BLANKS };
        while count > 0 {
            let n = count.min(PAD_CHUNK);
            self.write(&chunk[..n])?;
            count -= n;
        }
        Ok(())
    }

    /// Terminate a fixed destination and report the logical byte count
    /// (what the output length would have been without truncation).
    pub fn finish_fixed(self) -> usize {
        let OutputSink::Fixed { buf, pos, total } = self else {
            panic!("finish_fixed on an owned sink");
        };
        if !buf.is_empty() {
            buf[pos] = 0;
        }
        total
    }

    /// Terminate an owned destination, returning the exact-sized buffer
    /// including its single trailing NUL.
    pub fn finish_owned(self) -> Vec<u8> {
        let OutputSink::Owned { mut buf, .. } = self else {
            panic!("finish_owned on a fixed sink");
        };
        // Space for the terminator was reserved by every write.
        debug_assert!(buf.len() < buf.capacity() || buf.capacity() == 0);
        buf.push(0);
        buf.shrink_to_fit();
        buf
    }
}

// Add to the queued count, failing once the output stops being representable.
fn bump(total: usize, len: usize) -> Result<usize, Error> {
    match total.checked_add(len) {
        Some(n) if n <= MAX_OUTPUT => Ok(n),
        _ => Err(Error::Overflow),
    }
}
