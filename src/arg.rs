use crate::printf_impl::Error;
use std::result::Result;
use widestring::{U16Str, U16String, U32Str, U32String};

/// A type-erased formatting argument.
///
/// Arguments are handed to the engine as an ordered sequence and consumed
/// once per conversion encountered (or resolved into a table when the
/// template uses `%N$` positional references). Wide strings are carried as
/// potentially ill-formed UTF-16/UTF-32 and transcoded on demand.
#[derive(Debug, PartialEq)]
pub enum Arg<'a> {
    Str(&'a str),
    String(String),
    WStr16(&'a U16Str),
    WStr32(&'a U32Str),
    UInt(u64),
    SInt(i64, u8), // signed integers track their width as the number of bits
    Float(f64),
    CountRef(&'a mut usize), // for use with %n
}

impl<'a> Arg<'a> {
    /// Store the running output byte count, for %n.
    pub(crate) fn set_count(&mut self, count: usize) -> Result<(), Error> {
        match self {
            Arg::CountRef(p) => **p = count,
            _ => return Err(Error::BadArgType),
        }
        Ok(())
    }

    // Return this value as an unsigned integer. Negative signed values will report overflow.
    pub(crate) fn as_uint(&self) -> Result<u64, Error> {
        match *self {
            Arg::UInt(u) => Ok(u),
            Arg::SInt(i, _w) => i.try_into().map_err(|_| Error::Overflow),
            _ => Err(Error::BadArgType),
        }
    }

    // Return this value as a signed integer. Unsigned values > i64::MAX will report overflow.
    pub(crate) fn as_sint(&self) -> Result<i64, Error> {
        match *self {
            Arg::UInt(u) => u.try_into().map_err(|_| Error::Overflow),
            Arg::SInt(i, _w) => Ok(i),
            _ => Err(Error::BadArgType),
        }
    }

    // If this is a signed value, then return the sign (true if negative) and the magnitude,
    // masked to the value's width. This allows for e.g. -1 to be returned as 0xFF, 0xFFFF, etc.
    // depending on the original width. An explicit `hh`/`h` length modifier narrows the mask
    // below the argument's own width.
    // If this is an unsigned value, simply return (false, u64).
    pub(crate) fn as_wrapping_uint(&self, width_limit: Option<u8>) -> Result<(bool, u64), Error> {
        match *self {
            Arg::UInt(u) => {
                let u = match width_limit {
                    Some(w) if w < 64 => u & ((1u64 << w) - 1),
                    _ => u,
                };
                Ok((false, u))
            }
            Arg::SInt(i, w) => {
                debug_assert!(w > 0);
                let w = width_limit.map_or(w, |limit| limit.min(w));
                // Need to shift twice in case w is 64.
                let mask = ((1u64 << (w - 1)) << 1).wrapping_sub(1);
                let ui = (i as u64) & mask;
                Ok((i < 0, ui))
            }
            _ => Err(Error::BadArgType),
        }
    }

    // Note we allow passing ints as floats, even allowing precision loss.
    pub(crate) fn as_float(&self) -> Result<f64, Error> {
        #[allow(clippy::cast_precision_loss)]
        match *self {
            Arg::Float(f) => Ok(f),
            Arg::UInt(u) => Ok(u as f64),
            Arg::SInt(i, _w) => Ok(i as f64),
            _ => Err(Error::BadArgType),
        }
    }

    pub(crate) fn as_char(&self) -> Result<char, Error> {
        let v: u32 = self.as_uint()?.try_into().map_err(|_| Error::Overflow)?;
        v.try_into().map_err(|_| Error::Overflow)
    }
}

/// Conversion from a raw value to a formatting argument.
pub trait ToArg<'a> {
    fn to_arg(self) -> Arg<'a>;
}

impl<'a> ToArg<'a> for &'a str {
    fn to_arg(self) -> Arg<'a> {
        Arg::Str(self)
    }
}

impl<'a> ToArg<'a> for &'a String {
    fn to_arg(self) -> Arg<'a> {
        Arg::Str(self)
    }
}

impl<'a> ToArg<'a> for &'a U16Str {
    fn to_arg(self) -> Arg<'a> {
        Arg::WStr16(self)
    }
}

impl<'a> ToArg<'a> for &'a U16String {
    fn to_arg(self) -> Arg<'a> {
        Arg::WStr16(self)
    }
}

impl<'a> ToArg<'a> for &'a U32Str {
    fn to_arg(self) -> Arg<'a> {
        Arg::WStr32(self)
    }
}

impl<'a> ToArg<'a> for &'a U32String {
    fn to_arg(self) -> Arg<'a> {
        Arg::WStr32(self)
    }
}

impl<'a> ToArg<'a> for &'a std::io::Error {
    fn to_arg(self) -> Arg<'a> {
        Arg::String(self.to_string())
    }
}

impl<'a> ToArg<'a> for f32 {
    fn to_arg(self) -> Arg<'a> {
        Arg::Float(self.into())
    }
}

impl<'a> ToArg<'a> for f64 {
    fn to_arg(self) -> Arg<'a> {
        Arg::Float(self)
    }
}

impl<'a> ToArg<'a> for char {
    fn to_arg(self) -> Arg<'a> {
        Arg::UInt((self as u32).into())
    }
}

impl<'a> ToArg<'a> for &'a mut usize {
    fn to_arg(self) -> Arg<'a> {
        Arg::CountRef(self)
    }
}

impl<'a, T> ToArg<'a> for &'a *const T {
    fn to_arg(self) -> Arg<'a> {
        Arg::UInt((*self) as usize as u64)
    }
}

/// All signed types.
macro_rules! impl_to_arg {
    ($($t:ty),*) => {
        $(
            impl<'a> ToArg<'a> for $t {
                fn to_arg(self) -> Arg<'a> {
                    Arg::SInt(self as i64, <$t>::BITS as u8)
                }
            }
        )*
    };
}
impl_to_arg!(i8, i16, i32, i64, isize);

/// All unsigned types.
macro_rules! impl_to_arg_u {
    ($($t:ty),*) => {
        $(
            impl<'a> ToArg<'a> for $t {
                fn to_arg(self) -> Arg<'a> {
                    Arg::UInt(self as u64)
                }
            }
        )*
    };
}
impl_to_arg_u!(u8, u16, u32, u64, usize);
