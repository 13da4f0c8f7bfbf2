//! The argument cursor: a single-consume argument source wrapped by a
//! materializing adapter. Arguments are consumed sequentially until the
//! first `%N$` or `*N$` reference, at which point the whole call switches
//! permanently to a resolved 1-based table built in two passes: a template
//! pre-scan recording argument types, then one ascending drain of the
//! source into the value table.

use crate::arg::Arg;
use crate::printf_impl::{parse_directive, ConvToken, ConversionSpec, Error, Num};
use smallvec::SmallVec;

// Inline capacity of the type and value tables.
pub(crate) const STATIC_ARG_TBL_SIZE: usize = 8;

type KindTable = SmallVec<[ArgKind; STATIC_ARG_TBL_SIZE]>;

/// The argument type recorded for an index during the pre-scan pass.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ArgKind {
    /// Below the highest referenced index but never referenced itself.
    Unused,
    Sint,
    Uint,
    Float,
    Char,
    Str,
    Ptr,
    Count,
}

impl ArgKind {
    fn accepts(self, arg: &Arg) -> bool {
        match self {
            ArgKind::Unused => true,
            ArgKind::Sint | ArgKind::Uint | ArgKind::Char | ArgKind::Ptr => {
                matches!(arg, Arg::UInt(_) | Arg::SInt(..))
            }
            ArgKind::Float => matches!(arg, Arg::Float(_) | Arg::UInt(_) | Arg::SInt(..)),
            ArgKind::Str => matches!(
                arg,
                Arg::Str(_) | Arg::String(_) | Arg::WStr16(_) | Arg::WStr32(_)
            ),
            ArgKind::Count => matches!(arg, Arg::CountRef(_)),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Mode {
    Sequential,
    Table,
}

pub(crate) struct ArgCursor<'a, I> {
    source: I,
    // Every argument consumed so far, in order. In table mode this is the
    // resolved table: entry k is 1-based argument index k + 1.
    taken: SmallVec<[Arg<'a>; STATIC_ARG_TBL_SIZE]>,
    // Index of the next fetch.
    next: usize,
    mode: Mode,
}

impl<'a, I: Iterator<Item = Arg<'a>>> ArgCursor<'a, I> {
    pub fn new(source: I) -> Self {
        ArgCursor {
            source,
            taken: SmallVec::new(),
            next: 0,
            mode: Mode::Sequential,
        }
    }

    /// Fetch the next argument in order. Sequential mode consumes the
    /// source; table mode advances through the resolved table.
    pub fn next_arg(&mut self) -> Result<&mut Arg<'a>, Error> {
        match self.mode {
            Mode::Sequential => {
                debug_assert_eq!(self.next, self.taken.len());
                let arg = self.source.next().ok_or(Error::MissingArg)?;
                self.taken.push(arg);
                self.next += 1;
                let last = self.taken.len() - 1;
                Ok(&mut self.taken[last])
            }
            Mode::Table => {
                let i = self.next;
                self.next += 1;
                self.taken.get_mut(i).ok_or(Error::MissingArg)
            }
        }
    }

    /// Position the cursor at the 1-based index of a `%N$` conversion,
    /// resolving the table on first use. The following `next_arg` calls
    /// continue ascending from there.
    pub fn seek(&mut self, template: &str, n: usize) -> Result<(), Error> {
        self.ensure_table(template)?;
        if n == 0 || n > self.taken.len() {
            return Err(Error::MissingArg);
        }
        self.next = n - 1;
        Ok(())
    }

    /// Fetch the 1-based index of a `*N$` width or precision reference.
    /// These are independent slots; the cursor position is untouched.
    pub fn star_at(&mut self, template: &str, n: usize) -> Result<&mut Arg<'a>, Error> {
        self.ensure_table(template)?;
        if n == 0 {
            return Err(Error::MissingArg);
        }
        self.taken.get_mut(n - 1).ok_or(Error::MissingArg)
    }

    // Switch to table mode: pre-scan the template for argument types, then
    // consume the source exactly once per index in ascending order. Growth
    // of either table past its inline capacity that cannot allocate aborts
    // the process, deliberately stricter than sink growth.
    fn ensure_table(&mut self, template: &str) -> Result<(), Error> {
        if self.mode == Mode::Table {
            return Ok(());
        }
        let kinds = prescan(template)?;
        while self.taken.len() < kinds.len() {
            let arg = self.source.next().ok_or(Error::MissingArg)?;
            self.taken.push(arg);
        }
        for (kind, arg) in kinds.iter().zip(self.taken.iter()) {
            if !kind.accepts(arg) {
                return Err(Error::BadArgType);
            }
        }
        self.mode = Mode::Table;
        Ok(())
    }
}

// Pass one: record the argument type of every referenced index. The result
// covers indices 1 through the highest reference; unreferenced slots in
// between stay Unused and are still consumed (once) during materialization.
fn prescan(template: &str) -> Result<KindTable, Error> {
    use ConversionSpec as CS;
    let mut kinds = KindTable::new();
    let mut next: usize = 1;
    let mut rest = template;
    loop {
        let Some(p) = rest.find('%') else { break };
        rest = &rest[p + 1..];
        let d = parse_directive(&mut rest)?;
        if d.conv == ConvToken::End {
            break;
        }
        if let Some(n) = d.pos {
            if n > 0 {
                next = n;
            }
        }
        for num in [d.width, d.prec] {
            match num {
                Num::Star => {
                    record(&mut kinds, next, ArgKind::Sint);
                    next += 1;
                }
                Num::StarPos(n) => record(&mut kinds, n, ArgKind::Sint),
                Num::Missing | Num::Literal(_) => {}
            }
        }
        let ConvToken::Spec(spec) = d.conv else {
            // Unknown conversions render their own character and take no
            // argument.
            continue;
        };
        let kind = match spec {
            CS::d => ArgKind::Sint,
            CS::o | CS::u | CS::x | CS::X => ArgKind::Uint,
            CS::e | CS::E | CS::f | CS::F | CS::g | CS::G => ArgKind::Float,
            CS::c => ArgKind::Char,
            CS::s => ArgKind::Str,
            CS::p => ArgKind::Ptr,
            CS::n => ArgKind::Count,
        };
        record(&mut kinds, next, kind);
        next += 1;
    }
    Ok(kinds)
}

fn record(kinds: &mut KindTable, idx: usize, kind: ArgKind) {
    if idx == 0 {
        // A 0$ reference resolves to nothing; tolerated here, rejected at
        // fetch time.
        return;
    }
    while kinds.len() < idx {
        kinds.push(ArgKind::Unused);
    }
    // The last recorded type for an index wins.
    kinds[idx - 1] = kind;
}
