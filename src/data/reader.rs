//! Bounds-checked access to a borrowed PHY buffer.
//!
//! Every structured read goes through [`OffsetView`], which validates the full
//! byte range of a record or array before any of it is interpreted and hands
//! back an owned value. Nothing here keeps a reference into the buffer past a
//! single read.

use winnow::Parser;
use winnow::combinator::repeat;
use winnow::error::{ContextError, ErrMode};

use crate::error::{PhyError, PhyResult};

/// Common result type for winnow parsers.
pub type WResult<T> = Result<T, ErrMode<ContextError>>;

/// A fixed-size, little-endian record read straight off the wire.
pub trait Record: Sized {
    /// Exact on-disk size in bytes.
    const SIZE: usize;

    fn parse(input: &mut &[u8]) -> WResult<Self>;
}

/// Resolve a signed 32-bit relative pointer: `anchor + rel`.
///
/// Returns `None` when the result would be negative or overflow.
pub fn resolve_relptr(anchor: usize, rel: i32) -> Option<usize> {
    anchor.checked_add_signed(rel as isize)
}

/// An immutable window over a byte buffer anchored at a base offset.
///
/// Views are `Copy`; re-anchoring one with [`OffsetView::with_offset`] never
/// copies payload bytes.
#[derive(Debug, Clone, Copy)]
pub struct OffsetView<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> OffsetView<'a> {
    /// A view over the whole buffer anchored at offset 0.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// The same buffer anchored at `new_offset` (absolute).
    pub fn with_offset(&self, new_offset: usize) -> Self {
        Self {
            data: self.data,
            offset: new_offset,
        }
    }

    /// Absolute offset this view is anchored at.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the whole underlying buffer.
    pub fn buffer_len(&self) -> usize {
        self.data.len()
    }

    /// Number of bytes between this view's anchor and the end of the buffer.
    pub fn remaining_len(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Resolve a relative pointer stored in a record against an explicit
    /// absolute anchor.
    pub fn resolve(&self, anchor: usize, rel: i32, what: &'static str) -> PhyResult<usize> {
        resolve_relptr(anchor, rel).ok_or(PhyError::OutOfBoundsAccess {
            what,
            offset: anchor,
            needed: 0,
            available: self.data.len(),
        })
    }

    /// Read one `T` at `base + relative_offset`.
    ///
    /// Returns the value together with the absolute offset it was read from so
    /// callers can chain further offset math off the record's real location.
    pub fn read_record<T: Record>(
        &self,
        relative_offset: usize,
        what: &'static str,
    ) -> PhyResult<(T, usize)> {
        let absolute = self.absolute(relative_offset, what)?;
        let mut input = self.window(absolute, T::SIZE, what)?;
        let value = T::parse(&mut input).map_err(|_| self.out_of_bounds(what, absolute, T::SIZE))?;
        Ok((value, absolute))
    }

    /// Read `count` consecutive `T`s starting at `base + relative_offset`.
    pub fn read_array<T: Record>(
        &self,
        relative_offset: usize,
        count: usize,
        what: &'static str,
    ) -> PhyResult<Vec<T>> {
        let absolute = self.absolute(relative_offset, what)?;
        let len = count
            .checked_mul(T::SIZE)
            .ok_or_else(|| self.out_of_bounds(what, absolute, usize::MAX))?;
        let mut input = self.window(absolute, len, what)?;
        repeat(count, T::parse)
            .parse_next(&mut input)
            .map_err(|_| self.out_of_bounds(what, absolute, len))
    }

    /// Read the bytes from `base + relative_offset` up to (not including) the
    /// next NUL byte.
    pub fn read_nul_terminated_text(
        &self,
        relative_offset: usize,
        what: &'static str,
    ) -> PhyResult<String> {
        let absolute = self.absolute(relative_offset, what)?;
        let remaining = self
            .data
            .get(absolute..)
            .ok_or_else(|| self.out_of_bounds(what, absolute, 1))?;
        let end = remaining
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| self.out_of_bounds(what, absolute, remaining.len() + 1))?;
        Ok(String::from_utf8_lossy(&remaining[..end]).into_owned())
    }

    fn absolute(&self, relative_offset: usize, what: &'static str) -> PhyResult<usize> {
        self.offset
            .checked_add(relative_offset)
            .ok_or_else(|| self.out_of_bounds(what, self.offset, usize::MAX))
    }

    fn window(&self, absolute: usize, len: usize, what: &'static str) -> PhyResult<&'a [u8]> {
        absolute
            .checked_add(len)
            .and_then(|end| self.data.get(absolute..end))
            .ok_or_else(|| self.out_of_bounds(what, absolute, len))
    }

    fn out_of_bounds(&self, what: &'static str, offset: usize, len: usize) -> PhyError {
        PhyError::OutOfBoundsAccess {
            what,
            offset,
            needed: offset.saturating_add(len),
            available: self.data.len(),
        }
    }
}
