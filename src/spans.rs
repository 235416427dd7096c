// Copyright 2025 Lars Brubaker
// License: MIT
//
// Span output of the coverage rasterizer.

use crate::error::Result;

/// Coverage from `x` up to the next span's `x` (or the end of the row).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HalfOpenSpan {
    pub x: i32,
    pub coverage: u8,
    /// Marks the closing span of a row whose winding did not return to
    /// zero before the right edge of the extents.
    pub inverse: bool,
}

impl HalfOpenSpan {
    pub const fn new(x: i32, coverage: u8) -> Self {
        HalfOpenSpan {
            x,
            coverage,
            inverse: false,
        }
    }
}

/// Receiver of rasterized rows.
///
/// `render_rows` is called once per group of `height` identical rows
/// starting at pixel row `y`, top to bottom. `spans` is sorted by `x`; an
/// empty slice means the rows are entirely uncovered. Returning an error
/// aborts the conversion with that error.
pub trait SpanRenderer {
    fn render_rows(&mut self, y: i32, height: i32, spans: &[HalfOpenSpan]) -> Result<()>;
}

impl<F> SpanRenderer for F
where
    F: FnMut(i32, i32, &[HalfOpenSpan]) -> Result<()>,
{
    fn render_rows(&mut self, y: i32, height: i32, spans: &[HalfOpenSpan]) -> Result<()> {
        self(y, height, spans)
    }
}
