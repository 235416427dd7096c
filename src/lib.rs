// sweep-raster: exact-arithmetic polygon scan conversion
// Copyright 2025 Lars Brubaker
// License: MIT
//
// Two engines share one sweep-line core (fixed-point geometry, exact
// predicates, an event queue and an ordered active list):
//   - `bentley_ottmann` / `rectilinear` decompose a polygon into
//     non-overlapping trapezoids or boxes;
//   - `scan_converter` rasterizes a polygon into antialiased coverage
//     spans, one pixel row at a time.

pub mod bentley_ottmann;
pub mod bucketalloc;
pub mod coverage;
pub mod dict;
pub mod error;
pub mod fixed;
pub mod geom;
pub mod polygon;
pub mod priorityq;
pub mod rectilinear;
pub mod scan_converter;
pub mod spans;
pub mod sweep;
pub mod traps;
pub mod wideint;

pub use bentley_ottmann::{tessellate_polygon, tessellate_traps};
pub use error::{Error, Result};
pub use fixed::{Edge, Fixed, FixedBox, Line, Point};
pub use polygon::Polygon;
pub use rectilinear::{
    tessellate_rectilinear_boxes, tessellate_rectilinear_polygon, tessellate_rectilinear_traps,
};
pub use scan_converter::ScanConverter;
pub use spans::{HalfOpenSpan, SpanRenderer};
pub use traps::{Boxes, TrapezoidSink, Trapezoid, Traps};

/// Which winding numbers count as inside.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillRule {
    /// Inside wherever the winding number is nonzero.
    #[default]
    NonZero,
    /// Inside wherever the winding number is odd.
    EvenOdd,
}

impl FillRule {
    /// Mask applied to an accumulated winding number; a zero result means
    /// outside.
    #[inline]
    pub fn winding_mask(self) -> i32 {
        match self {
            FillRule::NonZero => !0,
            FillRule::EvenOdd => 1,
        }
    }
}
