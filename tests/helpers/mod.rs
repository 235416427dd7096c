// Copyright 2025 Lars Brubaker
// Shared test utilities for sweep-raster tests.

#![allow(dead_code)]

use sweep_raster::{
    FillRule, FixedBox, HalfOpenSpan, Point, Polygon, Result, ScanConverter, SpanRenderer,
};

/// Parse a text polygon: one vertex per line as `x y` or `x, y`.
/// Blank lines separate contours.
pub fn parse_contours(data: &str) -> Vec<Vec<(f64, f64)>> {
    let mut contours = Vec::new();
    let mut current = Vec::new();

    for line in data.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !current.is_empty() {
                contours.push(std::mem::take(&mut current));
            }
            continue;
        }
        let values: Vec<f64> = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse::<f64>().ok())
            .collect();
        if let [x, y] = values[..] {
            current.push((x, y));
        }
    }
    if !current.is_empty() {
        contours.push(current);
    }
    contours
}

/// Build a polygon from closed contours given in pixels.
pub fn polygon_from_contours(contours: &[Vec<(f64, f64)>]) -> Polygon {
    let mut polygon = Polygon::new();
    for contour in contours {
        let points: Vec<Point> = contour.iter().map(|&(x, y)| Point::from_f64(x, y)).collect();
        polygon.add_contour(&points, 1).expect("add contour");
    }
    polygon
}

/// Build a polygon from integer-pixel contours.
pub fn polygon_from_int(contours: &[&[(i32, i32)]]) -> Polygon {
    let mut polygon = Polygon::new();
    for contour in contours {
        let points: Vec<Point> = contour.iter().map(|&(x, y)| Point::from_int(x, y)).collect();
        polygon.add_contour(&points, 1).expect("add contour");
    }
    polygon
}

/// Signed area of a closed contour (shoelace formula).
pub fn contour_signed_area(points: &[(f64, f64)]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let (x0, y0) = points[i];
        let (x1, y1) = points[(i + 1) % n];
        area += x0 * y1 - x1 * y0;
    }
    area * 0.5
}

pub fn int_contour(points: &[(i32, i32)]) -> Vec<(f64, f64)> {
    points.iter().map(|&(x, y)| (x as f64, y as f64)).collect()
}

/// Exact area of the region selected from integer boxes, by counting unit
/// cells.
pub fn grid_area(boxes: &[(i32, i32, i32, i32)], rule: FillRule) -> f64 {
    let mut total = 0;
    let xmax = boxes.iter().map(|b| b.2).max().unwrap_or(0);
    let ymax = boxes.iter().map(|b| b.3).max().unwrap_or(0);
    for y in 0..ymax {
        for x in 0..xmax {
            let count = boxes
                .iter()
                .filter(|&&(x1, y1, x2, y2)| x1 <= x && x < x2 && y1 <= y && y < y2)
                .count();
            let inside = match rule {
                FillRule::NonZero => count > 0,
                FillRule::EvenOdd => count % 2 == 1,
            };
            if inside {
                total += 1;
            }
        }
    }
    total as f64
}

/// Normalize a (possibly inverted) integer box.
pub fn int_box(b: (i32, i32, i32, i32)) -> FixedBox {
    FixedBox::from_int(b.0.min(b.2), b.1.min(b.3), b.0.max(b.2), b.1.max(b.3))
}

/// One `render_rows` call as received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowCall {
    pub y: i32,
    pub height: i32,
    pub spans: Vec<HalfOpenSpan>,
}

/// A renderer that expands spans into a per-pixel alpha grid over the
/// converter's pixel extents and records every call.
pub struct CoverageGrid {
    pub xmin: i32,
    pub ymin: i32,
    pub width: i32,
    pub height: i32,
    pub alpha: Vec<u8>,
    pub calls: Vec<RowCall>,
}

impl CoverageGrid {
    pub fn new(xmin: i32, ymin: i32, xmax: i32, ymax: i32) -> Self {
        let width = xmax - xmin;
        let height = ymax - ymin;
        CoverageGrid {
            xmin,
            ymin,
            width,
            height,
            alpha: vec![0; (width * height) as usize],
            calls: Vec::new(),
        }
    }

    pub fn xmax(&self) -> i32 {
        self.xmin + self.width
    }

    pub fn at(&self, x: i32, y: i32) -> u8 {
        let (col, row) = (x - self.xmin, y - self.ymin);
        assert!(col >= 0 && col < self.width && row >= 0 && row < self.height, "({}, {}) outside grid", x, y);
        self.alpha[(row * self.width + col) as usize]
    }

    /// Total coverage in square pixels.
    pub fn area(&self) -> f64 {
        self.alpha.iter().map(|&a| a as f64 / 255.0).sum()
    }

    /// Assert calls arrive top to bottom, contiguous, and cover every row.
    pub fn assert_rows_contiguous(&self) {
        let mut next = self.ymin;
        for call in &self.calls {
            assert_eq!(call.y, next, "row gap or overlap at {:?}", call);
            assert!(call.height > 0, "empty call {:?}", call);
            next += call.height;
        }
        assert_eq!(next, self.ymin + self.height, "rows do not reach the bottom");
    }

    /// Assert a non-empty row starts at `xmin` and is closed by a
    /// zero-coverage span no further right than `xmax`, so that the spans
    /// partition `[xmin, xmax)`. An `inverse` closing span must sit exactly
    /// on `xmax`.
    pub fn assert_row_partition(&self, y: i32, spans: &[HalfOpenSpan]) {
        let (Some(first), Some(last)) = (spans.first(), spans.last()) else {
            return;
        };
        assert_eq!(first.x, self.xmin, "row {} does not start at xmin: {:?}", y, spans);
        assert!(last.x <= self.xmax(), "row {} runs past xmax: {:?}", y, spans);
        assert_eq!(last.coverage, 0, "row {} is not closed: {:?}", y, spans);
        if last.inverse {
            assert_eq!(last.x, self.xmax(), "inverse span off xmax in row {}: {:?}", y, spans);
        }
    }
}

impl SpanRenderer for CoverageGrid {
    fn render_rows(&mut self, y: i32, height: i32, spans: &[HalfOpenSpan]) -> Result<()> {
        self.calls.push(RowCall {
            y,
            height,
            spans: spans.to_vec(),
        });

        for (i, span) in spans.iter().enumerate() {
            if let Some(next) = spans.get(i + 1) {
                assert!(next.x > span.x, "spans not sorted: {:?}", spans);
                assert!(!span.inverse, "inverse span before the end of row {}: {:?}", y, spans);
            }
        }
        self.assert_row_partition(y, spans);

        for row in y..y + height {
            for (i, span) in spans.iter().enumerate() {
                let end = spans.get(i + 1).map_or(self.xmax(), |s| s.x).min(self.xmax());
                for x in span.x.max(self.xmin)..end {
                    let idx = ((row - self.ymin) * self.width + (x - self.xmin)) as usize;
                    self.alpha[idx] = span.coverage;
                }
            }
        }
        Ok(())
    }
}

/// Rasterize `polygon` over integer `extents`.
pub fn rasterize(polygon: &Polygon, extents: (i32, i32, i32, i32), rule: FillRule) -> CoverageGrid {
    let (x1, y1, x2, y2) = extents;
    let mut conv = ScanConverter::new(&FixedBox::from_int(x1, y1, x2, y2), rule);
    conv.add_polygon(polygon).expect("add polygon");
    let mut grid = CoverageGrid::new(x1, y1, x2, y2);
    conv.generate(&mut grid).expect("generate");
    grid
}
