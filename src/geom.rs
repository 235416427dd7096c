// Copyright 2025 Lars Brubaker
// License: MIT
//
// Exact geometric predicates on fixed-point lines and edges.
//
// All comparisons return a signed integer whose sign is the answer; the
// magnitude carries no meaning. Every line handed to these functions points
// downward (p1.y < p2.y) and its deltas fit in 32 bits.

use crate::fixed::{Edge, Fixed, Line, Point};
use crate::wideint::{
    det32_64, det64x32_128, int32x32_64_mul, int64x32_128_mul, int_96by64_32x64_divrem,
    ordering_sign, Quorem,
};

/// Truncating `a * b / c` through a 64-bit product.
#[inline]
pub fn fixed_mul_div(a: Fixed, b: Fixed, c: Fixed) -> Fixed {
    (int32x32_64_mul(a, b) / c as i64) as Fixed
}

/// x of `line` at `y`, exact at the endpoints, truncated elsewhere.
pub fn line_x_for_y(line: &Line, y: Fixed) -> Fixed {
    if y == line.p1.y {
        return line.p1.x;
    }
    if y == line.p2.y {
        return line.p2.x;
    }
    let dy = line.dy();
    if dy == 0 {
        return line.p1.x;
    }
    line.p1.x + fixed_mul_div(y - line.p1.y, line.dx(), dy)
}

/// y on the line through `p1`, `p2` at `x`; truncated.
pub fn line_y_for_x(p1: &Point, p2: &Point, x: Fixed) -> Fixed {
    if x == p1.x {
        return p1.y;
    }
    if x == p2.x {
        return p2.y;
    }
    let dx = p2.x - p1.x;
    if dx == 0 {
        return p1.y;
    }
    p1.y + fixed_mul_div(x - p1.x, p2.y - p1.y, dx)
}

#[inline]
pub fn lines_equal(a: &Line, b: &Line) -> bool {
    a == b
}

/// Compare dx/dy of two lines: `adx/ady` against `bdx/bdy`.
pub fn slope_compare(a: &Line, b: &Line) -> i32 {
    let adx = a.dx();
    let bdx = b.dx();

    // Vertical lines are the most common special case.
    if adx == 0 {
        return -bdx;
    }
    if bdx == 0 {
        return adx;
    }
    // Opposite horizontal directions order themselves.
    if (adx ^ bdx) < 0 {
        return adx;
    }

    let adx_bdy = int32x32_64_mul(adx, b.dy());
    let bdx_ady = int32x32_64_mul(bdx, a.dy());
    ordering_sign(adx_bdy.cmp(&bdx_ady))
}

/// Same ordering as `slope_compare`, from precomputed floored `dx/dy`.
pub fn slope_compare_quorem(a: Quorem, a_dy: Fixed, b: Quorem, b_dy: Fixed) -> i32 {
    if a.quo != b.quo {
        return ordering_sign(a.quo.cmp(&b.quo));
    }
    if a.rem == 0 {
        return -b.rem;
    }
    if b.rem == 0 {
        return a.rem;
    }
    let l = int32x32_64_mul(b_dy, a.rem);
    let r = int32x32_64_mul(a_dy, b.rem);
    ordering_sign(l.cmp(&r))
}

#[inline]
fn x_range(line: &Line) -> (Fixed, Fixed) {
    if line.p1.x < line.p2.x {
        (line.p1.x, line.p2.x)
    } else {
        (line.p2.x, line.p1.x)
    }
}

/// Order two lines by their x-extents alone; 0 when they overlap.
pub fn bbox_compare(a: &Line, b: &Line) -> i32 {
    let (amin, amax) = x_range(a);
    let (bmin, bmax) = x_range(b);
    if amax < bmin {
        return -1;
    }
    if amin > bmax {
        return 1;
    }
    0
}

// Sign of xA(y) - xB(y) when neither line has an endpoint at y.
//
// With A_dy, B_dy, (y - A_y) and (y - B_y) all positive the comparison
//   A_x + (y - A_y) * A_dx / A_dy  vs  B_x + (y - B_y) * B_dx / B_dy
// becomes
//   A_dy * B_dy * (A_x - B_x)  vs  (y - B_y) * B_dx * A_dy - (y - A_y) * A_dx * B_dy
// which is evaluated in 128 bits, or in 64 bits when a delta vanishes.
fn lines_compare_x_for_y_general(a: &Line, b: &Line, y: Fixed) -> i32 {
    let bbox = bbox_compare(a, b);
    if bbox != 0 {
        return bbox;
    }

    const HAVE_DX: u8 = 0x1;
    const HAVE_ADX: u8 = 0x2;
    const HAVE_BDX: u8 = 0x4;

    let ady = a.dy();
    let adx = a.dx();
    let bdy = b.dy();
    let bdx = b.dx();
    let dx = a.p1.x - b.p1.x;

    let mut have = 0u8;
    if dx != 0 {
        have |= HAVE_DX;
    }
    if adx != 0 {
        have |= HAVE_ADX;
    }
    if bdx != 0 {
        have |= HAVE_BDX;
    }

    let term_a = || int64x32_128_mul(int32x32_64_mul(adx, bdy), y - a.p1.y);
    let term_b = || int64x32_128_mul(int32x32_64_mul(bdx, ady), y - b.p1.y);

    match have {
        0 => 0,
        HAVE_DX => dx,
        HAVE_ADX => adx,
        HAVE_BDX => -bdx,
        h if h == HAVE_ADX | HAVE_BDX => {
            if (adx ^ bdx) < 0 {
                adx
            } else if a.p1.y == b.p1.y {
                // Common origin: only the slopes matter.
                let adx_bdy = int32x32_64_mul(adx, bdy);
                let bdx_ady = int32x32_64_mul(bdx, ady);
                ordering_sign(adx_bdy.cmp(&bdx_ady))
            } else {
                ordering_sign(term_a().cmp(&term_b()))
            }
        }
        h if h == HAVE_DX | HAVE_ADX => {
            if (-adx ^ dx) < 0 {
                dx
            } else {
                let ady_dx = int32x32_64_mul(ady, dx);
                let dy_adx = int32x32_64_mul(a.p1.y - y, adx);
                ordering_sign(ady_dx.cmp(&dy_adx))
            }
        }
        h if h == HAVE_DX | HAVE_BDX => {
            if (bdx ^ dx) < 0 {
                dx
            } else {
                let bdy_dx = int32x32_64_mul(bdy, dx);
                let dy_bdx = int32x32_64_mul(y - b.p1.y, bdx);
                ordering_sign(bdy_dx.cmp(&dy_bdx))
            }
        }
        _ => {
            let l = int64x32_128_mul(int32x32_64_mul(ady, bdy), dx);
            ordering_sign(l.cmp(&(term_b() - term_a())))
        }
    }
}

/// Sign of `x(y) - x` along `a`, computed without division.
pub fn line_compare_for_y_against_x(a: &Line, y: Fixed, x: Fixed) -> i32 {
    let (xmin, xmax) = x_range(a);
    if x < xmin {
        return 1;
    }
    if x > xmax {
        return -1;
    }

    let adx = a.dx();
    let dx = x - a.p1.x;

    if adx == 0 {
        return -dx;
    }
    if dx == 0 || (adx ^ dx) < 0 {
        return adx;
    }

    let l = int32x32_64_mul(y - a.p1.y, adx);
    let r = int32x32_64_mul(dx, a.dy());
    ordering_sign(l.cmp(&r))
}

#[inline]
fn endpoint_x_at(line: &Line, y: Fixed) -> Option<Fixed> {
    if y == line.p1.y {
        Some(line.p1.x)
    } else if y == line.p2.y {
        Some(line.p2.x)
    } else {
        None
    }
}

/// Sign of `xA(y) - xB(y)`.
///
/// When the sweep sits on an endpoint of either line the exact x of that
/// endpoint is used directly.
pub fn lines_compare_x_for_y(a: &Line, b: &Line, y: Fixed) -> i32 {
    match (endpoint_x_at(a, y), endpoint_x_at(b, y)) {
        (None, None) => lines_compare_x_for_y_general(a, b, y),
        (Some(ax), None) => -line_compare_for_y_against_x(b, y, ax),
        (None, Some(bx)) => line_compare_for_y_against_x(a, y, bx),
        (Some(ax), Some(bx)) => ordering_sign(ax.cmp(&bx)),
    }
}

/// Sweep-line order of two lines at `y`: by x, then by slope. Identical
/// lines compare equal.
pub fn lines_compare_at_y(a: &Line, b: &Line, y: Fixed) -> i32 {
    if lines_equal(a, b) {
        return 0;
    }
    let cmp = lines_compare_x_for_y(a, b, y);
    if cmp != 0 {
        return cmp;
    }
    slope_compare(a, b)
}

// ─────────────────────────────── Intersections ───────────────────────────────

/// Whether a rounded intersection ordinate is the true value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exactness {
    Exact,
    Inexact,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntersectOrdinate {
    pub ordinate: Fixed,
    pub exactness: Exactness,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntersectPoint {
    pub x: IntersectOrdinate,
    pub y: IntersectOrdinate,
}

impl IntersectPoint {
    pub fn to_point(&self) -> Point {
        Point::new(self.x.ordinate, self.y.ordinate)
    }
}

/// Intersection of the two segments' carrier lines, provided it falls
/// strictly inside both segments.
///
/// x is rounded to nearest with ties away from zero. y is always rounded
/// away from zero so that an intersection is never reported above the
/// sweep position that discovered it.
pub fn intersect_lines(a: &Line, b: &Line) -> Option<IntersectPoint> {
    let dx1 = a.p1.x - a.p2.x;
    let dy1 = a.p1.y - a.p2.y;
    let dx2 = b.p1.x - b.p2.x;
    let dy2 = b.p1.y - b.p2.y;

    let den_det = det32_64(dx1, dy1, dx2, dy2);

    // With t the parameter along a, t * den = R. Reject t outside (0, 1)
    // before paying for the division, then do the same for b.
    let outside = |r: i64| {
        if den_det < 0 {
            den_det >= r
        } else {
            den_det <= r
        }
    };
    let r = det32_64(dx2, dy2, b.p1.x - a.p1.x, b.p1.y - a.p1.y);
    if outside(r) {
        return None;
    }
    let r = det32_64(dy1, dx1, a.p1.y - b.p1.y, a.p1.x - b.p1.x);
    if outside(r) {
        return None;
    }

    let a_det = det32_64(a.p1.x, a.p1.y, a.p2.x, a.p2.y);
    let b_det = det32_64(b.p1.x, b.p1.y, b.p2.x, b.p2.y);

    // x = det(a_det, dx1, b_det, dx2) / den_det
    let mut qr = int_96by64_32x64_divrem(det64x32_128(a_det, dx1, b_det, dx2), den_det)?;
    let mut x_exactness = Exactness::Exact;
    if qr.rem != 0 {
        if (den_det < 0) != (qr.rem < 0) {
            qr.rem = -qr.rem;
        }
        qr.rem *= 2;
        let round_away = if den_det < 0 {
            qr.rem <= den_det
        } else {
            qr.rem >= den_det
        };
        if round_away {
            qr.quo += if qr.quo < 0 { -1 } else { 1 };
        } else {
            x_exactness = Exactness::Inexact;
        }
    }
    let x = IntersectOrdinate {
        ordinate: qr.quo as Fixed,
        exactness: x_exactness,
    };

    // y = det(a_det, dy1, b_det, dy2) / den_det
    let mut qr = int_96by64_32x64_divrem(det64x32_128(a_det, dy1, b_det, dy2), den_det)?;
    let mut y_exactness = Exactness::Exact;
    if qr.rem != 0 {
        qr.quo += if qr.quo < 0 { -1 } else { 1 };
        y_exactness = Exactness::Inexact;
    }
    let y = IntersectOrdinate {
        ordinate: qr.quo as Fixed,
        exactness: y_exactness,
    };

    Some(IntersectPoint { x, y })
}

// An inexact ordinate equal to `b` after rounding lies just before it.
#[inline]
fn ordinate_compare(a: Fixed, b: Fixed, exactness: Exactness) -> i32 {
    let cmp = ordering_sign(a.cmp(&b));
    if cmp != 0 {
        return cmp;
    }
    if exactness == Exactness::Inexact {
        -1
    } else {
        0
    }
}

/// Whether an intersection point already known to lie on `edge`'s line falls
/// inside the edge's `[top, bottom]` range, i.e. the sweep meets it after
/// the edge starts and before it stops.
pub fn edge_contains_intersect_point(edge: &Edge, point: &IntersectPoint) -> bool {
    let cmp_top = ordinate_compare(point.y.ordinate, edge.top, point.y.exactness);
    if cmp_top < 0 {
        return false;
    }
    let cmp_bottom = ordinate_compare(point.y.ordinate, edge.bottom, point.y.exactness);
    if cmp_bottom > 0 {
        return false;
    }
    if cmp_top > 0 && cmp_bottom < 0 {
        return true;
    }

    // On the top row the point must lie right of the edge, on the bottom row
    // left of it.
    if cmp_top == 0 {
        let top_x = line_x_for_y(&edge.line, edge.top);
        ordinate_compare(top_x, point.x.ordinate, point.x.exactness) < 0
    } else {
        let bot_x = line_x_for_y(&edge.line, edge.bottom);
        ordinate_compare(point.x.ordinate, bot_x, point.x.exactness) < 0
    }
}

/// Intersection of two edges within both of their valid ranges.
pub fn edge_intersect(a: &Edge, b: &Edge) -> Option<Point> {
    let point = intersect_lines(&a.line, &b.line)?;
    if !edge_contains_intersect_point(a, &point) || !edge_contains_intersect_point(b, &point) {
        return None;
    }
    Some(point.to_point())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::{fixed_from_int, Point};
    use quickcheck::TestResult;

    fn line(x1: i32, y1: i32, x2: i32, y2: i32) -> Line {
        Line::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    #[test]
    fn x_for_y_truncates_between_endpoints() {
        let l = line(0, 0, 10, 3);
        assert_eq!(line_x_for_y(&l, 0), 0);
        assert_eq!(line_x_for_y(&l, 3), 10);
        assert_eq!(line_x_for_y(&l, 1), 3);
        assert_eq!(line_x_for_y(&l, 2), 6);
        let back = line(0, 0, -10, 3);
        assert_eq!(line_x_for_y(&back, 1), -3);
    }

    #[test]
    fn y_for_x_on_sloped_line() {
        let p1 = Point::new(0, 0);
        let p2 = Point::new(100, 50);
        assert_eq!(line_y_for_x(&p1, &p2, 50), 25);
        assert_eq!(line_y_for_x(&p1, &p2, 100), 50);
    }

    #[test]
    fn slope_orders_left_leaning_first() {
        let vertical = line(0, 0, 0, 10);
        let right = line(0, 0, 5, 10);
        let left = line(0, 0, -5, 10);
        assert!(slope_compare(&left, &vertical) < 0);
        assert!(slope_compare(&right, &vertical) > 0);
        assert!(slope_compare(&left, &right) < 0);
        assert_eq!(slope_compare(&right, &line(3, 3, 8, 13)), 0);
    }

    #[test]
    fn quorem_slope_agrees_with_cross_multiplication() {
        use crate::wideint::floored_divrem;
        let lines = [
            line(0, 0, 7, 3),
            line(0, 0, -7, 3),
            line(0, 0, 5, 2),
            line(0, 0, 0, 4),
            line(0, 0, 1, 9),
            line(0, 0, -1, 9),
        ];
        for a in &lines {
            for b in &lines {
                let qa = floored_divrem(a.dx(), a.dy());
                let qb = floored_divrem(b.dx(), b.dy());
                assert_eq!(
                    slope_compare_quorem(qa, a.dy(), qb, b.dy()).signum(),
                    slope_compare(a, b).signum(),
                    "{:?} vs {:?}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn compare_uses_endpoint_shortcut() {
        let a = line(0, 0, 100, 100);
        let b = line(50, 0, 50, 100);
        assert!(lines_compare_x_for_y(&a, &b, 0) < 0);
        assert!(lines_compare_x_for_y(&a, &b, 100) > 0);
        assert!(lines_compare_x_for_y(&a, &b, 40) < 0);
        assert!(lines_compare_x_for_y(&a, &b, 60) > 0);
        assert_eq!(lines_compare_x_for_y(&a, &b, 50), 0);
    }

    #[test]
    fn compare_at_y_breaks_ties_by_slope() {
        let a = line(0, 0, 100, 100);
        let b = line(0, 0, -100, 100);
        assert!(lines_compare_at_y(&b, &a, 0) < 0);
        assert!(lines_compare_at_y(&a, &b, 0) > 0);
        assert_eq!(lines_compare_at_y(&a, &a, 0), 0);
    }

    #[test]
    fn intersection_of_crossing_diagonals() {
        let a = line(0, 0, fixed_from_int(10), fixed_from_int(10));
        let b = line(fixed_from_int(10), 0, 0, fixed_from_int(10));
        let p = intersect_lines(&a, &b).expect("diagonals cross");
        assert_eq!(p.x.ordinate, fixed_from_int(5));
        assert_eq!(p.y.ordinate, fixed_from_int(5));
        assert_eq!(p.x.exactness, Exactness::Exact);
        assert_eq!(p.y.exactness, Exactness::Exact);
        assert_eq!(
            edge_intersect(&Edge::new(a, 1), &Edge::new(b, -1)),
            Some(Point::from_int(5, 5))
        );
    }

    #[test]
    fn inexact_y_rounds_down_the_sweep() {
        // Crossing at (1.5, 1.5) in raw units.
        let a = line(0, 0, 3, 3);
        let b = line(3, 0, 0, 3);
        let p = intersect_lines(&a, &b).expect("lines cross");
        assert_eq!(p.y.ordinate, 2);
        assert_eq!(p.y.exactness, Exactness::Inexact);
        assert_eq!(p.x.ordinate, 2);
        assert_eq!(p.x.exactness, Exactness::Exact);
    }

    #[test]
    fn no_intersection_outside_segments() {
        let a = line(0, 0, 10, 10);
        let b = line(30, 0, 20, 10);
        assert_eq!(intersect_lines(&a, &b), None);
        // Parallel
        let c = line(5, 0, 15, 10);
        assert_eq!(intersect_lines(&a, &c), None);
        // Touching at a shared endpoint only
        let d = line(10, 10, 0, 20);
        assert_eq!(intersect_lines(&a, &d), None);
    }

    #[test]
    fn containment_respects_clipped_range() {
        let a = line(0, 0, 100, 100);
        let b = line(100, 0, 0, 100);
        let mut ea = Edge::new(a, 1);
        let eb = Edge::new(b, 1);
        assert_eq!(edge_intersect(&ea, &eb), Some(Point::new(50, 50)));
        ea.bottom = 40;
        assert_eq!(edge_intersect(&ea, &eb), None);
        ea.bottom = 100;
        ea.top = 60;
        assert_eq!(edge_intersect(&ea, &eb), None);
    }

    // Exact x of `l` at `y` as a rational n / d with d > 0.
    fn exact_x(l: &Line, y: i32) -> (i128, i128) {
        let dy = l.dy() as i128;
        let n = l.p1.x as i128 * dy + (y - l.p1.y) as i128 * l.dx() as i128;
        (n, dy)
    }

    fn prop_compare_matches_rationals(ax: (i16, i16), ab: (i16, u8), bx: (i16, i16), bb: (i16, u8), t: u8) -> TestResult {
        let a = line(ax.0 as i32, ab.0 as i32, ax.1 as i32, ab.0 as i32 + ab.1 as i32 + 1);
        let b = line(bx.0 as i32, bb.0 as i32, bx.1 as i32, bb.0 as i32 + bb.1 as i32 + 1);
        let top = a.p1.y.max(b.p1.y);
        let bottom = a.p2.y.min(b.p2.y);
        if top > bottom {
            return TestResult::discard();
        }
        let y = top + ((bottom - top) as i64 * t as i64 / 255) as i32;
        let (an, ad) = exact_x(&a, y);
        let (bn, bd) = exact_x(&b, y);
        let expected = (an * bd).cmp(&(bn * ad));
        let ab_cmp = lines_compare_x_for_y(&a, &b, y).signum();
        let ba_cmp = lines_compare_x_for_y(&b, &a, y).signum();
        TestResult::from_bool(ab_cmp == ordering_sign(expected) && ba_cmp == -ab_cmp)
    }

    #[test]
    fn compare_x_for_y_is_exact_and_antisymmetric() {
        quickcheck::quickcheck(
            prop_compare_matches_rationals
                as fn((i16, i16), (i16, u8), (i16, i16), (i16, u8), u8) -> TestResult,
        );
    }
}
