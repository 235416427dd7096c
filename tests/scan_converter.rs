// Copyright 2025 Lars Brubaker
// Antialiased coverage tests: exact pixel values on aligned input, area
// agreement on sloped input, fill rules and renderer failures.

mod helpers;

use helpers::*;
use sweep_raster::{
    Edge, Error, FillRule, FixedBox, HalfOpenSpan, Line, Point, Polygon, Result, ScanConverter,
};

const PENTAGRAM: &str = "
50 0
79 90
2 35
98 35
21 90
";

fn assert_area_approx(actual: f64, expected: f64, tolerance: f64, label: &str) {
    assert!(
        (actual - expected).abs() < tolerance,
        "{}: expected area ~{}, got {} (diff={})",
        label,
        expected,
        actual,
        (actual - expected).abs()
    );
}

#[test]
fn aligned_square_is_exact() {
    let polygon = polygon_from_int(&[&[(0, 0), (10, 0), (10, 10), (0, 10)]]);
    let grid = rasterize(&polygon, (-2, -2, 12, 12), FillRule::NonZero);
    grid.assert_rows_contiguous();

    for y in -2..12 {
        for x in -2..12 {
            let inside = (0..10).contains(&x) && (0..10).contains(&y);
            assert_eq!(grid.at(x, y), if inside { 255 } else { 0 }, "pixel ({}, {})", x, y);
        }
    }

    // Blank rows above and below arrive as single span-less calls.
    let first = &grid.calls[0];
    assert_eq!((first.y, first.height, first.spans.len()), (-2, 2, 0));
    let last = grid.calls.last().unwrap();
    assert_eq!((last.y, last.height, last.spans.len()), (10, 2, 0));
    // Vertical edges only: rows 1..10 are emitted as one call.
    assert!(grid.calls.iter().any(|c| c.y == 1 && c.height == 9));
}

#[test]
fn rows_partition_the_extents() {
    let polygon = polygon_from_int(&[&[(3, 3), (6, 3), (6, 6), (3, 6)]]);
    let grid = rasterize(&polygon, (0, 0, 10, 10), FillRule::NonZero);
    grid.assert_rows_contiguous();

    // Zero spans pad the row out to xmin on the left and close it on the
    // right.
    let expected = vec![
        HalfOpenSpan::new(0, 0),
        HalfOpenSpan::new(3, 255),
        HalfOpenSpan::new(4, 255),
        HalfOpenSpan::new(6, 0),
        HalfOpenSpan::new(7, 0),
    ];
    let covered: Vec<&RowCall> = grid.calls.iter().filter(|c| !c.spans.is_empty()).collect();
    assert!(!covered.is_empty());
    for call in covered {
        assert_eq!(call.spans, expected, "row {}", call.y);
    }
}

#[test]
fn open_row_closes_with_inverse_span() {
    // A lone left boundary: the winding never returns to zero.
    let mut conv = ScanConverter::new(&FixedBox::from_int(0, 0, 8, 8), FillRule::NonZero);
    let edge = Edge::new(Line::new(Point::from_int(4, 2), Point::from_int(4, 6)), 1);
    conv.add_edge(&edge).unwrap();
    let mut grid = CoverageGrid::new(0, 0, 8, 8);
    conv.generate(&mut grid).unwrap();
    grid.assert_rows_contiguous();

    let open = vec![
        HalfOpenSpan::new(0, 0),
        HalfOpenSpan::new(4, 255),
        HalfOpenSpan::new(5, 255),
        HalfOpenSpan {
            x: 8,
            coverage: 0,
            inverse: true,
        },
    ];
    assert_eq!(
        grid.calls,
        vec![
            RowCall { y: 0, height: 2, spans: vec![] },
            RowCall { y: 2, height: 1, spans: open.clone() },
            RowCall { y: 3, height: 3, spans: open },
            RowCall { y: 6, height: 2, spans: vec![] },
        ]
    );
    for y in 2..6 {
        for x in 0..8 {
            assert_eq!(grid.at(x, y), if x >= 4 { 255 } else { 0 }, "pixel ({}, {})", x, y);
        }
    }
}

#[test]
fn shared_diagonal_leaves_no_seam() {
    let polygon = polygon_from_int(&[
        &[(0, 0), (10, 0), (10, 10)],
        &[(0, 0), (10, 10), (0, 10)],
    ]);
    for rule in [FillRule::NonZero, FillRule::EvenOdd] {
        let grid = rasterize(&polygon, (0, 0, 10, 10), rule);
        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(grid.at(x, y), 255, "{:?}: pixel ({}, {})", rule, x, y);
            }
        }
    }
}

#[test]
fn split_halves_partition_the_square() {
    let upper = polygon_from_int(&[&[(0, 0), (10, 0), (10, 10)]]);
    let lower = polygon_from_int(&[&[(0, 0), (10, 10), (0, 10)]]);
    let a = rasterize(&upper, (0, 0, 10, 10), FillRule::NonZero);
    let b = rasterize(&lower, (0, 0, 10, 10), FillRule::NonZero);
    for y in 0..10 {
        for x in 0..10 {
            let sum = a.at(x, y) as i32 + b.at(x, y) as i32;
            assert!((254..=256).contains(&sum), "pixel ({}, {}) sums to {}", x, y, sum);
        }
    }
}

#[test]
fn pentagram_fill_rules_differ_in_the_middle() {
    let polygon = polygon_from_contours(&parse_contours(PENTAGRAM));
    let nonzero = rasterize(&polygon, (0, 0, 100, 100), FillRule::NonZero);
    let evenodd = rasterize(&polygon, (0, 0, 100, 100), FillRule::EvenOdd);

    // Centre is wound twice.
    assert_eq!(nonzero.at(50, 50), 255);
    assert_eq!(evenodd.at(50, 50), 0);
    // A point of the star is wound once.
    assert_eq!(nonzero.at(50, 10), 255);
    assert_eq!(evenodd.at(50, 10), 255);
    // Outside the star.
    assert_eq!(nonzero.at(5, 80), 0);
    assert_eq!(evenodd.at(5, 80), 0);

    assert!(nonzero.area() > evenodd.area());
}

#[test]
fn bowtie_lobes_fill_under_both_rules() {
    let polygon = polygon_from_int(&[&[(0, 0), (10, 10), (10, 0), (0, 10)]]);
    for rule in [FillRule::NonZero, FillRule::EvenOdd] {
        let grid = rasterize(&polygon, (0, 0, 10, 10), rule);
        assert_eq!(grid.at(1, 5), 255, "{:?} left lobe", rule);
        assert_eq!(grid.at(8, 4), 255, "{:?} right lobe", rule);
        assert_eq!(grid.at(5, 1), 0, "{:?} top notch", rule);
        assert_eq!(grid.at(4, 8), 0, "{:?} bottom notch", rule);
        assert_area_approx(grid.area(), 50.0, 0.5, &format!("{:?} bowtie", rule));
    }
}

#[test]
fn coverage_matches_geometric_area() {
    let cases: Vec<Vec<(f64, f64)>> = vec![
        vec![(3.0, 1.0), (60.0, 12.5), (20.25, 47.0)],
        vec![(0.5, 0.5), (40.0, 2.0), (38.0, 30.0), (20.0, 12.0), (2.0, 33.0)],
        vec![(10.0, 0.0), (12.0, 50.0), (11.0, 50.0)],
    ];
    for contour in cases {
        let expected = contour_signed_area(&contour).abs();
        let polygon = polygon_from_contours(&[contour.clone()]);
        for rule in [FillRule::NonZero, FillRule::EvenOdd] {
            let grid = rasterize(&polygon, (0, 0, 64, 64), rule);
            grid.assert_rows_contiguous();
            assert_area_approx(grid.area(), expected, 2.0, &format!("{:?} {:?}", rule, contour));
        }
    }
}

#[test]
fn simple_polygons_ignore_fill_rule() {
    let contour = vec![(1.0, 1.0), (30.5, 4.0), (25.0, 28.25), (14.0, 15.0), (3.0, 26.0)];
    let polygon = polygon_from_contours(&[contour]);
    let nonzero = rasterize(&polygon, (0, 0, 32, 32), FillRule::NonZero);
    let evenodd = rasterize(&polygon, (0, 0, 32, 32), FillRule::EvenOdd);
    assert_eq!(nonzero.alpha, evenodd.alpha);
    assert_eq!(nonzero.calls, evenodd.calls);
}

#[test]
fn reversed_orientation_gives_same_coverage() {
    let forward = vec![(2.0, 2.0), (20.0, 5.5), (9.0, 19.0)];
    let backward: Vec<(f64, f64)> = forward.iter().rev().copied().collect();
    let a = rasterize(&polygon_from_contours(&[forward]), (0, 0, 24, 24), FillRule::NonZero);
    let b = rasterize(&polygon_from_contours(&[backward]), (0, 0, 24, 24), FillRule::NonZero);
    assert_eq!(a.alpha, b.alpha);
}

#[test]
fn aligned_boxes_match_cell_counts() {
    let boxes = [(1, 1, 6, 4), (3, 2, 9, 8), (0, 6, 4, 10), (3, 2, 5, 3)];
    let mut polygon = Polygon::new();
    for &b in &boxes {
        let (x1, y1, x2, y2) = b;
        polygon
            .add_contour(
                &[
                    Point::from_int(x1, y1),
                    Point::from_int(x2, y1),
                    Point::from_int(x2, y2),
                    Point::from_int(x1, y2),
                ],
                1,
            )
            .unwrap();
    }
    for rule in [FillRule::NonZero, FillRule::EvenOdd] {
        let grid = rasterize(&polygon, (0, 0, 10, 10), rule);
        assert_eq!(grid.area(), grid_area(&boxes, rule), "{:?}", rule);
        for y in 0..10 {
            for x in 0..10 {
                let count = boxes
                    .iter()
                    .filter(|&&(x1, y1, x2, y2)| x1 <= x && x < x2 && y1 <= y && y < y2)
                    .count();
                let inside = match rule {
                    FillRule::NonZero => count > 0,
                    FillRule::EvenOdd => count % 2 == 1,
                };
                assert_eq!(grid.at(x, y), if inside { 255 } else { 0 }, "{:?} ({}, {})", rule, x, y);
            }
        }
    }
}

#[test]
fn empty_converter_clears_whole_extents() {
    let conv = ScanConverter::new(&FixedBox::from_int(-3, 2, 7, 9), FillRule::EvenOdd);
    let mut grid = CoverageGrid::new(-3, 2, 7, 9);
    conv.generate(&mut grid).unwrap();
    assert_eq!(
        grid.calls,
        vec![RowCall {
            y: 2,
            height: 7,
            spans: vec![]
        }]
    );
}

#[test]
fn generate_is_repeatable() {
    let polygon = polygon_from_contours(&parse_contours(PENTAGRAM));
    let mut conv = ScanConverter::new(&FixedBox::from_int(0, 0, 100, 100), FillRule::NonZero);
    conv.add_polygon(&polygon).unwrap();

    let mut first = CoverageGrid::new(0, 0, 100, 100);
    conv.generate(&mut first).unwrap();
    let mut second = CoverageGrid::new(0, 0, 100, 100);
    conv.generate(&mut second).unwrap();
    assert_eq!(first.calls, second.calls);
}

#[test]
fn renderer_failure_aborts_generation() {
    let polygon = polygon_from_int(&[&[(0, 0), (10, 0), (5, 10)]]);
    let mut conv = ScanConverter::new(&FixedBox::from_int(0, 0, 10, 10), FillRule::NonZero);
    conv.add_polygon(&polygon).unwrap();

    let mut calls = 0;
    let mut failing = |_y: i32, _height: i32, spans: &[HalfOpenSpan]| -> Result<()> {
        calls += 1;
        if spans.is_empty() {
            Ok(())
        } else {
            Err(Error::renderer("surface lost"))
        }
    };
    let err = conv.generate(&mut failing).unwrap_err();
    assert!(matches!(err, Error::Renderer(_)));
    assert_eq!(err.to_string(), "renderer failed: surface lost");
    assert_eq!(calls, 1);
}

#[test]
fn horizontal_edges_are_ignored() {
    let mut conv = ScanConverter::new(&FixedBox::from_int(0, 0, 4, 4), FillRule::NonZero);
    let flat = Edge::new(Line::new(Point::from_int(0, 2), Point::from_int(4, 2)), 1);
    conv.add_edge(&flat).unwrap();
    assert_eq!(conv.num_edges(), 0);
}
