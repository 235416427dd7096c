// Copyright 2025 Lars Brubaker
// License: MIT
//
// Antialiased scan conversion of a polygon into coverage spans.
//
// The sweep keeps the active edges in exact x order with the same event
// machinery as the trapezoid engine (START, STOP and INTERSECTION events,
// neighbour re-testing on every change of adjacency), but it only needs
// events ordered by y. Output is produced a pixel row at a time:
//
//   - When no event falls inside the next rows, they are "full" rows. Every
//     active edge crosses them completely, so the boundary edges are found
//     once and their coverage is either emitted for all rows at once (all
//     edges vertical) or replayed row by row.
//   - Otherwise the row is cut into sub-rows at each event. Each sub-row
//     only records, per edge, the sign of its boundary contribution as a
//     run; when the row ends the runs are replayed top to bottom to
//     accumulate coverage.

use log::{debug, trace};
use smallvec::SmallVec;

use crate::bucketalloc::BucketAlloc;
use crate::coverage::Coverage;
use crate::dict::ActiveList;
use crate::error::Result;
use crate::fixed::{
    fixed_floor, fractional_part, integer_ceil, integer_floor, integer_part, Edge, Fixed,
    FixedBox, Point,
};
use crate::geom::{edge_intersect, line_x_for_y, lines_compare_at_y, lines_equal, slope_compare};
use crate::polygon::Polygon;
use crate::priorityq::{compare_by_y, EdgeIdx, Event, EventKind, PriorityQ};
use crate::spans::{HalfOpenSpan, SpanRenderer};
use crate::sweep::{Run, SweepEdge, EDGE_START, EDGE_STOP, STEP_X, STEP_Y};
use crate::FillRule;

/// Full coverage of one pixel, in the units `Coverage` accumulates.
const STEP_XY: i32 = 2 * STEP_X * STEP_Y;

type RunPool = BucketAlloc<Run, 64>;

#[inline]
fn area_to_alpha(area: i32) -> u8 {
    let alpha = (area as i64 * 255 + (STEP_XY / 2) as i64) / STEP_XY as i64;
    alpha.clamp(0, 255) as u8
}

/// Collects edges, then rasterizes them with [`ScanConverter::generate`].
#[derive(Clone, Debug)]
pub struct ScanConverter {
    extents: FixedBox,
    fill_rule: FillRule,
    xmin: i32,
    xmax: i32,
    ymin: i32,
    ymax: i32,
    edges: Vec<SweepEdge>,
}

impl ScanConverter {
    /// A converter producing rows covering `extents`, rounded outward to
    /// whole pixels.
    pub fn new(extents: &FixedBox, fill_rule: FillRule) -> Self {
        ScanConverter {
            extents: *extents,
            fill_rule,
            xmin: integer_floor(extents.p1.x),
            xmax: integer_ceil(extents.p2.x),
            ymin: integer_floor(extents.p1.y),
            ymax: integer_ceil(extents.p2.y),
            edges: Vec::new(),
        }
    }

    pub fn extents(&self) -> &FixedBox {
        &self.extents
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Add one edge. Horizontal and empty edges are ignored.
    pub fn add_edge(&mut self, edge: &Edge) -> Result<()> {
        if edge.line.p1.y >= edge.line.p2.y || edge.top >= edge.bottom {
            return Ok(());
        }
        self.edges.try_reserve(1)?;
        self.edges.push(SweepEdge::new(edge));
        Ok(())
    }

    pub fn add_polygon(&mut self, polygon: &Polygon) -> Result<()> {
        self.edges.try_reserve(polygon.num_edges())?;
        for edge in polygon.edges() {
            self.add_edge(edge)?;
        }
        Ok(())
    }

    /// Rasterize every edge added so far, passing rows to `renderer` from
    /// top to bottom. The converter is left unchanged and may be generated
    /// again.
    pub fn generate<R>(&self, renderer: &mut R) -> Result<()>
    where
        R: SpanRenderer + ?Sized,
    {
        if self.edges.is_empty() {
            return renderer.render_rows(self.ymin, self.ymax - self.ymin, &[]);
        }

        let mut sweep = Sweep::new(self)?;
        sweep.run(renderer)?;

        debug!(
            "scan converter: {} edges, {} intersections, {} row calls",
            sweep.edges.len(),
            sweep.intersections,
            sweep.row_calls
        );
        Ok(())
    }
}

/// Add the coverage of `edge` across one whole row and advance it.
fn full_add_edge(edge: &mut SweepEdge, coverage: &mut Coverage, sign: i32) -> Result<()> {
    edge.current_sign = sign;

    let ix1 = integer_part(edge.x.quo);
    if edge.vertical {
        let frac = fractional_part(edge.x.quo);
        return coverage.add(ix1, sign * STEP_Y, sign * 2 * frac * STEP_Y);
    }

    let x1 = edge.x.quo;
    edge.full_inc();
    let x2 = edge.x.quo;
    let ix2 = integer_part(x2);

    if ix1 == ix2 {
        let frac = fractional_part(x1) + fractional_part(x2);
        return coverage.add(ix1, sign * STEP_Y, sign * frac * STEP_Y);
    }
    coverage.render_cells(x1, x2, 0, STEP_Y, sign)
}

/// Replay a sloped edge's runs from sub-row `y1` down to `y2`.
fn render_runs(
    edge: &mut SweepEdge,
    runs: &RunPool,
    coverage: &mut Coverage,
    y1: Fixed,
    y2: Fixed,
) -> Result<()> {
    // (y, sign), newest first.
    let mut list: SmallVec<[(Fixed, i32); 8]> = SmallVec::new();
    let mut r = edge.runs;
    while let Some(idx) = r {
        let run = runs[idx];
        list.try_reserve(1)?;
        list.push((run.y, run.sign));
        r = run.next;
    }
    list.reverse();
    list.try_reserve(1)?;
    list.push((y2, 0));

    if list[0].0 > y1 {
        edge.sub_inc(list[0].0 - y1);
    }

    for pair in list.windows(2) {
        let (top, sign) = pair[0];
        let bottom = pair[1].0;
        let height = bottom - top;

        let x1 = edge.x.quo;
        if height == STEP_Y {
            edge.full_inc();
        } else {
            edge.sub_inc(height);
        }
        let x2 = edge.x.quo;

        if sign != 0 {
            let ix1 = integer_part(x1);
            let ix2 = integer_part(x2);
            if ix1 == ix2 {
                let frac = fractional_part(x1) + fractional_part(x2);
                coverage.add(ix1, sign * height, sign * height * frac)?;
            } else {
                coverage.render_cells(x1, x2, top, bottom, sign)?;
            }
        }
    }
    Ok(())
}

/// Replay a vertical edge's runs: only the net height matters.
fn render_vertical_runs(
    edge: &SweepEdge,
    runs: &RunPool,
    coverage: &mut Coverage,
    mut y2: Fixed,
) -> Result<()> {
    let mut height = 0;
    let mut r = edge.runs;
    while let Some(idx) = r {
        let run = runs[idx];
        if run.sign != 0 {
            height += run.sign * (y2 - run.y);
        }
        y2 = run.y;
        r = run.next;
    }

    let x = edge.x.quo;
    coverage.add(integer_part(x), height, 2 * fractional_part(x) * height)
}

struct Sweep {
    edges: Vec<SweepEdge>,
    queue: PriorityQ,
    active: ActiveList,
    /// Edges removed inside the current row that still hold runs.
    stopped: SmallVec<[EdgeIdx; 16]>,
    is_vertical: bool,
    current_row: Fixed,
    current_subrow: Fixed,
    coverage: Coverage,
    runs: RunPool,
    spans: SmallVec<[HalfOpenSpan; 64]>,
    mask: i32,
    xmin: i32,
    xmax: i32,
    extents: FixedBox,
    intersections: usize,
    row_calls: usize,
}

impl Sweep {
    fn new(conv: &ScanConverter) -> Result<Self> {
        let num_edges = conv.edges.len();
        let mut edges = Vec::new();
        edges.try_reserve_exact(num_edges)?;
        edges.extend_from_slice(&conv.edges);

        let mut starts = Vec::new();
        starts.try_reserve_exact(num_edges)?;
        for (i, e) in edges.iter().enumerate() {
            let point = Point::new(e.x.quo, e.edge.top);
            starts.push(Event::new(point, EventKind::Start(i as EdgeIdx)));
        }

        Ok(Sweep {
            edges,
            queue: PriorityQ::new(starts, compare_by_y),
            active: ActiveList::new(num_edges)?,
            stopped: SmallVec::new(),
            is_vertical: false,
            current_row: i32::MIN,
            current_subrow: i32::MIN,
            coverage: Coverage::new()?,
            runs: RunPool::new(),
            spans: SmallVec::new(),
            mask: conv.fill_rule.winding_mask(),
            xmin: conv.xmin,
            xmax: conv.xmax,
            extents: conv.extents,
            intersections: 0,
            row_calls: 0,
        })
    }

    // ─────────────────────────────── Events ───────────────────────────────

    fn insert_if_intersect(&mut self, left: EdgeIdx, right: EdgeIdx) -> Result<()> {
        let a = &self.edges[left as usize].edge;
        let b = &self.edges[right as usize].edge;

        // Shared start or end points never cross below.
        if a.line.p1 == b.line.p1 || a.line.p2 == b.line.p2 {
            return Ok(());
        }
        if slope_compare(&a.line, &b.line) <= 0 {
            return Ok(());
        }
        match edge_intersect(a, b) {
            Some(point) => self.queue.push(point, EventKind::Intersection(left, right)),
            None => Ok(()),
        }
    }

    fn start_edge(&mut self, e1: EdgeIdx) -> Result<()> {
        let edges = &self.edges;
        let y = self.current_subrow;
        self.active.insert(e1, |a, b| {
            lines_compare_at_y(&edges[a as usize].edge.line, &edges[b as usize].edge.line, y)
        });

        let edge = &self.edges[e1 as usize].edge;
        let stop = Point::new(line_x_for_y(&edge.line, edge.bottom), edge.bottom);
        self.queue.push(stop, EventKind::Stop(e1))?;

        if let Some(left) = self.active.prev(e1) {
            self.insert_if_intersect(left, e1)?;
        }
        if let Some(right) = self.active.next(e1) {
            self.insert_if_intersect(e1, right)?;
        }
        Ok(())
    }

    fn stop_edge(&mut self, e1: EdgeIdx) -> Result<()> {
        let left = self.active.prev(e1);
        let right = self.active.next(e1);
        self.active.delete(e1);

        let edge = &mut self.edges[e1 as usize];
        edge.flags |= EDGE_STOP;
        if edge.runs.is_some() {
            self.stopped.try_reserve(1)?;
            self.stopped.push(e1);
        }

        if let (Some(left), Some(right)) = (left, right) {
            self.insert_if_intersect(left, right)?;
        }
        Ok(())
    }

    fn cross_edges(&mut self, e1: EdgeIdx, e2: EdgeIdx) -> Result<()> {
        if self.edges[e1 as usize].is_stopped() || self.edges[e2 as usize].is_stopped() {
            return Ok(());
        }
        // No longer neighbours.
        if self.active.next(e1) != Some(e2) {
            return Ok(());
        }
        self.intersections += 1;

        let left = self.active.prev(e1);
        let right = self.active.next(e2);
        self.active.swap(e1, e2);

        // e2 is now left of e1.
        if let Some(left) = left {
            self.insert_if_intersect(left, e2)?;
        }
        if let Some(right) = right {
            self.insert_if_intersect(e1, right)?;
        }
        Ok(())
    }

    fn process(&mut self, event: &Event) -> Result<()> {
        trace!(
            "event: {:?} at y {} (row {})",
            event.kind,
            event.point.y,
            integer_part(self.current_row)
        );
        match event.kind {
            EventKind::Start(e1) => self.start_edge(e1),
            EventKind::Stop(e1) => self.stop_edge(e1),
            EventKind::Intersection(e1, e2) => self.cross_edges(e1, e2),
        }
    }

    // ────────────────────────────── Row output ──────────────────────────────

    /// Turn the accumulated cells into spans and hand `height` copies of the
    /// row to `renderer`. The cells are cleared afterwards.
    fn render_rows<R>(&mut self, y: i32, height: i32, renderer: &mut R) -> Result<()>
    where
        R: SpanRenderer + ?Sized,
    {
        self.row_calls += 1;
        if self.coverage.is_empty() {
            return renderer.render_rows(y, height, &[]);
        }

        self.spans.clear();
        self.spans.try_reserve(2 * self.coverage.len() + 2)?;

        let mut prev_x = self.xmin;
        let mut cover = 0;
        for cell in self.coverage.iter() {
            if cell.x > prev_x {
                self.spans.push(HalfOpenSpan::new(prev_x, area_to_alpha(cover)));
            }
            cover += cell.covered_height * STEP_X * 2;
            let area = cover - cell.uncovered_area;
            self.spans.push(HalfOpenSpan::new(cell.x, area_to_alpha(area)));
            prev_x = cell.x + 1;
        }

        if prev_x <= self.xmax {
            self.spans.push(HalfOpenSpan::new(prev_x, area_to_alpha(cover)));
        }
        if cover != 0 && prev_x < self.xmax {
            self.spans.push(HalfOpenSpan {
                x: self.xmax,
                coverage: 0,
                inverse: true,
            });
        }

        let status = renderer.render_rows(y, height, &self.spans);
        self.coverage.reset()?;
        status
    }

    // ────────────────────────────── Full rows ──────────────────────────────

    /// Pair up the boundary edges of the inside runs and add a full row of
    /// coverage for each. Edges swallowed inside a run are just advanced.
    fn full_boundaries(&mut self) -> Result<()> {
        self.is_vertical = true;
        let mut pos = self.active.first();
        while let Some(left) = pos {
            let mut winding = self.edges[left as usize].edge.dir;
            self.is_vertical &= self.edges[left as usize].vertical;

            pos = self.active.next(left);
            let right = loop {
                let Some(right) = pos else {
                    return full_add_edge(&mut self.edges[left as usize], &mut self.coverage, 1);
                };
                pos = self.active.next(right);
                let r = &self.edges[right as usize];
                self.is_vertical &= r.vertical;

                winding += r.edge.dir;
                if winding & self.mask == 0 {
                    let x = r.x.quo;
                    match pos {
                        Some(n) if self.edges[n as usize].x.quo == x => {}
                        _ => break right,
                    }
                }

                let r = &mut self.edges[right as usize];
                if !r.vertical {
                    r.full_inc();
                }
            };

            full_add_edge(&mut self.edges[left as usize], &mut self.coverage, 1)?;
            full_add_edge(&mut self.edges[right as usize], &mut self.coverage, -1)?;
        }
        Ok(())
    }

    /// Repeat the previous row's boundary signs one row further down.
    fn full_repeat(&mut self) -> Result<()> {
        let mut pos = self.active.first();
        while let Some(e) = pos {
            let edge = &mut self.edges[e as usize];
            if edge.current_sign != 0 {
                let sign = edge.current_sign;
                full_add_edge(edge, &mut self.coverage, sign)?;
            } else if !edge.vertical {
                edge.full_inc();
            }
            pos = self.active.next(e);
        }
        Ok(())
    }

    fn full_reset(&mut self) {
        let mut pos = self.active.first();
        while let Some(e) = pos {
            self.edges[e as usize].current_sign = 0;
            pos = self.active.next(e);
        }
    }

    /// Emit every whole row from the current row down to `row`.
    fn full_step<R>(&mut self, row: Fixed, renderer: &mut R) -> Result<()>
    where
        R: SpanRenderer + ?Sized,
    {
        let mut top = integer_part(self.current_row);
        let bottom = integer_part(row);
        if self.active.is_empty() {
            self.row_calls += 1;
            return renderer.render_rows(top, bottom - top, &[]);
        }

        self.full_boundaries()?;

        if self.is_vertical || bottom == top + 1 {
            self.render_rows(top, bottom - top, renderer)?;
            self.full_reset();
            return Ok(());
        }

        self.render_rows(top, 1, renderer)?;
        top += 1;
        while top != bottom {
            self.full_repeat()?;
            self.render_rows(top, 1, renderer)?;
            top += 1;
        }
        self.full_reset();
        Ok(())
    }

    // ─────────────────────────────── Sub-rows ───────────────────────────────

    fn add_run(&mut self, e: EdgeIdx, y: Fixed, sign: i32) -> Result<()> {
        let edge = &mut self.edges[e as usize];
        let run = self.runs.alloc(Run {
            next: edge.runs,
            sign,
            y,
        })?;
        edge.runs = Some(run);
        edge.current_sign = sign;
        Ok(())
    }

    /// Record, as runs, the sign changes of the boundary edges over the
    /// sub-row starting at the current sub-row.
    fn sub_step(&mut self) -> Result<()> {
        let fy = fractional_part(self.current_subrow);
        let mut pos = self.active.first();
        while let Some(left) = pos {
            let mut winding = self.edges[left as usize].edge.dir;

            pos = self.active.next(left);
            let right = loop {
                let Some(right) = pos else {
                    if self.edges[left as usize].current_sign != 1 {
                        self.add_run(left, fy, 1)?;
                    }
                    return Ok(());
                };
                pos = self.active.next(right);

                winding += self.edges[right as usize].edge.dir;
                if winding & self.mask == 0 {
                    // Coincident edges close together.
                    match pos {
                        Some(n)
                            if lines_equal(
                                &self.edges[right as usize].edge.line,
                                &self.edges[n as usize].edge.line,
                            ) => {}
                        _ => break right,
                    }
                }

                if self.edges[right as usize].current_sign != 0 {
                    self.add_run(right, fy, 0)?;
                }
            };

            if self.edges[left as usize].current_sign != 1 {
                self.add_run(left, fy, 1)?;
            }
            if self.edges[right as usize].current_sign != -1 {
                self.add_run(right, fy, -1)?;
            }
        }
        Ok(())
    }

    /// Close the current row: replay the runs of every active and stopped
    /// edge into coverage and render the row.
    fn sub_emit<R>(&mut self, renderer: &mut R) -> Result<()>
    where
        R: SpanRenderer + ?Sized,
    {
        self.sub_step()?;

        let mut pos = self.active.first();
        while let Some(e) = pos {
            let edge = &mut self.edges[e as usize];
            if edge.runs.is_none() {
                if !edge.vertical {
                    if edge.is_started() {
                        edge.sub_inc(STEP_Y - fractional_part(edge.edge.top));
                        edge.flags &= !EDGE_START;
                    } else {
                        edge.full_inc();
                    }
                }
            } else if edge.vertical {
                render_vertical_runs(edge, &self.runs, &mut self.coverage, STEP_Y)?;
            } else {
                let mut y1 = 0;
                if edge.is_started() {
                    y1 = fractional_part(edge.edge.top);
                    edge.flags &= !EDGE_START;
                }
                render_runs(edge, &self.runs, &mut self.coverage, y1, STEP_Y)?;
            }
            edge.current_sign = 0;
            edge.runs = None;
            pos = self.active.next(e);
        }

        for &e in &self.stopped {
            let edge = &mut self.edges[e as usize];
            let y2 = fractional_part(edge.edge.bottom);
            if edge.vertical {
                render_vertical_runs(edge, &self.runs, &mut self.coverage, y2)?;
            } else {
                let y1 = if edge.is_started() {
                    fractional_part(edge.edge.top)
                } else {
                    0
                };
                render_runs(edge, &self.runs, &mut self.coverage, y1, y2)?;
            }
            edge.runs = None;
        }
        self.stopped.clear();
        self.runs.reset();

        self.render_rows(integer_part(self.current_row), 1, renderer)
    }

    // ─────────────────────────────── Driver ───────────────────────────────

    fn run<R>(&mut self, renderer: &mut R) -> Result<()>
    where
        R: SpanRenderer + ?Sized,
    {
        let ybot = self.extents.p2.y;
        self.current_subrow = self.extents.p1.y;
        self.current_row = fixed_floor(self.extents.p1.y);

        let Some(mut event) = self.queue.pop() else {
            return Ok(());
        };

        'rows: loop {
            // Whole rows with no event inside them.
            if event.point.y >= self.current_row + STEP_Y {
                let bottom = fixed_floor(event.point.y);
                self.full_step(bottom, renderer)?;
                self.current_row = bottom;
                self.current_subrow = bottom;
            }

            loop {
                if event.point.y > self.current_subrow {
                    self.sub_step()?;
                    self.current_subrow = event.point.y;
                }

                loop {
                    self.process(&event)?;
                    match self.queue.pop() {
                        Some(next) => event = next,
                        None => break 'rows,
                    }
                    if event.point.y != self.current_subrow {
                        break;
                    }
                }

                if event.point.y >= self.current_row + STEP_Y {
                    break;
                }
            }

            let bottom = self.current_row + STEP_Y;
            self.sub_emit(renderer)?;
            self.current_subrow = bottom;
            self.current_row = bottom;
        }

        // Flush a partial row.
        if self.current_subrow != self.current_row {
            self.sub_emit(renderer)?;
            self.current_row += STEP_Y;
            self.current_subrow = self.current_row;
        }
        // Clear the rest.
        if self.current_subrow < ybot {
            let bottom = integer_part(self.current_row);
            self.row_calls += 1;
            renderer.render_rows(bottom, integer_ceil(ybot) - bottom, &[])?;
        }
        Ok(())
    }
}
