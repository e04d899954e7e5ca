//! Iso-line extraction over a rectilinear grid with marching squares.
//!
//! Crossing points are identified by the grid edge they lie on, so
//! segments from neighbouring cells share endpoints exactly and can be
//! chained into paths without any distance tolerance.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Edge {
    // (row, col) to (row, col + 1)
    Horizontal(usize, usize),
    // (row, col) to (row + 1, col)
    Vertical(usize, usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContourPath {
    /// (x, y) vertices; closed paths repeat the first vertex at the end
    pub points: Vec<(f64, f64)>,
    pub closed: bool,
}

impl ContourPath {
    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.0).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.1).collect()
    }
}

struct Grid<'a> {
    x: &'a [f64],
    y: &'a [f64],
    z: &'a [f64],
    level: f64,
}

impl Grid<'_> {
    fn z(&self, row: usize, col: usize) -> f64 {
        self.z[row * self.x.len() + col]
    }

    fn above(&self, row: usize, col: usize) -> bool {
        self.z(row, col) > self.level
    }

    fn crossing(&self, edge: Edge) -> (f64, f64) {
        let ((r0, c0), (r1, c1)) = match edge {
            Edge::Horizontal(r, c) => ((r, c), (r, c + 1)),
            Edge::Vertical(r, c) => ((r, c), (r + 1, c)),
        };
        let z0 = self.z(r0, c0);
        let z1 = self.z(r1, c1);
        let t = (self.level - z0) / (z1 - z0);
        (
            self.x[c0] + t * (self.x[c1] - self.x[c0]),
            self.y[r0] + t * (self.y[r1] - self.y[r0]),
        )
    }

    fn cell_segments(&self, row: usize, col: usize, out: &mut Vec<(Edge, Edge)>) {
        let corners = [
            self.z(row, col),
            self.z(row, col + 1),
            self.z(row + 1, col + 1),
            self.z(row + 1, col),
        ];
        if corners.iter().any(|v| v.is_nan()) {
            return;
        }

        // Corner order: bottom-left, bottom-right, top-right, top-left
        let states = [
            self.above(row, col),
            self.above(row, col + 1),
            self.above(row + 1, col + 1),
            self.above(row + 1, col),
        ];
        let bottom = Edge::Horizontal(row, col);
        let right = Edge::Vertical(row, col + 1);
        let top = Edge::Horizontal(row + 1, col);
        let left = Edge::Vertical(row, col);
        // Edges adjacent to each corner, same order as `states`
        let around = [(bottom, left), (bottom, right), (right, top), (top, left)];

        let crossed: Vec<Edge> = [
            (states[0] != states[1], bottom),
            (states[1] != states[2], right),
            (states[2] != states[3], top),
            (states[3] != states[0], left),
        ]
        .into_iter()
        .filter_map(|(crosses, edge)| crosses.then_some(edge))
        .collect();

        match crossed.len() {
            2 => out.push((crossed[0], crossed[1])),
            4 => {
                // Saddle: the cell centre decides which diagonal is connected
                let centre_above = corners.iter().sum::<f64>() / 4.0 > self.level;
                for (state, edges) in states.iter().zip(around) {
                    if *state != centre_above {
                        out.push(edges);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Extracts the iso-lines of `z` at `level`.
///
/// `z` is row-major with `y.len()` rows and `x.len()` columns. Cells with a
/// NaN corner produce no segments, so lines stop at missing data.
pub fn contour_paths(x: &[f64], y: &[f64], z: &[f64], level: f64) -> Vec<ContourPath> {
    if x.len() < 2 || y.len() < 2 || z.len() != x.len() * y.len() {
        return Vec::new();
    }

    let grid = Grid { x, y, z, level };
    let mut segments = Vec::new();
    for row in 0..y.len() - 1 {
        for col in 0..x.len() - 1 {
            grid.cell_segments(row, col, &mut segments);
        }
    }

    let mut by_edge: HashMap<Edge, Vec<usize>> = HashMap::new();
    for (idx, (a, b)) in segments.iter().enumerate() {
        by_edge.entry(*a).or_default().push(idx);
        by_edge.entry(*b).or_default().push(idx);
    }

    let mut used = vec![false; segments.len()];
    let mut paths = Vec::new();

    // Open paths start at an edge touched by a single segment
    for idx in 0..segments.len() {
        if used[idx] {
            continue;
        }
        let (a, b) = segments[idx];
        let start = if by_edge[&a].len() == 1 {
            Some(a)
        } else if by_edge[&b].len() == 1 {
            Some(b)
        } else {
            None
        };
        if let Some(start) = start {
            let edges = trace(start, idx, &segments, &by_edge, &mut used);
            paths.push(to_path(&grid, edges));
        }
    }

    // Everything left forms closed loops
    for idx in 0..segments.len() {
        if !used[idx] {
            let edges = trace(segments[idx].0, idx, &segments, &by_edge, &mut used);
            paths.push(to_path(&grid, edges));
        }
    }

    paths
}

fn trace(
    start: Edge,
    first: usize,
    segments: &[(Edge, Edge)],
    by_edge: &HashMap<Edge, Vec<usize>>,
    used: &mut [bool],
) -> Vec<Edge> {
    let mut edges = vec![start];
    let mut current = start;
    let mut segment = Some(first);

    while let Some(idx) = segment {
        used[idx] = true;
        let (a, b) = segments[idx];
        current = if a == current { b } else { a };
        edges.push(current);
        segment = by_edge[&current].iter().copied().find(|&s| !used[s]);
    }

    edges
}

fn to_path(grid: &Grid<'_>, edges: Vec<Edge>) -> ContourPath {
    let closed = edges.len() > 2 && edges.first() == edges.last();
    ContourPath {
        points: edges.into_iter().map(|e| grid.crossing(e)).collect(),
        closed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn test_single_peak_gives_closed_diamond() {
        let x = axis(3);
        let y = axis(3);
        let mut z = vec![0.0; 9];
        z[4] = 1.0;

        let paths = contour_paths(&x, &y, &z, 0.5);
        assert_eq!(paths.len(), 1);
        assert!(paths[0].closed);
        // Four crossings plus the repeated closing vertex
        assert_eq!(paths[0].points.len(), 5);
        for (px, py) in &paths[0].points {
            let d = (px - 1.0).abs() + (py - 1.0).abs();
            assert!((d - 0.5).abs() < 1e-12);
        }
    }

    fn endpoints(paths: &[ContourPath]) -> Vec<[(f64, f64); 2]> {
        let mut ends: Vec<[(f64, f64); 2]> = paths
            .iter()
            .map(|p| {
                let mut pair = [p.points[0], p.points[p.points.len() - 1]];
                pair.sort_by(|a, b| a.partial_cmp(b).unwrap());
                pair
            })
            .collect();
        ends.sort_by(|a, b| a.partial_cmp(b).unwrap());
        ends
    }

    fn assert_close(actual: [(f64, f64); 2], expected: [(f64, f64); 2]) {
        for (a, e) in actual.iter().zip(&expected) {
            assert!(
                (a.0 - e.0).abs() < 1e-12 && (a.1 - e.1).abs() < 1e-12,
                "{:?} != {:?}",
                actual,
                expected
            );
        }
    }

    #[test]
    fn test_saddle_follows_centre_mean() {
        let x = axis(2);
        let y = axis(2);

        // bl = 1, br = 0, tl = 0.2, tr = 1: centre mean 0.55 is above, so
        // the low corners br and tl are cut off
        let paths = contour_paths(&x, &y, &[1.0, 0.0, 0.2, 1.0], 0.5);
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| !p.closed && p.points.len() == 2));
        let ends = endpoints(&paths);
        assert_close(ends[0], [(0.0, 0.625), (0.375, 1.0)]);
        assert_close(ends[1], [(0.5, 0.0), (1.0, 0.5)]);

        // tl = 0 brings the centre mean to the level, so the high corners
        // bl and tr are cut off instead
        let paths = contour_paths(&x, &y, &[1.0, 0.0, 0.0, 1.0], 0.5);
        assert_eq!(paths.len(), 2);
        let ends = endpoints(&paths);
        assert_close(ends[0], [(0.0, 0.5), (0.5, 0.0)]);
        assert_close(ends[1], [(0.5, 1.0), (1.0, 0.5)]);
    }

    #[test]
    fn test_ramp_gives_open_path() {
        let x = axis(4);
        let y = axis(3);
        // z increases with x only
        let z: Vec<f64> = (0..3).flat_map(|_| (0..4).map(|c| c as f64)).collect();

        let paths = contour_paths(&x, &y, &z, 1.5);
        assert_eq!(paths.len(), 1);
        assert!(!paths[0].closed);
        assert_eq!(paths[0].points.len(), 3);
        assert!(paths[0].points.iter().all(|(px, _)| (px - 1.5).abs() < 1e-12));
    }

    #[test]
    fn test_two_peaks_give_two_paths() {
        let x = axis(5);
        let y = axis(3);
        let mut z = vec![0.0; 15];
        z[5 + 1] = 1.0;
        z[5 + 3] = 1.0;

        let paths = contour_paths(&x, &y, &z, 0.5);
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.closed));
    }

    #[test]
    fn test_level_outside_range_gives_nothing() {
        let x = axis(3);
        let y = axis(3);
        let z = vec![0.2; 9];
        assert!(contour_paths(&x, &y, &z, 0.9).is_empty());
    }

    #[test]
    fn test_nan_cells_are_skipped() {
        let x = axis(3);
        let y = axis(3);
        let mut z = vec![0.0; 9];
        z[4] = 1.0;
        z[0] = f64::NAN;

        // The loop around the peak is broken where the NaN corner sits
        let paths = contour_paths(&x, &y, &z, 0.5);
        assert_eq!(paths.len(), 1);
        assert!(!paths[0].closed);
    }
}
