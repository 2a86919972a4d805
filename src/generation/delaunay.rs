//! Delaunay triangulation (sweep-hull)
//!
//! Triangulates a planar point set into counter-clockwise triangles with a
//! half-edge adjacency array.
//!
//! # Algorithm
//!
//! 1. Seed triangle: the point nearest the bounding-box centre, its nearest
//!    neighbour, and the point forming the smallest circumcircle with them
//! 2. Sort the remaining points by distance from the seed circumcentre (ties
//!    broken by point index)
//! 3. Add points in that order: each one sees part of the current convex hull
//!    (found through an angular hash of hull vertices), is connected to every
//!    visible hull edge, and the new edges are legalized by flipping
//!
//! An edge is flipped only when the opposite point lies strictly inside the
//! circumcircle. Co-circular configurations keep the diagonal produced by the
//! insertion order, which is itself fully determined by the input order.
//!
//! # Layout
//!
//! Half-edge `e` belongs to triangle `e / 3` and runs from `triangles[e]` to
//! `triangles[next_halfedge(e)]`. `halfedges[e]` is the opposite half-edge in
//! the neighbouring triangle, or [`EMPTY`] on the convex hull.

use glam::DVec2;
use std::time::Instant;

use crate::error::{MeshError, Result};

/// Sentinel for "no opposite half-edge" (hull edge)
pub const EMPTY: usize = usize::MAX;

/// Distance below which two rescaled points are treated as coincident
const EPSILON: f64 = f64::EPSILON * 2.0;

/// Next half-edge in the same triangle
#[inline]
pub fn next_halfedge(e: usize) -> usize {
    if e % 3 == 2 {
        e - 2
    } else {
        e + 1
    }
}

/// Previous half-edge in the same triangle
#[inline]
pub fn prev_halfedge(e: usize) -> usize {
    if e % 3 == 0 {
        e + 2
    } else {
        e - 1
    }
}

/// Twice the signed area of `(a, b, c)`; positive when counter-clockwise
#[inline]
pub fn orient(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Is `p` strictly inside the circumcircle of counter-clockwise `(a, b, c)`?
#[inline]
pub fn in_circumcircle(a: DVec2, b: DVec2, c: DVec2, p: DVec2) -> bool {
    let (dx, dy) = (a.x - p.x, a.y - p.y);
    let (ex, ey) = (b.x - p.x, b.y - p.y);
    let (fx, fy) = (c.x - p.x, c.y - p.y);

    let ap = dx * dx + dy * dy;
    let bp = ex * ex + ey * ey;
    let cp = fx * fx + fy * fy;

    dx * (ey * cp - bp * fy) - dy * (ex * cp - bp * fx) + ap * (ex * fy - ey * fx) > 0.0
}

/// Offset of the circumcentre of `(a, b, c)` from `a`
#[inline]
fn circumdelta(a: DVec2, b: DVec2, c: DVec2) -> DVec2 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let (ex, ey) = (c.x - a.x, c.y - a.y);

    let bl = dx * dx + dy * dy;
    let cl = ex * ex + ey * ey;
    let d = 0.5 / (dx * ey - dy * ex);

    DVec2::new((ey * bl - dy * cl) * d, (dx * cl - ex * bl) * d)
}

/// Squared circumradius of `(a, b, c)`; infinite or NaN when collinear
#[inline]
fn circumradius_squared(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    circumdelta(a, b, c).length_squared()
}

/// Circumcentre of `(a, b, c)`
#[inline]
pub fn circumcenter(a: DVec2, b: DVec2, c: DVec2) -> DVec2 {
    a + circumdelta(a, b, c)
}

/// Output of [`triangulate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triangulation {
    triangles: Vec<usize>,
    halfedges: Vec<usize>,
    hull: Vec<usize>,
}

impl Triangulation {
    fn with_capacity(n: usize) -> Self {
        let max_triangles = if n > 2 { 2 * n - 5 } else { 0 };
        Self {
            triangles: Vec::with_capacity(max_triangles * 3),
            halfedges: Vec::with_capacity(max_triangles * 3),
            hull: Vec::new(),
        }
    }

    /// Assemble a triangulation from raw arrays
    ///
    /// No validation happens here; the dual builder checks the structure.
    pub fn from_raw(triangles: Vec<usize>, halfedges: Vec<usize>, hull: Vec<usize>) -> Self {
        Self {
            triangles,
            halfedges,
            hull,
        }
    }

    /// Point indices, three per counter-clockwise triangle
    #[inline]
    pub fn triangles(&self) -> &[usize] {
        &self.triangles
    }

    /// Opposite half-edge of each half-edge ([`EMPTY`] on the hull)
    #[inline]
    pub fn halfedges(&self) -> &[usize] {
        &self.halfedges
    }

    /// Convex hull as a counter-clockwise ring of point indices
    #[inline]
    pub fn hull(&self) -> &[usize] {
        &self.hull
    }

    /// Number of triangles
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Opposite of half-edge `e`, `None` on the hull
    #[inline]
    pub fn opposite(&self, e: usize) -> Option<usize> {
        match self.halfedges[e] {
            EMPTY => None,
            h => Some(h),
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<usize>, Vec<usize>, Vec<usize>) {
        (self.triangles, self.halfedges, self.hull)
    }

    fn add_triangle(
        &mut self,
        i0: usize,
        i1: usize,
        i2: usize,
        a: usize,
        b: usize,
        c: usize,
    ) -> usize {
        let t = self.triangles.len();

        self.triangles.push(i0);
        self.triangles.push(i1);
        self.triangles.push(i2);

        self.halfedges.push(a);
        self.halfedges.push(b);
        self.halfedges.push(c);

        self.link(t, a);
        self.link(t + 1, b);
        self.link(t + 2, c);

        t
    }

    #[inline]
    fn link(&mut self, a: usize, b: usize) {
        self.halfedges[a] = b;
        if b != EMPTY {
            self.halfedges[b] = a;
        }
    }

    /// Flip edges until the triangles around half-edge `a` are Delaunay
    ///
    /// Returns the half-edge preceding the last legalized edge, which the
    /// caller records as the hull triangle of the newly inserted point.
    fn legalize(
        &mut self,
        mut a: usize,
        points: &[DVec2],
        hull: &mut Hull,
        stack: &mut Vec<usize>,
    ) -> usize {
        let mut ar;

        loop {
            let b = self.halfedges[a];

            // Quad around edge a/b:
            //           pl                    pl
            //          /||\                  /  \
            //       al/ || \bl            al/    \a
            //        /  ||  \              /      \
            //       /  a||b  \    flip    /___ar___\
            //     p0\   ||   /p1   =>   p0\---bl---/p1
            //        \  ||  /              \      /
            //       ar\ || /br             b\    /br
            //          \||/                  \  /
            //           pr                    pr
            ar = prev_halfedge(a);

            if b == EMPTY {
                match stack.pop() {
                    Some(next) => {
                        a = next;
                        continue;
                    }
                    None => break,
                }
            }

            let al = next_halfedge(a);
            let bl = prev_halfedge(b);

            let p0 = self.triangles[ar];
            let pr = self.triangles[a];
            let pl = self.triangles[al];
            let p1 = self.triangles[bl];

            if in_circumcircle(points[p0], points[pr], points[pl], points[p1]) {
                self.triangles[a] = p1;
                self.triangles[b] = p0;

                let hbl = self.halfedges[bl];
                let har = self.halfedges[ar];

                // Edge swapped on the other side of the hull: fix the hull triangle reference
                if hbl == EMPTY {
                    let mut e = hull.start;
                    loop {
                        if hull.tri[e] == bl {
                            hull.tri[e] = a;
                            break;
                        }
                        e = hull.prev[e];
                        if e == hull.start {
                            break;
                        }
                    }
                }

                self.link(a, hbl);
                self.link(b, har);
                self.link(ar, bl);

                stack.push(next_halfedge(b));
            } else {
                match stack.pop() {
                    Some(next) => a = next,
                    None => break,
                }
            }
        }

        ar
    }
}

/// Advancing convex hull: a doubly linked ring of point indices
struct Hull {
    prev: Vec<usize>,
    next: Vec<usize>,
    /// Half-edge of the hull edge starting at each hull point
    tri: Vec<usize>,
    hash: Vec<usize>,
    start: usize,
    center: DVec2,
}

impl Hull {
    fn new(n: usize, center: DVec2, seed: [usize; 3], points: &[DVec2]) -> Self {
        let hash_len = ((n as f64).sqrt().ceil() as usize).max(1);
        let [i0, i1, i2] = seed;

        let mut hull = Self {
            prev: vec![0; n],
            next: vec![0; n],
            tri: vec![0; n],
            hash: vec![EMPTY; hash_len],
            start: i0,
            center,
        };

        hull.next[i0] = i1;
        hull.prev[i2] = i1;
        hull.next[i1] = i2;
        hull.prev[i0] = i2;
        hull.next[i2] = i0;
        hull.prev[i1] = i0;

        hull.tri[i0] = 0;
        hull.tri[i1] = 1;
        hull.tri[i2] = 2;

        hull.hash_edge(points[i0], i0);
        hull.hash_edge(points[i1], i1);
        hull.hash_edge(points[i2], i2);

        hull
    }

    /// Monotone pseudo-angle of `p` around the centre, bucketed into the hash
    fn hash_key(&self, p: DVec2) -> usize {
        let d = p - self.center;
        let k = d.x / (d.x.abs() + d.y.abs());
        let a = (if d.y > 0.0 { 3.0 - k } else { 1.0 + k }) / 4.0;

        let len = self.hash.len();
        ((len as f64 * a).floor() as usize) % len
    }

    fn hash_edge(&mut self, p: DVec2, i: usize) {
        let key = self.hash_key(p);
        self.hash[key] = i;
    }

    /// First hull edge visible from `p`, and whether the walk back is needed
    fn find_visible_edge(&self, p: DVec2, points: &[DVec2]) -> Option<(usize, bool)> {
        let mut start = 0;
        let key = self.hash_key(p);
        let len = self.hash.len();

        for j in 0..len {
            start = self.hash[(key + j) % len];
            if start != EMPTY && self.next[start] != EMPTY {
                break;
            }
        }

        start = self.prev[start];
        let mut e = start;

        while !is_visible(points[e], points[self.next[e]], p) {
            e = self.next[e];
            if e == start {
                return None;
            }
        }

        Some((e, e == start))
    }
}

/// Hull edge `a -> b` (interior on its left) is visible from `p` on its right
#[inline]
fn is_visible(a: DVec2, b: DVec2, p: DVec2) -> bool {
    orient(a, b, p) < 0.0
}

fn degenerate(points: usize, reason: impl Into<String>) -> MeshError {
    MeshError::DegenerateInput {
        points,
        reason: reason.into(),
    }
}

fn find_seed_triangle(points: &[DVec2]) -> Result<[usize; 3]> {
    let (min, max) = points.iter().fold(
        (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
        |(min, max), p| (min.min(*p), max.max(*p)),
    );
    let center = (min + max) * 0.5;

    // Seed point closest to the bounding-box centre
    let i0 = closest_point(points, center, |_, _| true)
        .ok_or_else(|| degenerate(points.len(), "no points"))?;
    let p0 = points[i0];

    // Its nearest distinct neighbour
    let i1 = closest_point(points, p0, |i, d| i != i0 && d > 0.0)
        .ok_or_else(|| degenerate(points.len(), "all points coincide"))?;
    let p1 = points[i1];

    // Third point forming the smallest circumcircle with the first two
    let mut min_radius = f64::INFINITY;
    let mut i2 = EMPTY;
    for (i, p) in points.iter().enumerate() {
        if i == i0 || i == i1 {
            continue;
        }
        let r = circumradius_squared(p0, p1, *p);
        if r < min_radius {
            i2 = i;
            min_radius = r;
        }
    }

    if i2 == EMPTY {
        return Err(degenerate(points.len(), "all points are collinear"));
    }

    // Counter-clockwise seed
    if orient(p0, p1, points[i2]) < 0.0 {
        Ok([i0, i2, i1])
    } else {
        Ok([i0, i1, i2])
    }
}

/// Rescale by a power of two so the largest coordinate magnitude lies in `[0.5, 1)`
///
/// Multiplying by a power of two is exact, so orientation and circumcircle
/// tests keep their sign while squared distances stay clear of overflow and
/// underflow for coordinates of any magnitude.
fn rescaled(points: &[DVec2]) -> Vec<DVec2> {
    let magnitude = points
        .iter()
        .fold(0.0f64, |m, p| m.max(p.abs().max_element()));
    if magnitude == 0.0 {
        return points.to_vec();
    }

    // Split the factor in two so neither half leaves the f64 range
    let exponent = magnitude.log2().floor() as i32 + 1;
    let first = 2f64.powi(-exponent / 2);
    let second = 2f64.powi(-exponent - (-exponent / 2));

    points.iter().map(|p| *p * first * second).collect()
}

fn closest_point<F>(points: &[DVec2], target: DVec2, accept: F) -> Option<usize>
where
    F: Fn(usize, f64) -> bool,
{
    let mut best = None;
    let mut min_distance = f64::INFINITY;

    for (i, p) in points.iter().enumerate() {
        let d = target.distance_squared(*p);
        if d < min_distance && accept(i, d) {
            best = Some(i);
            min_distance = d;
        }
    }

    best
}

/// Compute the Delaunay triangulation of a point set
///
/// # Errors
///
/// Returns `DegenerateInput` for fewer than 3 points, non-finite coordinates,
/// coincident points, or a fully collinear point set. No partial
/// triangulation is ever returned.
///
/// # Example
///
/// ```rust
/// use dual_mesh_mapgen::generation::triangulate;
/// use glam::DVec2;
///
/// let points = [
///     DVec2::new(0.0, 0.0),
///     DVec2::new(10.0, 0.0),
///     DVec2::new(0.0, 10.0),
///     DVec2::new(10.0, 10.0),
/// ];
/// let triangulation = triangulate(&points).unwrap();
/// assert_eq!(triangulation.triangle_count(), 2);
/// ```
pub fn triangulate(points: &[DVec2]) -> Result<Triangulation> {
    let start = Instant::now();
    let n = points.len();

    if n < 3 {
        return Err(degenerate(n, "at least 3 points are required"));
    }
    if let Some(i) = points.iter().position(|p| !p.is_finite()) {
        return Err(degenerate(n, format!("point {} has non-finite coordinates", i)));
    }

    let scaled = rescaled(points);
    let points = scaled.as_slice();

    let seed = find_seed_triangle(points)?;
    let [i0, i1, i2] = seed;
    let center = circumcenter(points[i0], points[i1], points[i2]);

    let mut triangulation = Triangulation::with_capacity(n);
    triangulation.add_triangle(i0, i1, i2, EMPTY, EMPTY, EMPTY);

    // Sweep order: distance from the seed circumcentre, then point index
    let mut order: Vec<(usize, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, center.distance_squared(*p)))
        .collect();
    order.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

    let mut hull = Hull::new(n, center, seed, points);
    let mut stack = Vec::with_capacity(512);

    for (k, &(i, _)) in order.iter().enumerate() {
        let p = points[i];

        if i == i0 || i == i1 || i == i2 {
            continue;
        }
        if k > 0 {
            let previous = points[order[k - 1].0];
            if (p.x - previous.x).abs() <= EPSILON && (p.y - previous.y).abs() <= EPSILON {
                return Err(degenerate(
                    n,
                    format!("points {} and {} coincide", order[k - 1].0, i),
                ));
            }
        }

        let (mut e, walk_back) = hull
            .find_visible_edge(p, points)
            .ok_or_else(|| degenerate(n, format!("point {} sees no hull edge", i)))?;

        // First triangle from the point
        let t = triangulation.add_triangle(e, i, hull.next[e], EMPTY, EMPTY, hull.tri[e]);
        hull.tri[i] = triangulation.legalize(t + 2, points, &mut hull, &mut stack);
        hull.tri[e] = t;

        // Walk forward through the hull
        let mut next = hull.next[e];
        loop {
            let q = hull.next[next];
            if !is_visible(points[next], points[q], p) {
                break;
            }
            let t = triangulation.add_triangle(next, i, q, hull.tri[i], EMPTY, hull.tri[next]);
            hull.tri[i] = triangulation.legalize(t + 2, points, &mut hull, &mut stack);
            hull.next[next] = EMPTY;
            next = q;
        }

        // Walk backward from the other side
        if walk_back {
            loop {
                let q = hull.prev[e];
                if !is_visible(points[q], points[e], p) {
                    break;
                }
                let t = triangulation.add_triangle(q, i, e, EMPTY, hull.tri[e], hull.tri[q]);
                triangulation.legalize(t + 2, points, &mut hull, &mut stack);
                hull.tri[q] = t;
                hull.next[e] = EMPTY;
                e = q;
            }
        }

        hull.prev[i] = e;
        hull.next[i] = next;
        hull.prev[next] = i;
        hull.next[e] = i;
        hull.start = e;

        hull.hash_edge(p, i);
        hull.hash_edge(points[e], e);
    }

    let mut e = hull.start;
    loop {
        triangulation.hull.push(e);
        e = hull.next[e];
        if e == hull.start {
            break;
        }
    }

    triangulation.triangles.shrink_to_fit();
    triangulation.halfedges.shrink_to_fit();

    tracing::debug!(
        target: "dual_mesh_mapgen::generation",
        points = n,
        triangles = triangulation.triangle_count(),
        hull = triangulation.hull.len(),
        elapsed = ?start.elapsed(),
        "delaunay.triangulate.done"
    );

    Ok(triangulation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_points(count: usize, seed: u64) -> Vec<DVec2> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..count)
            .map(|_| DVec2::new(rng.gen_range(0.0..1000.0), rng.gen_range(0.0..1000.0)))
            .collect()
    }

    fn triangle(t: &Triangulation, i: usize, points: &[DVec2]) -> [DVec2; 3] {
        let tri = &t.triangles()[3 * i..3 * i + 3];
        [points[tri[0]], points[tri[1]], points[tri[2]]]
    }

    fn assert_valid(t: &Triangulation, points: &[DVec2]) {
        assert_eq!(t.triangles().len(), t.halfedges().len());
        assert_eq!(t.triangles().len() % 3, 0);

        for (e, &h) in t.halfedges().iter().enumerate() {
            if h != EMPTY {
                assert_eq!(t.halfedges()[h], e, "half-edge {} not reciprocal", e);
                assert_eq!(t.triangles()[e], t.triangles()[next_halfedge(h)]);
                assert_eq!(t.triangles()[h], t.triangles()[next_halfedge(e)]);
            }
        }

        for i in 0..t.triangle_count() {
            let [a, b, c] = triangle(t, i, points);
            assert!(orient(a, b, c) > 0.0, "triangle {} is not counter-clockwise", i);
        }

        let hull_edges = t.halfedges().iter().filter(|&&h| h == EMPTY).count();
        assert_eq!(hull_edges, t.hull().len());
    }

    fn assert_delaunay(t: &Triangulation, points: &[DVec2]) {
        for i in 0..t.triangle_count() {
            let tri = &t.triangles()[3 * i..3 * i + 3];
            let [a, b, c] = triangle(t, i, points);
            let center = circumcenter(a, b, c);
            let radius = center.distance(a);
            for (j, p) in points.iter().enumerate() {
                if tri.contains(&j) {
                    continue;
                }
                assert!(
                    center.distance(*p) >= radius * (1.0 - 1e-9),
                    "point {} inside circumcircle of triangle {}",
                    j,
                    i
                );
            }
        }
    }

    #[test]
    fn test_single_triangle() {
        let points = [
            DVec2::new(0.0, 0.0),
            DVec2::new(4.0, 0.0),
            DVec2::new(1.0, 3.0),
        ];
        let t = triangulate(&points).unwrap();

        assert_eq!(t.triangle_count(), 1);
        assert!(t.halfedges().iter().all(|&h| h == EMPTY));
        assert!((0..3).all(|e| t.opposite(e).is_none()));
        assert_eq!(t.hull().len(), 3);
        assert_valid(&t, &points);
    }

    #[test]
    fn test_clockwise_input_becomes_counter_clockwise() {
        let points = [
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 3.0),
            DVec2::new(4.0, 0.0),
        ];
        let t = triangulate(&points).unwrap();
        assert_valid(&t, &points);
    }

    #[test]
    fn test_square_two_triangles() {
        let points = [
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(0.0, 10.0),
            DVec2::new(10.0, 10.0),
        ];
        let t = triangulate(&points).unwrap();

        assert_eq!(t.triangle_count(), 2);
        let interior: Vec<usize> = (0..6).filter(|&e| t.opposite(e).is_some()).collect();
        assert_eq!(interior.len(), 2, "exactly one shared interior edge pair");
        assert_eq!(t.halfedges()[interior[0]], interior[1]);
        assert_eq!(t.hull().len(), 4);
        assert_valid(&t, &points);
        assert_delaunay(&t, &points);
    }

    #[test]
    fn test_square_is_stable() {
        let points = [
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(0.0, 10.0),
            DVec2::new(10.0, 10.0),
        ];
        assert_eq!(triangulate(&points).unwrap(), triangulate(&points).unwrap());
    }

    #[test]
    fn test_too_few_points() {
        let points = [DVec2::new(0.0, 0.0), DVec2::new(1.0, 1.0)];
        let result = triangulate(&points);
        assert!(matches!(result, Err(MeshError::DegenerateInput { points: 2, .. })));

        assert!(triangulate(&[]).is_err());
    }

    #[test]
    fn test_collinear_points() {
        let points: Vec<DVec2> = (0..10).map(|i| DVec2::new(i as f64, 2.0 * i as f64)).collect();
        let result = triangulate(&points);
        assert!(matches!(result, Err(MeshError::DegenerateInput { .. })));
    }

    #[test]
    fn test_coincident_points() {
        let points = [
            DVec2::new(0.0, 0.0),
            DVec2::new(5.0, 0.0),
            DVec2::new(0.0, 5.0),
            DVec2::new(5.0, 5.0),
            DVec2::new(5.0, 5.0),
        ];
        assert!(matches!(
            triangulate(&points),
            Err(MeshError::DegenerateInput { .. })
        ));

        let same = [DVec2::ONE, DVec2::ONE, DVec2::ONE];
        assert!(triangulate(&same).is_err());
    }

    #[test]
    fn test_non_finite_points() {
        let points = [
            DVec2::new(0.0, 0.0),
            DVec2::new(f64::NAN, 0.0),
            DVec2::new(0.0, 5.0),
        ];
        assert!(matches!(
            triangulate(&points),
            Err(MeshError::DegenerateInput { .. })
        ));
    }

    #[test]
    fn test_random_points_are_delaunay() {
        for seed in [1, 2, 3] {
            let points = random_points(300, seed);
            let t = triangulate(&points).unwrap();

            assert_valid(&t, &points);
            assert_delaunay(&t, &points);

            // Euler: 2n - 2 - h triangles for points in general position
            assert_eq!(t.triangle_count(), 2 * points.len() - 2 - t.hull().len());
        }
    }

    #[test]
    fn test_grid_points() {
        // Many co-circular quads: exercises the tie rule
        let points: Vec<DVec2> = (0..10)
            .flat_map(|y| (0..10).map(move |x| DVec2::new(x as f64, y as f64)))
            .collect();
        let t = triangulate(&points).unwrap();

        assert_valid(&t, &points);
        assert_delaunay(&t, &points);
        assert_eq!(t.triangle_count(), 2 * 9 * 9);
        assert_eq!(t, triangulate(&points).unwrap());
    }

    #[test]
    fn test_hull_is_counter_clockwise() {
        let points = random_points(100, 8);
        let t = triangulate(&points).unwrap();
        let hull = t.hull();

        for k in 0..hull.len() {
            let a = points[hull[k]];
            let b = points[hull[(k + 1) % hull.len()]];
            let c = points[hull[(k + 2) % hull.len()]];
            assert!(orient(a, b, c) >= 0.0, "hull turns clockwise at {}", k);
        }
    }

    #[test]
    fn test_extreme_coordinate_scales() {
        let huge = [
            DVec2::new(0.0, 0.0),
            DVec2::new(1e160, 0.0),
            DVec2::new(0.0, 1e160),
            DVec2::new(1e160, 1e160),
        ];
        let t = triangulate(&huge).unwrap();
        assert_eq!(t.triangle_count(), 2);
        assert_eq!(t.hull().len(), 4);
        let unit: Vec<DVec2> = huge.iter().map(|p| *p * 1e-160).collect();
        assert_valid(&t, &unit);

        let tiny = [
            DVec2::new(0.0, 0.0),
            DVec2::new(1e-160, 0.0),
            DVec2::new(0.0, 1e-160),
        ];
        let t = triangulate(&tiny).unwrap();
        assert_eq!(t.triangle_count(), 1);
        let unit: Vec<DVec2> = tiny.iter().map(|p| *p * 1e160).collect();
        assert_valid(&t, &unit);

        let full_range = [
            DVec2::new(-1e308, -1e308),
            DVec2::new(1e308, -1e308),
            DVec2::new(0.0, 1e308),
        ];
        assert_eq!(triangulate(&full_range).unwrap().triangle_count(), 1);
    }

    #[test]
    fn test_rescaling_preserves_triangulation() {
        let points = random_points(200, 11);
        let scaled: Vec<DVec2> = points.iter().map(|p| *p * 1024.0).collect();

        assert_eq!(triangulate(&points).unwrap(), triangulate(&scaled).unwrap());
    }

    #[test]
    fn test_predicates() {
        let a = DVec2::new(0.0, 0.0);
        let b = DVec2::new(2.0, 0.0);
        let c = DVec2::new(0.0, 2.0);

        assert!(orient(a, b, c) > 0.0);
        assert!(orient(a, c, b) < 0.0);
        assert_eq!(circumcenter(a, b, c), DVec2::new(1.0, 1.0));
        assert!(in_circumcircle(a, b, c, DVec2::new(1.0, 1.5)));
        assert!(!in_circumcircle(a, b, c, DVec2::new(3.0, 3.0)));
        // Co-circular point is not strictly inside
        assert!(!in_circumcircle(a, b, c, DVec2::new(2.0, 2.0)));

        assert_eq!(next_halfedge(0), 1);
        assert_eq!(next_halfedge(2), 0);
        assert_eq!(prev_halfedge(3), 5);
        assert_eq!(prev_halfedge(4), 3);
    }
}
