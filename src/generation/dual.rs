//! Voronoi dual mesh construction from a Delaunay triangulation
//!
//! Builds one region per input point by walking the half-edge adjacency
//! around the point, and exposes the mesh navigation queries a map editor
//! needs (sides, triangles, regions).
//!
//! Naming: a *side* is a half-edge of the triangulation, a *triangle* is a
//! Delaunay triangle (a vertex of the dual), a *region* is the Voronoi cell of
//! one input point.

use glam::DVec2;
use std::time::Instant;

use super::delaunay::{circumcenter, next_halfedge, prev_halfedge, Triangulation, EMPTY};
use crate::error::{MeshError, Result, Stage};
use crate::region::Region;

/// One undirected triangulation edge and its dual
///
/// The dual edge separates `regions[0]` and `regions[1]` and runs between the
/// circumcentres of the two triangles. On the hull the outer triangle is
/// `None`: the dual edge leads to the exterior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DualEdge {
    /// Representative half-edge (the inner side)
    pub side: usize,
    /// Begin and end region of `side`
    pub regions: [usize; 2],
    /// Inner triangle and, unless on the hull, outer triangle
    pub triangles: (usize, Option<usize>),
}

impl DualEdge {
    /// Is this edge on the convex hull?
    #[inline]
    pub fn is_hull(&self) -> bool {
        self.triangles.1.is_none()
    }
}

/// Voronoi dual mesh of a point set
///
/// Immutable once built. Query indices must be in range (`side < side_count()`,
/// etc.) unless the method returns an `Option` or slice.
#[derive(Debug, Clone)]
pub struct DualMesh {
    points: Vec<DVec2>,
    triangles: Vec<usize>,
    halfedges: Vec<usize>,
    hull: Vec<usize>,
    /// Circumcentre per triangle
    centers: Vec<DVec2>,
    /// First outgoing side of each region (the hull side for hull regions)
    region_start: Vec<usize>,
    /// Number of outgoing sides of each region
    region_degree: Vec<usize>,
    regions: Vec<Region>,
}

fn inconsistency(index: usize, message: impl Into<String>) -> MeshError {
    MeshError::StructuralInconsistency {
        stage: Stage::DualGraph,
        index,
        message: message.into(),
    }
}

impl DualMesh {
    /// Build the dual mesh of a triangulated point set
    ///
    /// # Errors
    ///
    /// Returns `StructuralInconsistency` if the triangulation violates its
    /// invariants: mismatched array lengths, out-of-range point or opposite
    /// indices, non-reciprocal opposites, points without incident triangles,
    /// or a point whose triangles do not form a single fan. The structure is
    /// never patched.
    pub fn build(points: Vec<DVec2>, triangulation: Triangulation) -> Result<Self> {
        let start = Instant::now();
        let (triangles, halfedges, hull) = triangulation.into_parts();

        let (region_start, region_degree) = validate(&points, &triangles, &halfedges)?;

        let centers: Vec<DVec2> = triangles
            .chunks_exact(3)
            .map(|t| circumcenter(points[t[0]], points[t[1]], points[t[2]]))
            .collect();

        let mut mesh = Self {
            points,
            triangles,
            halfedges,
            hull,
            centers,
            region_start,
            region_degree,
            regions: Vec::new(),
        };

        let mut regions = Vec::with_capacity(mesh.points.len());
        for r in 0..mesh.points.len() {
            regions.push(mesh.build_region(r)?);
        }
        mesh.regions = regions;

        tracing::debug!(
            target: "dual_mesh_mapgen::generation",
            regions = mesh.regions.len(),
            triangles = mesh.triangle_count(),
            open_regions = mesh.regions.iter().filter(|r| !r.closed).count(),
            elapsed = ?start.elapsed(),
            "dual.build.done"
        );

        Ok(mesh)
    }

    /// Walk the outgoing sides of region `r` counter-clockwise
    ///
    /// Returns the sides and whether the walk closed on itself.
    fn walk_region(&self, r: usize) -> Result<(Vec<usize>, bool)> {
        let start = self.region_start[r];
        let mut sides = Vec::with_capacity(8);
        let mut s = start;

        loop {
            if self.triangles[s] != r {
                return Err(inconsistency(s, format!("side does not start at region {}", r)));
            }
            sides.push(s);
            if sides.len() > self.triangles.len() {
                return Err(inconsistency(r, "side walk around region does not terminate"));
            }

            match self.halfedges[prev_halfedge(s)] {
                EMPTY => return Ok((sides, false)),
                opposite => {
                    s = opposite;
                    if s == start {
                        return Ok((sides, true));
                    }
                }
            }
        }
    }

    fn build_region(&self, r: usize) -> Result<Region> {
        let (sides, closed) = self.walk_region(r)?;

        let outgoing = self.region_degree[r];
        if outgoing != sides.len() {
            return Err(inconsistency(
                r,
                format!(
                    "region has {} incident triangles but the side walk reaches {}",
                    outgoing,
                    sides.len()
                ),
            ));
        }
        if !closed && self.halfedges[self.region_start[r]] != EMPTY {
            return Err(inconsistency(r, "open region does not start at a hull side"));
        }

        let vertices = sides.iter().map(|&s| self.centers[s / 3]).collect();
        let mut neighbors: Vec<usize> = sides.iter().map(|&s| self.side_end_region(s)).collect();
        if !closed {
            if let Some(&last) = sides.last() {
                neighbors.push(self.triangles[prev_halfedge(last)]);
            }
        }

        Ok(Region::new(r, self.points[r], vertices, neighbors, closed))
    }

    /// Number of regions (input points)
    #[inline]
    pub fn region_count(&self) -> usize {
        self.points.len()
    }

    /// Number of triangles (dual vertices)
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Number of sides (half-edges)
    #[inline]
    pub fn side_count(&self) -> usize {
        self.triangles.len()
    }

    /// Input points in their original order
    #[inline]
    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    /// Convex hull as a counter-clockwise ring of region IDs
    #[inline]
    pub fn hull(&self) -> &[usize] {
        &self.hull
    }

    /// All regions, indexed by ID
    #[inline]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Get a region by ID
    #[inline]
    pub fn region(&self, r: usize) -> Option<&Region> {
        self.regions.get(r)
    }

    /// Seed point of region `r`
    #[inline]
    pub fn region_position(&self, r: usize) -> DVec2 {
        self.points[r]
    }

    /// IDs of the regions adjacent to `r` (empty for an unknown ID)
    pub fn region_neighbors(&self, r: usize) -> &[usize] {
        self.regions
            .get(r)
            .map(|region| region.neighbors.as_slice())
            .unwrap_or(&[])
    }

    /// Adjacent regions of `r` with the length of the shared triangulation edge
    ///
    /// Edge weights for shortest-path searches over the region graph. Yields
    /// nothing for an unknown ID.
    pub fn weighted_neighbors(&self, r: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let center = self.points.get(r).copied().unwrap_or(DVec2::ZERO);
        self.region_neighbors(r)
            .iter()
            .map(move |&n| (n, center.distance(self.points[n])))
    }

    /// Is region `r` on the convex hull?
    #[inline]
    pub fn is_hull_region(&self, r: usize) -> bool {
        !self.regions[r].closed
    }

    /// Outgoing sides of region `r`, counter-clockwise
    pub fn region_sides(&self, r: usize) -> Vec<usize> {
        let start = self.region_start[r];
        let mut sides = vec![start];
        let mut s = start;
        loop {
            match self.halfedges[prev_halfedge(s)] {
                EMPTY => break,
                opposite if opposite == start => break,
                opposite => {
                    sides.push(opposite);
                    s = opposite;
                }
            }
        }
        sides
    }

    /// Triangles incident to region `r`, counter-clockwise
    pub fn region_triangles(&self, r: usize) -> Vec<usize> {
        self.region_sides(r).into_iter().map(|s| s / 3).collect()
    }

    /// Next side in the same triangle
    #[inline]
    pub fn next_side(&self, s: usize) -> usize {
        next_halfedge(s)
    }

    /// Previous side in the same triangle
    #[inline]
    pub fn prev_side(&self, s: usize) -> usize {
        prev_halfedge(s)
    }

    /// Opposite side across the edge, `None` on the hull
    #[inline]
    pub fn opposite_side(&self, s: usize) -> Option<usize> {
        match self.halfedges[s] {
            EMPTY => None,
            h => Some(h),
        }
    }

    /// Is side `s` on the convex hull?
    #[inline]
    pub fn is_hull_side(&self, s: usize) -> bool {
        self.halfedges[s] == EMPTY
    }

    /// Region where side `s` starts
    #[inline]
    pub fn side_begin_region(&self, s: usize) -> usize {
        self.triangles[s]
    }

    /// Region where side `s` ends
    #[inline]
    pub fn side_end_region(&self, s: usize) -> usize {
        self.triangles[next_halfedge(s)]
    }

    /// Triangle that owns side `s`
    #[inline]
    pub fn side_inner_triangle(&self, s: usize) -> usize {
        s / 3
    }

    /// Triangle across side `s`, `None` on the hull
    #[inline]
    pub fn side_outer_triangle(&self, s: usize) -> Option<usize> {
        self.opposite_side(s).map(|h| h / 3)
    }

    /// Distance between the two regions joined by side `s`
    pub fn side_length(&self, s: usize) -> f64 {
        let begin = self.points[self.side_begin_region(s)];
        let end = self.points[self.side_end_region(s)];
        begin.distance(end)
    }

    /// The three sides of triangle `t`
    #[inline]
    pub fn triangle_sides(&self, t: usize) -> [usize; 3] {
        [3 * t, 3 * t + 1, 3 * t + 2]
    }

    /// The three regions (corners) of triangle `t`, counter-clockwise
    #[inline]
    pub fn triangle_regions(&self, t: usize) -> [usize; 3] {
        [
            self.triangles[3 * t],
            self.triangles[3 * t + 1],
            self.triangles[3 * t + 2],
        ]
    }

    /// Triangles sharing an edge with `t` (up to three; fewer on the hull)
    pub fn triangle_neighbors(&self, t: usize) -> Vec<usize> {
        self.triangle_sides(t)
            .iter()
            .filter_map(|&s| self.side_outer_triangle(s))
            .collect()
    }

    /// Circumcentre of triangle `t` (the dual vertex)
    #[inline]
    pub fn triangle_center(&self, t: usize) -> DVec2 {
        self.centers[t]
    }

    /// Centroid of triangle `t`
    pub fn triangle_centroid(&self, t: usize) -> DVec2 {
        let [a, b, c] = self.triangle_regions(t);
        (self.points[a] + self.points[b] + self.points[c]) / 3.0
    }

    /// Iterate over undirected edges, one [`DualEdge`] per triangulation edge
    pub fn edges(&self) -> impl Iterator<Item = DualEdge> + '_ {
        (0..self.side_count()).filter_map(move |s| {
            let opposite = self.opposite_side(s);
            match opposite {
                Some(h) if h < s => None,
                _ => Some(DualEdge {
                    side: s,
                    regions: [self.side_begin_region(s), self.side_end_region(s)],
                    triangles: (s / 3, opposite.map(|h| h / 3)),
                }),
            }
        })
    }
}

/// Check the triangulation invariants, pick each region's starting side and
/// count its outgoing sides
fn validate(
    points: &[DVec2],
    triangles: &[usize],
    halfedges: &[usize],
) -> Result<(Vec<usize>, Vec<usize>)> {
    let n = points.len();
    let sides = triangles.len();

    if halfedges.len() != sides {
        return Err(inconsistency(
            sides.min(halfedges.len()),
            format!(
                "{} triangle indices but {} half-edges",
                sides,
                halfedges.len()
            ),
        ));
    }
    if sides == 0 || sides % 3 != 0 {
        return Err(inconsistency(sides, "triangle index count is not a positive multiple of 3"));
    }

    let mut any_start = vec![EMPTY; n];
    let mut hull_start = vec![EMPTY; n];
    let mut degree = vec![0usize; n];

    for (s, &r) in triangles.iter().enumerate() {
        if r >= n {
            return Err(inconsistency(s, format!("point index {} out of range ({} points)", r, n)));
        }

        match halfedges[s] {
            EMPTY => {
                if hull_start[r] != EMPTY {
                    return Err(inconsistency(
                        s,
                        format!("region {} has two outgoing hull sides", r),
                    ));
                }
                hull_start[r] = s;
            }
            h => {
                if h >= sides {
                    return Err(inconsistency(s, format!("dangling opposite half-edge {}", h)));
                }
                if halfedges[h] != s {
                    return Err(inconsistency(
                        s,
                        format!("opposite {} points back to {}", h, halfedges[h]),
                    ));
                }
                if triangles[h] != triangles[next_halfedge(s)] || triangles[next_halfedge(h)] != r {
                    return Err(inconsistency(
                        s,
                        format!("opposite {} does not span the same edge", h),
                    ));
                }
            }
        }

        if any_start[r] == EMPTY {
            any_start[r] = s;
        }
        degree[r] += 1;
    }

    let starts = (0..n)
        .map(|r| match (hull_start[r], any_start[r]) {
            (EMPTY, EMPTY) => Err(inconsistency(r, "point has no incident triangle")),
            (EMPTY, s) => Ok(s),
            (s, _) => Ok(s),
        })
        .collect::<Result<Vec<usize>>>()?;

    Ok((starts, degree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::delaunay::triangulate;
    use crate::generation::lcg::Lcg;
    use crate::generation::poisson::PoissonDiskSampler;

    fn square() -> Vec<DVec2> {
        vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(0.0, 10.0),
            DVec2::new(10.0, 10.0),
        ]
    }

    fn sampled_mesh(seed: u32) -> DualMesh {
        let sampler = PoissonDiskSampler::new(200.0, 150.0, 12.0, 30).unwrap();
        let points = sampler.sample(&mut Lcg::new(seed));
        let triangulation = triangulate(&points).unwrap();
        DualMesh::build(points, triangulation).unwrap()
    }

    /// Hexagon of six points around a centre point
    fn wheel() -> Vec<DVec2> {
        let mut points = vec![DVec2::ZERO];
        for k in 0..6 {
            let angle = k as f64 * std::f64::consts::TAU / 6.0 + 0.1;
            points.push(DVec2::new(angle.cos(), angle.sin()) * 10.0);
        }
        points
    }

    #[test]
    fn test_square_mesh() {
        let points = square();
        let t = triangulate(&points).unwrap();
        let mesh = DualMesh::build(points, t).unwrap();

        assert_eq!(mesh.region_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.hull().len(), 4);

        // Every point is on the hull, so every region is open
        assert!(mesh.regions().iter().all(|r| !r.closed));

        let edges: Vec<DualEdge> = mesh.edges().collect();
        assert_eq!(edges.len(), 5);
        assert_eq!(edges.iter().filter(|e| !e.is_hull()).count(), 1);

        // Both triangles share the same circumcentre: the square's centre
        assert!(mesh.triangle_center(0).distance(DVec2::new(5.0, 5.0)) < 1e-12);
        assert!(mesh.triangle_center(1).distance(DVec2::new(5.0, 5.0)) < 1e-12);
    }

    #[test]
    fn test_interior_region_is_closed_ring() {
        let points = wheel();
        let t = triangulate(&points).unwrap();
        let mesh = DualMesh::build(points, t).unwrap();

        let center = mesh.region(0).unwrap();
        assert!(center.closed);
        assert_eq!(center.vertex_count(), 6);
        assert_eq!(center.neighbor_count(), 6);
        assert!(center.area() > 0.0, "counter-clockwise polygon has positive area");

        let mut neighbors = center.neighbors.clone();
        neighbors.sort();
        assert_eq!(neighbors, vec![1, 2, 3, 4, 5, 6]);

        for r in 1..7 {
            let region = mesh.region(r).unwrap();
            assert!(region.is_hull());
            assert!(mesh.is_hull_region(r));
            assert_eq!(region.vertex_count(), 2);
            assert_eq!(region.neighbor_count(), 3);
        }
    }

    #[test]
    fn test_dual_consistency() {
        let mesh = sampled_mesh(42);

        for region in mesh.regions() {
            let incident = (0..mesh.triangle_count())
                .filter(|&t| mesh.triangle_regions(t).contains(&region.id))
                .count();
            assert_eq!(region.vertex_count(), incident, "region {}", region.id);
            assert_eq!(mesh.region_triangles(region.id).len(), incident);

            let expected_neighbors = if region.closed { incident } else { incident + 1 };
            assert_eq!(region.neighbor_count(), expected_neighbors);
        }
    }

    #[test]
    fn test_region_polygons_wind_counter_clockwise() {
        let mesh = sampled_mesh(7);

        for region in mesh.regions().iter().filter(|r| r.closed) {
            let n = region.vertices.len();
            for i in 0..n {
                let a = region.vertices[i] - region.center;
                let b = region.vertices[(i + 1) % n] - region.center;
                assert!(a.perp_dot(b) >= -1e-9, "region {} winds clockwise", region.id);
            }
        }
    }

    #[test]
    fn test_hull_regions_match_hull() {
        let mesh = sampled_mesh(3);

        let mut from_regions: Vec<usize> = mesh
            .regions()
            .iter()
            .filter(|r| !r.closed)
            .map(|r| r.id)
            .collect();
        from_regions.sort();

        let mut hull = mesh.hull().to_vec();
        hull.sort();

        assert_eq!(from_regions, hull);
    }

    #[test]
    fn test_neighbor_symmetry_and_shared_edges() {
        let mesh = sampled_mesh(12345);

        for region in mesh.regions() {
            for &neighbor in &region.neighbors {
                assert!(
                    mesh.region(neighbor).unwrap().is_neighbor_of(region.id),
                    "neighbor relationship should be symmetric"
                );
            }
        }

        // Adjacent regions share exactly one edge
        let mut pairs: Vec<(usize, usize)> = mesh
            .edges()
            .map(|e| (e.regions[0].min(e.regions[1]), e.regions[0].max(e.regions[1])))
            .collect();
        let total = pairs.len();
        pairs.sort();
        pairs.dedup();
        assert_eq!(pairs.len(), total);
    }

    #[test]
    fn test_side_navigation() {
        let mesh = sampled_mesh(5);

        for s in 0..mesh.side_count() {
            assert_eq!(mesh.next_side(mesh.prev_side(s)), s);
            assert_eq!(mesh.side_inner_triangle(s), s / 3);
            assert_eq!(mesh.side_begin_region(mesh.next_side(s)), mesh.side_end_region(s));

            match mesh.opposite_side(s) {
                Some(h) => {
                    assert!(!mesh.is_hull_side(s));
                    assert_eq!(mesh.side_begin_region(h), mesh.side_end_region(s));
                    assert_eq!(mesh.side_outer_triangle(s), Some(mesh.side_inner_triangle(h)));
                    assert!((mesh.side_length(s) - mesh.side_length(h)).abs() < 1e-12);
                }
                None => {
                    assert!(mesh.is_hull_side(s));
                    assert!(mesh.side_outer_triangle(s).is_none());
                }
            }

            // Sampled points are at least the spacing apart
            assert!(mesh.side_length(s) >= 12.0);
        }

        for t in 0..mesh.triangle_count() {
            let neighbors = mesh.triangle_neighbors(t);
            assert!(neighbors.len() <= 3);
            for n in neighbors {
                assert!(mesh.triangle_neighbors(n).contains(&t));
            }
            let centroid = mesh.triangle_centroid(t);
            assert!(centroid.is_finite());
        }
    }

    #[test]
    fn test_weighted_neighbors_match_side_lengths() {
        let mesh = sampled_mesh(21);

        for r in 0..mesh.region_count() {
            let weighted: Vec<(usize, f64)> = mesh.weighted_neighbors(r).collect();
            assert_eq!(weighted.len(), mesh.region_neighbors(r).len());

            for s in mesh.region_sides(r) {
                let end = mesh.side_end_region(s);
                let &(_, length) = weighted.iter().find(|(n, _)| *n == end).unwrap();
                assert_eq!(length, mesh.side_length(s));
            }
        }

        assert_eq!(mesh.weighted_neighbors(mesh.region_count()).count(), 0);
    }

    #[test]
    fn test_region_sides_are_outgoing() {
        let mesh = sampled_mesh(8);
        for r in 0..mesh.region_count() {
            for s in mesh.region_sides(r) {
                assert_eq!(mesh.side_begin_region(s), r);
            }
        }
        assert!(mesh.region_neighbors(mesh.region_count()).is_empty());
    }

    #[test]
    fn test_dangling_opposite() {
        let points = square();
        let t = triangulate(&points).unwrap();
        let (triangles, mut halfedges, hull) = t.into_parts();
        let interior = halfedges.iter().position(|&h| h != EMPTY).unwrap();
        halfedges[interior] = 99;

        let result = DualMesh::build(points, Triangulation::from_raw(triangles, halfedges, hull));
        match result {
            Err(MeshError::StructuralInconsistency { stage, index, .. }) => {
                assert_eq!(stage, Stage::DualGraph);
                assert_eq!(index, interior);
            }
            other => panic!("expected structural inconsistency, got {:?}", other),
        }
    }

    #[test]
    fn test_non_reciprocal_opposite() {
        let points = wheel();
        let t = triangulate(&points).unwrap();
        let (triangles, mut halfedges, hull) = t.into_parts();

        // Point an interior half-edge at some other half-edge
        let a = halfedges.iter().position(|&h| h != EMPTY).unwrap();
        let other = (0..halfedges.len())
            .find(|&e| e != a && e != halfedges[a])
            .unwrap();
        halfedges[a] = other;

        let result = DualMesh::build(points, Triangulation::from_raw(triangles, halfedges, hull));
        assert!(matches!(result, Err(MeshError::StructuralInconsistency { .. })));
    }

    #[test]
    fn test_mismatched_lengths_and_orphans() {
        let points = square();
        let result = DualMesh::build(
            points.clone(),
            Triangulation::from_raw(vec![0, 1, 2], vec![EMPTY, EMPTY], vec![]),
        );
        assert!(matches!(result, Err(MeshError::StructuralInconsistency { .. })));

        // Point 3 has no incident triangle
        let result = DualMesh::build(
            points.clone(),
            Triangulation::from_raw(vec![0, 1, 2], vec![EMPTY, EMPTY, EMPTY], vec![0, 1, 2]),
        );
        assert!(matches!(
            result,
            Err(MeshError::StructuralInconsistency { index: 3, .. })
        ));

        let result = DualMesh::build(
            points,
            Triangulation::from_raw(vec![0, 1, 7], vec![EMPTY, EMPTY, EMPTY], vec![]),
        );
        assert!(matches!(
            result,
            Err(MeshError::StructuralInconsistency { index: 2, .. })
        ));
    }

    #[test]
    fn test_deterministic_build() {
        let a = sampled_mesh(99);
        let b = sampled_mesh(99);
        assert_eq!(a.regions(), b.regions());
        assert_eq!(a.edges().collect::<Vec<_>>(), b.edges().collect::<Vec<_>>());
    }
}
