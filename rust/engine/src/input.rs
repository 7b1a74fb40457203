// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Input preparation: buffer validation, duplicate-point removal and
//! degenerate-triangle rejection.
//!
//! Points are sorted lexicographically by (x, y, z) and deduplicated with
//! a permutation map; triangles are remapped and dropped when their three
//! vertices are collinear. In two-input mode the second model's indices
//! are offset past the first model's points before the shared dedup, and
//! its triangles are tagged [`ConstraintGroup::B`].

use nalgebra::Point3;
use polycut_complex::ConstraintGroup;
use polycut_predicates::misaligned;

use crate::error::{Error, Result};

/// One input model: float64 coordinates (3·N) and uint32 triangle
/// indices (3·T), exactly as handed over by the caller.
#[derive(Debug, Clone, Default)]
pub struct TriangleSoup {
    pub coords: Vec<f64>,
    pub indices: Vec<u32>,
}

impl TriangleSoup {
    pub fn new(coords: Vec<f64>, indices: Vec<u32>) -> Self {
        Self { coords, indices }
    }

    #[inline]
    pub fn num_points(&self) -> usize {
        self.coords.len() / 3
    }

    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Structural checks: buffer shapes, finiteness, index ranges.
    pub fn validate(&self) -> Result<()> {
        if self.coords.len() % 3 != 0 {
            return Err(Error::RaggedCoordinates(self.coords.len()));
        }
        if self.indices.len() % 3 != 0 {
            return Err(Error::RaggedIndices(self.indices.len()));
        }
        if let Some(pos) = self.coords.iter().position(|c| !c.is_finite()) {
            return Err(Error::NonFiniteCoordinate(pos));
        }
        let points = self.num_points();
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= points) {
            return Err(Error::IndexOutOfRange { index, points });
        }
        Ok(())
    }
}

/// The deduplicated, degenerate-free input handed to the collaborators.
#[derive(Debug, Clone)]
pub struct PreparedInput {
    pub points: Vec<Point3<f64>>,
    pub triangles: Vec<[u32; 3]>,
    pub groups: Vec<ConstraintGroup>,
}

fn point_of(coords: &[f64], i: usize) -> Point3<f64> {
    Point3::new(coords[3 * i], coords[3 * i + 1], coords[3 * i + 2])
}

/// Deduplicates, remaps and filters one or two models into a single
/// point/constraint set.
pub fn prepare(a: &TriangleSoup, b: Option<&TriangleSoup>) -> Result<PreparedInput> {
    a.validate()?;
    if let Some(b) = b {
        b.validate()?;
    }

    let mut coords: Vec<f64> = a.coords.clone();
    if let Some(b) = b {
        coords.extend_from_slice(&b.coords);
    }
    let total = coords.len() / 3;

    // Lexicographic sort, then collapse coincident points; `remap` sends
    // every original index to its unique representative.
    let mut order: Vec<u32> = (0..total as u32).collect();
    order.sort_by(|&i, &j| {
        let p = point_of(&coords, i as usize);
        let q = point_of(&coords, j as usize);
        p.x.total_cmp(&q.x)
            .then(p.y.total_cmp(&q.y))
            .then(p.z.total_cmp(&q.z))
    });

    let mut points: Vec<Point3<f64>> = Vec::with_capacity(total);
    let mut remap = vec![0u32; total];
    for &orig in &order {
        let p = point_of(&coords, orig as usize);
        if points.last() != Some(&p) {
            points.push(p);
        }
        remap[orig as usize] = (points.len() - 1) as u32;
    }
    tracing::debug!(unique = points.len(), input = total, "points deduplicated");

    if points.len() < 4 {
        return Err(Error::TooFewVertices(points.len()));
    }

    // Remap triangles, dropping collinear ones.
    let mut triangles = Vec::with_capacity(a.num_triangles());
    let mut groups = Vec::with_capacity(a.num_triangles());
    let push_tris = |soup: &TriangleSoup, offset: u32, group: ConstraintGroup,
                         triangles: &mut Vec<[u32; 3]>,
                         groups: &mut Vec<ConstraintGroup>| {
        for t in soup.indices.chunks_exact(3) {
            let tri = [
                remap[(t[0] + offset) as usize],
                remap[(t[1] + offset) as usize],
                remap[(t[2] + offset) as usize],
            ];
            if misaligned(
                &points[tri[0] as usize],
                &points[tri[1] as usize],
                &points[tri[2] as usize],
            ) {
                triangles.push(tri);
                groups.push(group);
            }
        }
    };
    push_tris(a, 0, ConstraintGroup::A, &mut triangles, &mut groups);
    if let Some(b) = b {
        push_tris(
            b,
            a.num_points() as u32,
            ConstraintGroup::B,
            &mut triangles,
            &mut groups,
        );
    }
    tracing::debug!(constraints = triangles.len(), "non-degenerate constraints kept");

    if triangles.is_empty() {
        return Err(Error::NoConstraints);
    }

    Ok(PreparedInput {
        points,
        triangles,
        groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetra_soup() -> TriangleSoup {
        TriangleSoup::new(
            vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, //
                0.0, 0.0, 1.0,
            ],
            vec![0, 1, 2, 0, 1, 3, 0, 2, 3, 1, 2, 3],
        )
    }

    #[test]
    fn clean_input_passes_through() {
        let prepared = prepare(&tetra_soup(), None).unwrap();
        assert_eq!(prepared.points.len(), 4);
        assert_eq!(prepared.triangles.len(), 4);
        assert!(prepared.groups.iter().all(|&g| g == ConstraintGroup::A));
    }

    #[test]
    fn duplicates_collapse_onto_one_representative() {
        let soup = TriangleSoup::new(
            vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, // duplicate of point 1
                0.0, 1.0, 0.0, //
                0.0, 0.0, 1.0,
            ],
            vec![0, 1, 3, 0, 2, 4],
        );
        let prepared = prepare(&soup, None).unwrap();
        assert_eq!(prepared.points.len(), 4);
        // Both triangles survive and reference the same representative.
        assert_eq!(prepared.triangles.len(), 2);
        let t0 = prepared.triangles[0];
        let t1 = prepared.triangles[1];
        assert_eq!(t0[1], t1[1]);
    }

    #[test]
    fn collinear_triangles_are_dropped() {
        let soup = TriangleSoup::new(
            vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                2.0, 0.0, 0.0, // on the same line
                0.0, 1.0, 0.0, //
                0.0, 0.0, 1.0,
            ],
            vec![0, 1, 2, 0, 1, 3],
        );
        let prepared = prepare(&soup, None).unwrap();
        assert_eq!(prepared.triangles.len(), 1);
    }

    #[test]
    fn second_model_points_merge_and_tag_b() {
        let a = tetra_soup();
        // Shares one corner with model A.
        let b = TriangleSoup::new(
            vec![
                0.0, 0.0, 0.0, //
                -1.0, 0.0, 0.0, //
                0.0, -1.0, 0.0,
            ],
            vec![0, 1, 2],
        );
        let prepared = prepare(&a, Some(&b)).unwrap();
        assert_eq!(prepared.points.len(), 6);
        assert_eq!(prepared.triangles.len(), 5);
        assert_eq!(prepared.groups[4], ConstraintGroup::B);
        // The shared corner resolved to a single representative.
        let shared = prepared.triangles[4][0];
        assert!(prepared.triangles[..4].iter().any(|t| t.contains(&shared)));
    }

    #[test]
    fn structural_errors() {
        assert!(matches!(
            prepare(&TriangleSoup::new(vec![1.0, 2.0], vec![]), None),
            Err(Error::RaggedCoordinates(2))
        ));
        assert!(matches!(
            prepare(
                &TriangleSoup::new(vec![0.0, 0.0, f64::NAN], vec![]),
                None
            ),
            Err(Error::NonFiniteCoordinate(2))
        ));
        assert!(matches!(
            prepare(&TriangleSoup::new(vec![0.0; 9], vec![0, 1, 3]), None),
            Err(Error::IndexOutOfRange { index: 3, .. })
        ));
        let degenerate = TriangleSoup::new(vec![0.0; 12], vec![0, 1, 2]);
        assert!(matches!(
            prepare(&degenerate, None),
            Err(Error::TooFewVertices(1))
        ));
        // Four good points but only a collinear triangle.
        let no_constraints = TriangleSoup::new(
            vec![
                0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0, 0.0,
            ],
            vec![0, 1, 2],
        );
        assert!(matches!(prepare(&no_constraints, None), Err(Error::NoConstraints)));
    }
}
