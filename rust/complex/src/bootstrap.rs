// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bootstrap: building the initial complex from a tetrahedralization.
//!
//! The tetrahedralizer and the constraint-incidence analysis are external
//! collaborators; [`TetMesh`] and [`TetMaps`] are their interface. The
//! bootstrap turns every tetrahedron into one cell, deduplicating faces
//! against the lower-indexed neighbour and edges through an endpoint-pair
//! map, and seeds each face's colour and coplanar-constraint list.

use nalgebra::Point3;
use polycut_predicates::GenericPoint;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::arena::{Cell, Complex, Edge, Face, FaceColour, Provenance, GHOST_CELL};
use crate::constraint::ConstraintSet;

/// A tetrahedral mesh over the deduplicated input points, in input point
/// order.
///
/// `tet_node` stores four corner indices per tetrahedron. `tet_neigh`
/// stores, for slot `k` of a tetrahedron, the index of the neighbour
/// across the face *omitting corner `k`*, or `usize::MAX` when that face
/// is on the convex hull.
#[derive(Debug, Clone)]
pub struct TetMesh {
    pub points: Vec<Point3<f64>>,
    pub tet_node: Vec<u32>,
    pub tet_neigh: Vec<usize>,
}

impl TetMesh {
    #[inline]
    pub fn num_tets(&self) -> usize {
        self.tet_node.len() / 4
    }
}

/// Constraint incidence computed by the external collaborator.
///
/// `pending[t]` lists the constraints improperly piercing tetrahedron `t`;
/// `face_coplanar[t][k]` lists the constraints lying in the plane of the
/// face omitting corner `k`.
#[derive(Debug, Clone, Default)]
pub struct TetMaps {
    pub pending: Vec<Vec<u32>>,
    pub face_coplanar: Vec<[Vec<u32>; 4]>,
}

impl TetMaps {
    /// Empty maps for a mesh with `num_tets` tetrahedra.
    pub fn empty(num_tets: usize) -> Self {
        Self {
            pending: vec![Vec::new(); num_tets],
            face_coplanar: vec![Default::default(); num_tets],
        }
    }
}

/// The face triangle for each neighbour slot, in the corner order the
/// fingerprint keeps.
#[inline]
fn slot_triangle(v: [u32; 4], slot: usize) -> [u32; 3] {
    match slot {
        3 => [v[0], v[1], v[2]],
        2 => [v[3], v[0], v[1]],
        1 => [v[2], v[3], v[0]],
        _ => [v[1], v[2], v[3]],
    }
}

/// A face on the hull, or whose neighbour has a higher index, has not been
/// built yet.
#[inline]
fn tet_face_is_new(tet: usize, adj: usize) -> bool {
    adj == GHOST_CELL || adj > tet
}

fn seeded_colour(
    constraints: &ConstraintSet,
    coplanar: &[u32],
) -> (FaceColour, SmallVec<[u32; 2]>) {
    let real: SmallVec<[u32; 2]> = coplanar
        .iter()
        .copied()
        .filter(|&c| !constraints.is_virtual(c))
        .collect();
    if real.is_empty() {
        (FaceColour::White, real)
    } else {
        (FaceColour::Grey, real)
    }
}

impl Complex {
    /// Builds the initial complex: one cell per tetrahedron, shared faces
    /// and edges created once.
    pub fn from_tet_mesh(mesh: &TetMesh, constraints: ConstraintSet, maps: &TetMaps) -> Complex {
        let num_tets = mesh.num_tets();
        let mut complex = Complex {
            vertices: Vec::with_capacity(mesh.points.len()),
            edges: Vec::with_capacity(num_tets + mesh.points.len()),
            faces: Vec::with_capacity(num_tets * 2),
            cells: vec![Cell::default(); num_tets],
            constraints,
            vert_orient: Vec::with_capacity(mesh.points.len()),
            vert_visit: Vec::with_capacity(mesh.points.len()),
            edge_visit: Vec::new(),
        };
        for p in &mesh.points {
            complex.push_vertex(GenericPoint::Explicit(*p), Provenance::Input);
        }

        // Shared tetrahedron edges resolve through their endpoint pair.
        let mut edge_ids: FxHashMap<(u32, u32), usize> = FxHashMap::default();
        let mut edge_of = |complex: &mut Complex, a: u32, b: u32| -> usize {
            let key = (a.min(b), a.max(b));
            *edge_ids
                .entry(key)
                .or_insert_with(|| complex.push_edge(Edge::on_line(a, b, a, b)))
        };

        for tet in 0..num_tets {
            complex.cells[tet].constraints = maps.pending[tet].clone();

            let v = [
                mesh.tet_node[4 * tet],
                mesh.tet_node[4 * tet + 1],
                mesh.tet_node[4 * tet + 2],
                mesh.tet_node[4 * tet + 3],
            ];
            for slot in [3usize, 2, 1, 0] {
                let adj = mesh.tet_neigh[4 * tet + slot];
                if !tet_face_is_new(tet, adj) {
                    // The lower-indexed neighbour already created this
                    // face (and registered it with both cells).
                    continue;
                }
                let tri = slot_triangle(v, slot);
                let (colour, coplanar) =
                    seeded_colour(&complex.constraints, &maps.face_coplanar[tet][slot]);
                let face_id = complex.push_face(Face::new(tri, tet, adj, colour));
                complex.faces[face_id].coplanar = coplanar;
                complex.cells[tet].faces.push(face_id);
                if adj != GHOST_CELL {
                    complex.cells[adj].faces.push(face_id);
                }
                for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                    let e = edge_of(&mut complex, a, b);
                    complex.faces[face_id].edges.push(e);
                    complex.edges[e].conn_face_0 = face_id;
                }
            }
        }

        tracing::debug!(
            cells = complex.cells.len(),
            faces = complex.faces.len(),
            edges = complex.edges.len(),
            "complex bootstrapped from tetrahedralization"
        );
        complex
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::ConstraintGroup;

    fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    /// One tetrahedron, all faces on the hull.
    fn single_tet() -> TetMesh {
        TetMesh {
            points: vec![
                p(0.0, 0.0, 0.0),
                p(1.0, 0.0, 0.0),
                p(0.0, 1.0, 0.0),
                p(0.0, 0.0, 1.0),
            ],
            tet_node: vec![0, 1, 2, 3],
            tet_neigh: vec![GHOST_CELL; 4],
        }
    }

    /// Two tetrahedra sharing the face {0, 1, 2}.
    fn bipyramid() -> TetMesh {
        TetMesh {
            points: vec![
                p(0.0, 0.0, 0.0),
                p(4.0, 0.0, 0.0),
                p(0.0, 4.0, 0.0),
                p(1.0, 1.0, 2.0),
                p(1.0, 1.0, -2.0),
            ],
            tet_node: vec![
                0, 1, 2, 3, // top
                0, 2, 1, 4, // bottom; slot 3 faces {0, 2, 1}
            ],
            tet_neigh: vec![
                GHOST_CELL, GHOST_CELL, GHOST_CELL, 1, //
                GHOST_CELL, GHOST_CELL, GHOST_CELL, 0,
            ],
        }
    }

    #[test]
    fn single_tet_counts() {
        let mesh = single_tet();
        let complex =
            Complex::from_tet_mesh(&mesh, ConstraintSet::new(Vec::new(), Vec::new()), &TetMaps::empty(1));
        assert_eq!(complex.cells.len(), 1);
        assert_eq!(complex.faces.len(), 4);
        assert_eq!(complex.edges.len(), 6);
        assert_eq!(complex.vertices.len(), 4);
        assert!(complex.faces.iter().all(|f| f.colour == FaceColour::White));
        assert!(complex.faces.iter().all(|f| f.conn_cells[1] == GHOST_CELL));
        assert_eq!(complex.cells[0].faces.len(), 4);
    }

    #[test]
    fn shared_entities_created_once() {
        let mesh = bipyramid();
        let complex =
            Complex::from_tet_mesh(&mesh, ConstraintSet::new(Vec::new(), Vec::new()), &TetMaps::empty(2));
        assert_eq!(complex.cells.len(), 2);
        // 4 + 4 faces minus the shared one.
        assert_eq!(complex.faces.len(), 7);
        // 6 + 6 edges minus the three shared ones.
        assert_eq!(complex.edges.len(), 9);
        // The shared face knows both cells.
        let shared: Vec<_> = complex
            .faces
            .iter()
            .filter(|f| f.conn_cells[1] != GHOST_CELL)
            .collect();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].conn_cells, [0, 1]);
        // And both cells list it.
        assert_eq!(complex.cells[0].faces.len(), 4);
        assert_eq!(complex.cells[1].faces.len(), 4);
    }

    #[test]
    fn colour_and_pending_seeding() {
        let mesh = single_tet();
        let constraints = ConstraintSet::new(
            vec![[0, 1, 2], [1, 2, 3]],
            vec![ConstraintGroup::A, ConstraintGroup::A],
        );
        let mut maps = TetMaps::empty(1);
        maps.face_coplanar[0][3] = vec![0]; // face {0, 1, 2}
        maps.pending[0] = vec![1];
        let complex = Complex::from_tet_mesh(&mesh, constraints, &maps);
        let grey: Vec<_> = complex
            .faces
            .iter()
            .filter(|f| f.colour == FaceColour::Grey)
            .collect();
        assert_eq!(grey.len(), 1);
        assert_eq!(grey[0].plane, [0, 1, 2]);
        assert_eq!(grey[0].coplanar.as_slice(), &[0]);
        assert_eq!(complex.cells[0].constraints, vec![1]);
    }

    #[test]
    fn virtual_only_coplanars_stay_white() {
        let mesh = single_tet();
        let mut constraints = ConstraintSet::new(vec![[1, 2, 3]], vec![ConstraintGroup::A]);
        let virt = constraints.push_virtual([0, 1, 2]);
        let mut maps = TetMaps::empty(1);
        maps.face_coplanar[0][3] = vec![virt];
        let complex = Complex::from_tet_mesh(&mesh, constraints, &maps);
        assert!(complex.faces.iter().all(|f| f.colour == FaceColour::White));
        assert!(complex.faces.iter().all(|f| f.coplanar.is_empty()));
    }
}
