// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scenario tests for the cell splitter and the downstream passes,
//! driven through hand-built tetrahedralizations.

use approx::assert_relative_eq;
use nalgebra::Point3;
use polycut_complex::{
    BoolOp, Complex, ConstraintGroup, ConstraintSet, FaceColour, TetMaps, TetMesh, GHOST_CELL,
};

fn p(x: f64, y: f64, z: f64) -> Point3<f64> {
    Point3::new(x, y, z)
}

/// A tetrahedron with legs of length 4 plus three spare points spanning
/// the plane x = 1.
fn tet_and_cutting_plane() -> (TetMesh, ConstraintSet) {
    let mesh = TetMesh {
        points: vec![
            p(0.0, 0.0, 0.0),
            p(4.0, 0.0, 0.0),
            p(0.0, 4.0, 0.0),
            p(0.0, 0.0, 4.0),
            p(1.0, -10.0, -10.0),
            p(1.0, 20.0, -10.0),
            p(1.0, -10.0, 20.0),
        ],
        tet_node: vec![0, 1, 2, 3],
        tet_neigh: vec![GHOST_CELL; 4],
    };
    let constraints = ConstraintSet::new(vec![[4, 5, 6]], vec![ConstraintGroup::A]);
    (mesh, constraints)
}

/// Two tetrahedra over the base {0, 1, 2} with apexes above and below,
/// plus the same x = 1 cutting plane.
fn bipyramid_and_cutting_plane() -> (TetMesh, ConstraintSet) {
    let mesh = TetMesh {
        points: vec![
            p(0.0, 0.0, 0.0),
            p(4.0, 0.0, 0.0),
            p(0.0, 4.0, 0.0),
            p(0.0, 0.0, 2.0),
            p(0.0, 0.0, -2.0),
            p(1.0, -10.0, -10.0),
            p(1.0, 20.0, -10.0),
            p(1.0, -10.0, 20.0),
        ],
        tet_node: vec![
            0, 1, 2, 3, //
            0, 2, 1, 4,
        ],
        tet_neigh: vec![
            GHOST_CELL, GHOST_CELL, GHOST_CELL, 1, //
            GHOST_CELL, GHOST_CELL, GHOST_CELL, 0,
        ],
    };
    let constraints = ConstraintSet::new(vec![[5, 6, 7]], vec![ConstraintGroup::A]);
    (mesh, constraints)
}

#[test]
fn splitting_one_tet_by_one_plane() {
    let (mesh, constraints) = tet_and_cutting_plane();
    let mut maps = TetMaps::empty(1);
    maps.pending[0] = vec![0];
    let mut complex = Complex::from_tet_mesh(&mesh, constraints, &maps);
    let volume_before = complex.total_volume();

    complex.subdivide().unwrap();

    // One corner is cut off: three edges split, three faces split, one
    // common face inserted.
    assert_eq!(complex.cells.len(), 2);
    assert_eq!(complex.faces.len(), 8);
    assert_eq!(complex.edges.len(), 12);
    assert_eq!(complex.vertices.len(), 10);
    complex.validate().unwrap();

    assert_relative_eq!(complex.total_volume(), volume_before, epsilon = 1e-9);
    assert_relative_eq!(volume_before, 64.0 / 6.0, epsilon = 1e-9);
    // The cut corner is a tetrahedron with legs of length 3.
    let small = (0..2)
        .map(|c| complex.cell_volume(c))
        .fold(f64::INFINITY, f64::min);
    assert_relative_eq!(small, 27.0 / 6.0, epsilon = 1e-9);

    // The common face carries the constraint until the colour pass.
    let grey: Vec<usize> = (0..complex.faces.len())
        .filter(|&f| complex.faces[f].colour == FaceColour::Grey)
        .collect();
    assert_eq!(grey.len(), 1);
    assert_eq!(complex.faces[grey[0]].plane, [4, 5, 6]);
    assert_eq!(complex.faces[grey[0]].coplanar.as_slice(), &[0]);
    assert_eq!(complex.faces[grey[0]].edges.len(), 3);

    // No pending constraints survive anywhere.
    assert!(complex.cells.iter().all(|c| c.constraints.is_empty()));

    complex.resolve_face_colours(false);
    assert_eq!(complex.faces[grey[0]].colour, FaceColour::BlackA);
}

#[test]
fn splitting_propagates_across_a_shared_face() {
    let (mesh, constraints) = bipyramid_and_cutting_plane();
    let mut maps = TetMaps::empty(2);
    maps.pending[0] = vec![0];
    maps.pending[1] = vec![0];
    let mut complex = Complex::from_tet_mesh(&mesh, constraints, &maps);
    let volume_before = complex.total_volume();

    complex.subdivide().unwrap();

    // Both pyramids are cut; the shared face and its split halves stay
    // consistent between the four cells.
    assert_eq!(complex.cells.len(), 4);
    // Four line/plane intersection vertices: on edges (0,1), (1,2),
    // (1,3) and (1,4).
    assert_eq!(complex.vertices.len(), 12);
    complex.validate().unwrap();
    assert_relative_eq!(complex.total_volume(), volume_before, epsilon = 1e-9);
    assert_relative_eq!(volume_before, 32.0 / 3.0, epsilon = 1e-9);

    // Two common faces, one per original cell.
    let grey = complex
        .faces
        .iter()
        .filter(|f| f.colour == FaceColour::Grey)
        .count();
    assert_eq!(grey, 2);
    assert!(complex.cells.iter().all(|c| c.constraints.is_empty()));

    // The cut plane is an open membrane, so nothing encloses a volume:
    // after colouring and labelling everything is external and the
    // repair skin is empty.
    complex.resolve_face_colours(false);
    complex.classify_cells();
    let skin = complex.extract_skin(BoolOp::Repair);
    assert!(skin.is_empty());
}

#[test]
fn grazing_plane_leaves_the_cell_whole() {
    // The constraint is the base face of the tetrahedron itself.
    let mesh = TetMesh {
        points: vec![
            p(0.0, 0.0, 0.0),
            p(4.0, 0.0, 0.0),
            p(0.0, 4.0, 0.0),
            p(1.0, 1.0, 3.0),
        ],
        tet_node: vec![0, 1, 2, 3],
        tet_neigh: vec![GHOST_CELL; 4],
    };
    let constraints = ConstraintSet::new(vec![[0, 1, 2]], vec![ConstraintGroup::A]);
    let mut maps = TetMaps::empty(1);
    maps.pending[0] = vec![0];
    let mut complex = Complex::from_tet_mesh(&mesh, constraints, &maps);

    complex.subdivide().unwrap();

    assert_eq!(complex.cells.len(), 1);
    assert_eq!(complex.faces.len(), 4);
    assert_eq!(complex.edges.len(), 6);
    assert!(complex.cells[0].constraints.is_empty());
    complex.validate().unwrap();
}

#[test]
fn grazing_plane_discards_coplanar_harvest() {
    // Two constraints share the base plane; the splitter pops the last
    // one, harvests the other as coplanar, then hits the no-split early
    // out. Both are gone without being attached anywhere.
    let mesh = TetMesh {
        points: vec![
            p(0.0, 0.0, 0.0),
            p(4.0, 0.0, 0.0),
            p(0.0, 4.0, 0.0),
            p(1.0, 1.0, 3.0),
            p(2.0, -2.0, 0.0),
        ],
        tet_node: vec![0, 1, 2, 3],
        tet_neigh: vec![GHOST_CELL; 4],
    };
    let constraints = ConstraintSet::new(
        vec![[0, 1, 4], [0, 1, 2]],
        vec![ConstraintGroup::A, ConstraintGroup::A],
    );
    let mut maps = TetMaps::empty(1);
    maps.pending[0] = vec![0, 1];
    let mut complex = Complex::from_tet_mesh(&mesh, constraints, &maps);

    complex.subdivide().unwrap();

    assert_eq!(complex.cells.len(), 1);
    assert!(complex.cells[0].constraints.is_empty());
    // The harvest never reached a face either.
    assert!(complex.faces.iter().all(|f| f.coplanar.is_empty()));
    complex.validate().unwrap();
}

#[test]
fn identical_coplanar_constraints_from_both_groups() {
    // Two identical triangles, one per input group, on the shared face
    // of a bipyramid: the face resolves to BLACK_AB, yet an open
    // membrane never encloses a volume, so every cell stays external
    // under all operators.
    let mesh = TetMesh {
        points: vec![
            p(0.0, 0.0, 0.0),
            p(4.0, 0.0, 0.0),
            p(0.0, 4.0, 0.0),
            p(1.0, 1.0, 2.0),
            p(1.0, 1.0, -2.0),
        ],
        tet_node: vec![
            0, 1, 2, 3, //
            0, 2, 1, 4,
        ],
        tet_neigh: vec![
            GHOST_CELL, GHOST_CELL, GHOST_CELL, 1, //
            GHOST_CELL, GHOST_CELL, GHOST_CELL, 0,
        ],
    };
    let constraints = ConstraintSet::new(
        vec![[0, 1, 2], [0, 1, 2]],
        vec![ConstraintGroup::A, ConstraintGroup::B],
    );
    let mut maps = TetMaps::empty(2);
    maps.face_coplanar[0][3] = vec![0, 1];
    let mut complex = Complex::from_tet_mesh(&mesh, constraints, &maps);

    complex.subdivide().unwrap();
    complex.resolve_face_colours(true);

    let shared: Vec<&polycut_complex::Face> = complex
        .faces
        .iter()
        .filter(|f| f.conn_cells[1] != GHOST_CELL)
        .collect();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].colour, FaceColour::BlackAb);

    complex.classify_cells();
    for op in [BoolOp::Union, BoolOp::Intersection, BoolOp::Difference] {
        let mut scratch = complex.clone();
        let skin = scratch.extract_skin(op);
        assert!(skin.is_empty(), "{op:?} over an open membrane must be empty");
    }
}

#[test]
fn repairing_a_closed_tetrahedron_surface() {
    // All four faces of the tetrahedron are constraints: the cell is
    // inside the surface and the repair skin is the surface itself.
    let mesh = TetMesh {
        points: vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.0, 0.0, 1.0),
        ],
        tet_node: vec![0, 1, 2, 3],
        tet_neigh: vec![GHOST_CELL; 4],
    };
    let constraints = ConstraintSet::new(
        vec![[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]],
        vec![ConstraintGroup::A; 4],
    );
    let mut maps = TetMaps::empty(1);
    maps.face_coplanar[0][3] = vec![0]; // face {0, 1, 2}
    maps.face_coplanar[0][2] = vec![1]; // face {3, 0, 1}
    maps.face_coplanar[0][1] = vec![2]; // face {2, 3, 0}
    maps.face_coplanar[0][0] = vec![3]; // face {1, 2, 3}
    let mut complex = Complex::from_tet_mesh(&mesh, constraints, &maps);

    complex.subdivide().unwrap();
    complex.resolve_face_colours(false);
    assert!(complex
        .faces
        .iter()
        .all(|f| f.colour == FaceColour::BlackA));

    complex.classify_cells();
    assert_eq!(complex.cells[0].place, polycut_complex::CellPlace::InternalA);

    let skin = complex.extract_skin(BoolOp::Repair);
    assert_eq!(skin.polygon_count(), 4);
    assert_eq!(skin.vertex_count(), 4);
    assert!(skin.polygons.iter().all(|poly| poly.len() == 3));

    let mut off = Vec::new();
    skin.write_off(&mut off).unwrap();
    let text = String::from_utf8(off).unwrap();
    assert!(text.starts_with("OFF\n4 4 0\n"));
}
