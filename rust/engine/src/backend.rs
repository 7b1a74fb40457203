// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The collaborator seam: everything the subdivision engine does not do
//! itself.
//!
//! A [`MeshingBackend`] supplies the Delaunay tetrahedralization of the
//! deduplicated point set, the virtual-constraint closure that makes the
//! constraint surface a manifold envelope, and the incidence maps telling
//! each tetrahedron which constraints pierce it and which lie on its
//! faces.

use nalgebra::Point3;
use polycut_complex::{ConstraintSet, TetMaps, TetMesh};

use crate::error::Result;

/// External meshing collaborator.
pub trait MeshingBackend {
    /// Delaunay tetrahedralization of `points`. The returned mesh must
    /// reference the points by their position in `points` (no internal
    /// permutation may leak out).
    fn tetrahedralize(&self, points: &[Point3<f64>]) -> Result<TetMesh>;

    /// Appends the virtual constraints that close the constraint surface
    /// into a manifold envelope. Returns how many were added.
    fn close_envelope(&self, mesh: &TetMesh, constraints: &mut ConstraintSet) -> Result<u32>;

    /// For every tetrahedron: the constraints improperly intersecting its
    /// interior and, per face, the coplanar constraints touching it.
    fn map_intersections(&self, mesh: &TetMesh, constraints: &ConstraintSet) -> Result<TetMaps>;
}
