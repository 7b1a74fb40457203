// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structural invariant checks.
//!
//! [`Complex::validate`] verifies, for the whole complex, the invariants
//! that must hold after every split: face cycles chain, adjacency is
//! symmetric, every cell satisfies Euler's formula and is convex, and
//! every face vertex lies exactly on the face's supporting plane.
//! Diagnostics name the offending entity.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::arena::{Complex, GHOST_CELL};
use crate::error::{Error, Result};
use polycut_predicates::orient3d;

impl Complex {
    /// Checks the structural invariants of the complex, returning the
    /// first violation found.
    pub fn validate(&self) -> Result<()> {
        self.validate_cycles()?;
        self.validate_adjacency()?;
        for cell in 0..self.cells.len() {
            self.validate_cell(cell)?;
        }
        for face in 0..self.faces.len() {
            self.validate_face_plane(face)?;
        }
        Ok(())
    }

    /// Invariant 1: every face boundary is a single cycle where
    /// consecutive edges share exactly one vertex and each vertex occurs
    /// exactly twice.
    fn validate_cycles(&self) -> Result<()> {
        for (fi, face) in self.faces.iter().enumerate() {
            if face.edges.len() < 3 {
                return Err(Error::Invariant(format!(
                    "face {fi} has {} edges",
                    face.edges.len()
                )));
            }
            let mut counts: FxHashMap<u32, u32> = Default::default();
            for i in 0..face.edges.len() {
                let e = self.edges[face.edges[i]].verts;
                let n = self.edges[face.edges[(i + 1) % face.edges.len()]].verts;
                let shared = [e[0], e[1]]
                    .iter()
                    .filter(|v| **v == n[0] || **v == n[1])
                    .count();
                if shared != 1 {
                    return Err(Error::Invariant(format!(
                        "face {fi}: consecutive edges share {shared} vertices"
                    )));
                }
                *counts.entry(e[0]).or_default() += 1;
                *counts.entry(e[1]).or_default() += 1;
            }
            if counts.values().any(|&c| c != 2) {
                return Err(Error::Invariant(format!(
                    "face {fi}: a boundary vertex is not incident to exactly two edges"
                )));
            }
        }
        Ok(())
    }

    /// Invariant 3: faces and cells reference each other symmetrically.
    fn validate_adjacency(&self) -> Result<()> {
        for (fi, face) in self.faces.iter().enumerate() {
            for &c in &face.conn_cells {
                if c != GHOST_CELL && !self.cells[c].faces.contains(&fi) {
                    return Err(Error::Invariant(format!(
                        "face {fi} lists cell {c}, which does not list it back"
                    )));
                }
            }
        }
        for (ci, cell) in self.cells.iter().enumerate() {
            for &f in &cell.faces {
                if !self.faces[f].conn_cells.contains(&ci) {
                    return Err(Error::Invariant(format!(
                        "cell {ci} lists face {f}, which does not list it back"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Invariants 2 and 4: Euler's formula and convexity of one cell.
    fn validate_cell(&self, cell: usize) -> Result<()> {
        let mut edge_set: FxHashSet<usize> = Default::default();
        let mut vert_set: FxHashSet<u32> = Default::default();
        for &f in &self.cells[cell].faces {
            for &e in &self.faces[f].edges {
                edge_set.insert(e);
                vert_set.insert(self.edges[e].verts[0]);
                vert_set.insert(self.edges[e].verts[1]);
            }
        }
        let v = vert_set.len() as i64;
        let e = edge_set.len() as i64;
        let f = self.cells[cell].faces.len() as i64;
        if v - e + f != 2 {
            return Err(Error::Invariant(format!(
                "cell {cell}: V - E + F = {v} - {e} + {f} != 2"
            )));
        }

        // Convexity: all cell vertices on one closed side of every
        // supporting plane.
        for &fi in &self.cells[cell].faces {
            let [p0, p1, p2] = self.faces[fi].plane;
            let a = self.vertex_coords(p0);
            let b = self.vertex_coords(p1);
            let c = self.vertex_coords(p2);
            let mut pos = false;
            let mut neg = false;
            for &vert in &vert_set {
                match orient3d(&self.vertices[vert as usize].point, &a, &b, &c) {
                    1 => pos = true,
                    -1 => neg = true,
                    _ => {}
                }
            }
            if pos && neg {
                return Err(Error::Invariant(format!(
                    "cell {cell} has vertices on both sides of face {fi}"
                )));
            }
        }
        Ok(())
    }

    /// Invariant 5: every vertex of a face lies on the face's plane,
    /// symbolically or by exact evaluation.
    fn validate_face_plane(&self, face: usize) -> Result<()> {
        let plane = self.faces[face].plane;
        let a = self.vertex_coords(plane[0]);
        let b = self.vertex_coords(plane[1]);
        let c = self.vertex_coords(plane[2]);
        for v in self.face_vertices(face) {
            if !self.built_from_plane(v, plane)
                && orient3d(&self.vertices[v as usize].point, &a, &b, &c) != 0
            {
                return Err(Error::Invariant(format!(
                    "vertex {v} of face {face} is off the face plane"
                )));
            }
        }
        Ok(())
    }

    /// Approximate volume of a convex cell: the sum of the pyramids from
    /// the cell centroid over each face, fanned from the first boundary
    /// vertex.
    pub fn cell_volume(&self, cell: usize) -> f64 {
        let mut vert_set: FxHashSet<u32> = Default::default();
        for &f in &self.cells[cell].faces {
            for &e in &self.faces[f].edges {
                vert_set.insert(self.edges[e].verts[0]);
                vert_set.insert(self.edges[e].verts[1]);
            }
        }
        let mut centroid = nalgebra::Vector3::zeros();
        for &v in &vert_set {
            centroid += self.vertex_coords(v).coords;
        }
        centroid /= vert_set.len() as f64;

        let mut volume = 0.0;
        for &f in &self.cells[cell].faces {
            let cycle = self.face_vertices(f);
            let v0 = self.vertex_coords(cycle[0]).coords - centroid;
            let mut pyramid = 0.0;
            for w in cycle.windows(2).skip(1) {
                let v1 = self.vertex_coords(w[0]).coords - centroid;
                let v2 = self.vertex_coords(w[1]).coords - centroid;
                pyramid += v0.cross(&v1).dot(&v2) / 6.0;
            }
            // The cycle winding of a face is arbitrary; for a convex cell
            // every pyramid contributes positively.
            volume += pyramid.abs();
        }
        volume
    }

    /// Total volume of all cells.
    pub fn total_volume(&self) -> f64 {
        (0..self.cells.len()).map(|c| self.cell_volume(c)).sum()
    }
}
