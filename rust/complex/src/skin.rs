// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Skin extraction: the boundary of the selected boolean result as an
//! indexed polygon mesh, and its OFF emitter.

use std::io::{self, Write};

use nalgebra::Point3;

use crate::arena::{CellPlace, Complex, FaceColour, NO_VERTEX};

/// The boolean composition applied to the labelled complex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    Union,
    Intersection,
    Difference,
    /// Single-input mode: resolve self-intersections and repair.
    Repair,
}

impl BoolOp {
    /// Parses the opcode characters `'U'`, `'I'`, `'D'`, `'0'`.
    pub fn from_opcode(op: char) -> Option<BoolOp> {
        match op {
            'U' => Some(BoolOp::Union),
            'I' => Some(BoolOp::Intersection),
            'D' => Some(BoolOp::Difference),
            '0' => Some(BoolOp::Repair),
            _ => None,
        }
    }

    #[inline]
    pub fn is_two_input(&self) -> bool {
        !matches!(self, BoolOp::Repair)
    }
}

/// An indexed polygon mesh: the emitted boundary skin.
#[derive(Debug, Clone, Default)]
pub struct SkinMesh {
    pub vertices: Vec<Point3<f64>>,
    pub polygons: Vec<Vec<u32>>,
}

impl SkinMesh {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Writes the mesh in the OFF subset:
    ///
    /// ```text
    /// OFF
    /// <nv> <nf> 0
    /// <x y z>              × nv
    /// <k> <i0> ... <ik-1>  × nf
    /// ```
    pub fn write_off<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "OFF")?;
        writeln!(w, "{} {} 0", self.vertices.len(), self.polygons.len())?;
        for v in &self.vertices {
            writeln!(w, "{} {} {}", v.x, v.y, v.z)?;
        }
        for poly in &self.polygons {
            write!(w, "{}", poly.len())?;
            for i in poly {
                write!(w, " {}", i)?;
            }
            writeln!(w)?;
        }
        Ok(())
    }
}

impl Complex {
    /// Collects the border faces of the internal region into a mesh,
    /// compacting vertices in first-use order. Polygons are wound so the
    /// outward normal is counter-clockwise.
    fn collect_faces<F: Fn(usize) -> bool>(&self, selected: F, flip_internal: bool) -> SkinMesh {
        let mut vmap = vec![NO_VERTEX; self.vertices.len()];
        let mut mesh = SkinMesh::default();

        for f in 0..self.faces.len() {
            if !selected(f) {
                continue;
            }
            let cycle = self.face_vertices(f);
            let internal_first =
                self.cells[self.faces[f].conn_cells[0]].place == CellPlace::InternalA;

            let mut poly = Vec::with_capacity(cycle.len());
            let mut push = |mesh: &mut SkinMesh, v: u32| {
                if vmap[v as usize] == NO_VERTEX {
                    vmap[v as usize] = mesh.vertices.len() as u32;
                    mesh.vertices.push(self.vertex_coords(v));
                }
                poly.push(vmap[v as usize]);
            };
            if flip_internal && internal_first {
                for &v in cycle.iter().rev() {
                    push(&mut mesh, v);
                }
            } else {
                for &v in &cycle {
                    push(&mut mesh, v);
                }
            }
            mesh.polygons.push(poly);
        }
        mesh
    }

    /// Reclassifies placements for the boolean operator and extracts the
    /// boundary of the internal region.
    ///
    /// Cell placements are collapsed in place (internal under `op` becomes
    /// `InternalA`, everything else `External`), like the face colours
    /// before them; extracting a second operator needs a re-labelled
    /// complex.
    pub fn extract_skin(&mut self, op: BoolOp) -> SkinMesh {
        for cell in &mut self.cells {
            let internal = match op {
                BoolOp::Union => matches!(
                    cell.place,
                    CellPlace::InternalA | CellPlace::InternalB | CellPlace::InternalAb
                ),
                BoolOp::Intersection => cell.place == CellPlace::InternalAb,
                BoolOp::Difference => cell.place == CellPlace::InternalA,
                BoolOp::Repair => cell.place == CellPlace::InternalA,
            };
            cell.place = if internal {
                CellPlace::InternalA
            } else {
                CellPlace::External
            };
        }

        // A border face has exactly one internal incident cell.
        let mut mark = vec![0u8; self.faces.len()];
        for cell in &self.cells {
            if cell.place == CellPlace::InternalA {
                for &f in &cell.faces {
                    mark[f] += 1;
                }
            }
        }

        let mesh = self.collect_faces(|f| mark[f] == 1, true);
        tracing::debug!(
            polygons = mesh.polygon_count(),
            vertices = mesh.vertex_count(),
            "skin extracted"
        );
        mesh
    }

    /// Every non-white face: the carried constraint surface. Useful as a
    /// debug artefact alongside the boolean skin.
    pub fn extract_constraint_surface(&self) -> SkinMesh {
        self.collect_faces(|f| self.faces[f].colour != FaceColour::White, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_parsing() {
        assert_eq!(BoolOp::from_opcode('U'), Some(BoolOp::Union));
        assert_eq!(BoolOp::from_opcode('I'), Some(BoolOp::Intersection));
        assert_eq!(BoolOp::from_opcode('D'), Some(BoolOp::Difference));
        assert_eq!(BoolOp::from_opcode('0'), Some(BoolOp::Repair));
        assert_eq!(BoolOp::from_opcode('X'), None);
        assert!(BoolOp::Union.is_two_input());
        assert!(!BoolOp::Repair.is_two_input());
    }

    #[test]
    fn off_format() {
        let mesh = SkinMesh {
            vertices: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(1.5, 1.5, 0.5),
            ],
            polygons: vec![vec![0, 1, 2], vec![0, 1, 3, 2]],
        };
        let mut out = Vec::new();
        mesh.write_off(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "OFF");
        assert_eq!(lines[1], "4 2 0");
        assert_eq!(lines[2], "0 0 0");
        assert_eq!(lines[5], "1.5 1.5 0.5");
        assert_eq!(lines[6], "3 0 1 2");
        assert_eq!(lines[7], "4 0 1 3 2");
    }
}
