// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face colouring: deciding whether a grey face lies inside one of its
//! coplanar input triangles.
//!
//! The fast path tests the approximate face barycenter; when the
//! barycenter cannot be certified strictly inside the face, the pass
//! falls back to scanning face vertices, and finally to a boundary mask
//! that looks for three unaligned contact points between the constraint
//! triangle and the face boundary.

use nalgebra::Point3;
use polycut_predicates::{
    inner_segments_cross, localized_point_in_triangle, max_component_in_triangle_normal, orient2d,
    point_in_inner_segment, point_in_triangle, GenericPoint,
};

use crate::arena::{common_endpoint, Complex, FaceColour};
use crate::constraint::ConstraintGroup;

#[inline]
fn group_already_black(group: ConstraintGroup, black_a: bool, black_b: bool) -> bool {
    (group == ConstraintGroup::A && black_a) || (group == ConstraintGroup::B && black_b)
}

impl Complex {
    /// Dominant normal axis of a face's plane fingerprint.
    fn face_dominant_axis(&self, face: usize) -> usize {
        let [p0, p1, p2] = self.faces[face].plane;
        max_component_in_triangle_normal(
            &self.vertex_coords(p0),
            &self.vertex_coords(p1),
            &self.vertex_coords(p2),
        )
    }

    /// Average of the approximate vertex coordinates.
    fn approx_face_barycenter(&self, face: usize) -> Point3<f64> {
        let vs = self.face_vertices(face);
        let mut sum = Point3::new(0.0, 0.0, 0.0);
        for &v in &vs {
            let c = self.vertex_coords(v);
            sum.x += c.x;
            sum.y += c.y;
            sum.z += c.z;
        }
        let n = vs.len() as f64;
        Point3::new(sum.x / n, sum.y / n, sum.z / n)
    }

    /// True when `center` is strictly inside the face: every consecutive
    /// boundary pair sees it with the same non-zero orientation.
    fn barycenter_strictly_inside(&self, face: usize, center: &GenericPoint, axis: usize) -> bool {
        let vs = self.face_vertices(face);
        let mut oro: i8 = 0;
        for i in 0..vs.len() {
            let p = &self.vertices[vs[i] as usize].point;
            let q = &self.vertices[vs[(i + 1) % vs.len()] as usize].point;
            let ao = orient2d(center, p, q, axis);
            if ao == 0 {
                return false;
            }
            if oro == 0 {
                oro = ao;
            } else if ao != oro {
                return false;
            }
        }
        true
    }

    /// Boundary mask test, used when every face vertex lies on the
    /// boundary of some coplanar constraint: the overlap is two-dimensional
    /// iff at least three unaligned points of the constraint triangle lie
    /// on the face boundary (coincident vertices, vertices in edge
    /// interiors, or proper edge crossings).
    fn coplanar_constraint_inner_intersects_face(
        &self,
        face: usize,
        tri: [u32; 3],
        axis: usize,
    ) -> bool {
        let fedges = &self.faces[face].edges;
        let pt = |v: u32| &self.vertices[v as usize].point;
        let vid0 = common_endpoint(
            self.edges[fedges[fedges.len() - 1]].verts,
            self.edges[fedges[0]].verts,
        );

        let mut mask = 0u8;

        // Constraint vertices coincident with face boundary vertices.
        for i in 0..3 {
            let mut vid = vid0;
            for &e in fedges {
                let ev = self.edges[e].verts;
                vid = if vid == ev[0] { ev[1] } else { ev[0] };
                if tri[i] == vid {
                    mask |= 1 << i;
                    break;
                }
            }
        }
        if mask == 7 {
            return true;
        }

        // Constraint vertices in the interior of face edges.
        for i in 0..3 {
            if mask & (1 << i) != 0 {
                continue;
            }
            for &e in fedges {
                let ev = self.edges[e].verts;
                if point_in_inner_segment(pt(tri[i]), pt(ev[0]), pt(ev[1]), axis) {
                    mask |= 1 << i;
                    break;
                }
            }
        }
        if mask == 7 {
            return true;
        }

        // Face vertices in the interior of constraint edges: both
        // endpoints of that constraint edge count as contact.
        for i in 0..3 {
            let t0 = (i + 1) % 3;
            let t1 = (i + 2) % 3;
            if mask & (1 << t0) != 0 && mask & (1 << t1) != 0 {
                continue;
            }
            let mut vid = vid0;
            for &e in fedges {
                let ev = self.edges[e].verts;
                vid = if vid == ev[0] { ev[1] } else { ev[0] };
                if point_in_inner_segment(pt(vid), pt(tri[t0]), pt(tri[t1]), axis) {
                    mask |= 1 << t0;
                    mask |= 1 << t1;
                    break;
                }
            }
        }
        if mask == 7 {
            return true;
        }

        // Face edges properly crossing constraint edges.
        for i in 0..3 {
            let t0 = (i + 1) % 3;
            let t1 = (i + 2) % 3;
            if mask & (1 << t0) != 0 && mask & (1 << t1) != 0 {
                continue;
            }
            for &e in fedges {
                let ev = self.edges[e].verts;
                if inner_segments_cross(pt(ev[0]), pt(ev[1]), pt(tri[t0]), pt(tri[t1]), axis) {
                    return true;
                }
            }
        }

        false
    }

    /// Resolves one grey face to white or black.
    fn resolve_grey(&self, face_i: usize, two_input: bool) -> FaceColour {
        let face = &self.faces[face_i];
        let axis = self.face_dominant_axis(face_i);
        let center = GenericPoint::Explicit(self.approx_face_barycenter(face_i));
        let pt = |v: u32| &self.vertices[v as usize].point;

        let mut black_a = false;
        let mut black_b = false;

        if self.barycenter_strictly_inside(face_i, &center, axis) {
            // The barycenter is inside the face; the face is black iff the
            // barycenter is inside a coplanar constraint as well.
            for &c in &face.coplanar {
                let group = self.constraints.group(c);
                if two_input && group_already_black(group, black_a, black_b) {
                    continue;
                }
                let [c0, c1, c2] = self.constraints.verts(c);
                if point_in_triangle(&center, pt(c0), pt(c1), pt(c2), axis) {
                    if !two_input {
                        return FaceColour::BlackA;
                    }
                    match group {
                        ConstraintGroup::A => black_a = true,
                        ConstraintGroup::B => black_b = true,
                    }
                    if black_a && black_b {
                        return FaceColour::BlackAb;
                    }
                }
            }
            if black_a {
                return FaceColour::BlackA;
            }
            if black_b {
                return FaceColour::BlackB;
            }
            return FaceColour::White;
        }

        // The barycenter could not be certified inside: scan the face
        // vertices instead.
        let vs = self.face_vertices(face_i);
        for &vid in &vs {
            let mut out_from_all = 0;
            for &c in &face.coplanar {
                let group = self.constraints.group(c);
                if two_input && group_already_black(group, black_a, black_b) {
                    continue;
                }
                let [c0, c1, c2] = self.constraints.verts(c);
                if vid == c0 || vid == c1 || vid == c2 {
                    break; // on the constraint boundary, undecidable here
                }
                let lpt = localized_point_in_triangle(pt(vid), pt(c0), pt(c1), pt(c2), axis);
                if lpt == 2 {
                    if !two_input {
                        return FaceColour::BlackA;
                    }
                    match group {
                        ConstraintGroup::A => black_a = true,
                        ConstraintGroup::B => black_b = true,
                    }
                    if black_a && black_b {
                        return FaceColour::BlackAb;
                    }
                }
                if lpt != 0 {
                    break;
                }
                out_from_all += 1;
            }
            if out_from_all == face.coplanar.len() {
                return FaceColour::White;
            }
        }

        // Every face vertex sits on some constraint boundary: decide by
        // the contact mask.
        for &c in &face.coplanar {
            let group = self.constraints.group(c);
            if two_input && group_already_black(group, black_a, black_b) {
                continue;
            }
            let tri = self.constraints.verts(c);
            if self.coplanar_constraint_inner_intersects_face(face_i, tri, axis) {
                if !two_input {
                    return FaceColour::BlackA;
                }
                match group {
                    ConstraintGroup::A => black_a = true,
                    ConstraintGroup::B => black_b = true,
                }
                if black_a && black_b {
                    return FaceColour::BlackAb;
                }
            }
        }

        if black_a {
            FaceColour::BlackA
        } else if black_b {
            FaceColour::BlackB
        } else {
            FaceColour::White
        }
    }

    /// Resolves every grey face. In single-input mode all black faces are
    /// `BlackA`.
    pub fn resolve_face_colours(&mut self, two_input: bool) {
        let mut resolved = 0usize;
        let mut black = 0usize;
        for f in 0..self.faces.len() {
            if self.faces[f].colour != FaceColour::Grey {
                continue;
            }
            let colour = self.resolve_grey(f, two_input);
            self.faces[f].colour = colour;
            resolved += 1;
            if colour.is_black() {
                black += 1;
            }
        }
        tracing::debug!(resolved, black, "grey faces resolved");
    }
}
