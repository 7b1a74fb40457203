// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The cell splitter.
//!
//! [`Complex::subdivide`] cuts every cell that still owns pending
//! constraints by one constraint plane at a time: classify the cell
//! vertices against the plane, split the crossed edges (inserting one LPI
//! or TPI vertex each), split the crossed faces, move the faces with
//! strictly-over vertices into a freshly created up-cell, close both
//! sub-cells with a common face lying in the constraint plane, and
//! redistribute the remaining constraints.

use polycut_predicates::{max_component_in_triangle_normal, orient2d, GenericPoint, LpiPoint,
    TpiPoint};

use crate::arena::{common_endpoint, consecutive_edges, Cell, Complex, Edge, EdgeFrame, Face,
    FaceColour, Provenance, GHOST_CELL, NO_INDEX, NO_VERTEX};
use crate::error::{Error, Result};

#[inline]
fn opposite_signs(a: i8, b: i8) -> bool {
    (a < 0 && b > 0) || (a > 0 && b < 0)
}

/// The two elements of `x` that also occur in `y`, if at least two do.
fn shared_pair(x: [u32; 3], y: [u32; 3]) -> Option<[u32; 2]> {
    let mut out = [NO_VERTEX; 2];
    let mut n = 0;
    for v in x {
        if y.contains(&v) {
            if n < 2 {
                out[n] = v;
            }
            n += 1;
        }
    }
    if n >= 2 {
        Some(out)
    } else {
        None
    }
}

impl Complex {
    // --- Edge–face ring ----------------------------------------------------

    /// The face of cell `c` other than `f0` that also contains edge `e0`.
    fn opposite_edge_face(&self, e0: usize, f0: usize, c: usize) -> usize {
        for &f in &self.cells[c].faces {
            if f != f0 && self.faces[f].edges.contains(&e0) {
                return f;
            }
        }
        debug_assert!(false, "edge has no second face in its cell");
        NO_INDEX
    }

    /// All faces incident to an edge, recovered by walking cell-by-cell
    /// from the edge's seed face; a hull hit restarts from the seed in the
    /// other direction.
    pub(crate) fn ef_relation(&self, e_id: usize) -> Vec<usize> {
        let seed = self.edges[e_id].conn_face_0;
        let mut ring = vec![seed];

        let mut f = seed;
        let mut c = self.faces[seed].conn_cells[0];
        loop {
            f = self.opposite_edge_face(e_id, f, c);
            if f == seed {
                return ring;
            }
            ring.push(f);
            c = self.faces[f].opposite_cell(c);
            if c == GHOST_CELL {
                break;
            }
        }

        f = seed;
        c = self.faces[seed].conn_cells[1];
        if c == GHOST_CELL {
            return ring;
        }
        loop {
            f = self.opposite_edge_face(e_id, f, c);
            ring.push(f);
            c = self.faces[f].opposite_cell(c);
            if c == GHOST_CELL {
                return ring;
            }
        }
    }

    // --- Edge splitting ----------------------------------------------------

    /// Inserts `new_edge` into the cyclic edge list of `face` adjacent to
    /// a consecutive edge, keeping the chain invariant.
    fn add_edge_to_face_cycle(&mut self, face: usize, new_edge: usize) {
        let nv = self.edges[new_edge].verts;
        let n = self.faces[face].edges.len();
        for e in 0..n {
            let edge_i = self.faces[face].edges[e];
            if !consecutive_edges(nv, self.edges[edge_i].verts) {
                continue;
            }
            if e == 0 {
                let last = self.faces[face].edges[n - 1];
                if consecutive_edges(nv, self.edges[last].verts) {
                    self.faces[face].edges.push(new_edge);
                } else {
                    // The consecutive neighbour is edges[1]; rotate the
                    // head out of the way.
                    self.faces[face].edges.push(edge_i);
                    self.faces[face].edges[0] = new_edge;
                }
                return;
            }
            if e == n - 1 {
                let first = self.faces[face].edges[0];
                if consecutive_edges(nv, self.edges[first].verts) {
                    self.faces[face].edges.push(new_edge);
                } else {
                    self.faces[face].edges.push(edge_i);
                    self.faces[face].edges[e] = new_edge;
                }
                return;
            }
            let next = self.faces[face].edges[e + 1];
            if consecutive_edges(nv, self.edges[next].verts) {
                self.faces[face].edges.insert(e + 1, new_edge);
            } else {
                self.faces[face].edges.insert(e, new_edge);
            }
            return;
        }
        debug_assert!(false, "new edge is not consecutive to any edge of the face");
    }

    /// The vertex at which `edge` meets the plane of constraint `constr`.
    ///
    /// An edge on a mesh line yields an LPI; an edge carried by two planes
    /// yields a TPI, degraded to an LPI whenever two of the three planes
    /// share two vertices (their intersection is a mesh line again).
    fn intersection_vertex(&mut self, edge: usize, constr: u32) -> u32 {
        let k = self.constraints.verts(constr);
        let ex = |v: u32| self.vertex_coords(v);
        let (point, origin) = match self.edges[edge].frame.clone() {
            EdgeFrame::Line { a, b } => (
                GenericPoint::Lpi(LpiPoint {
                    p: ex(a),
                    q: ex(b),
                    r: ex(k[0]),
                    s: ex(k[1]),
                    t: ex(k[2]),
                }),
                Provenance::Lpi {
                    line: [a, b],
                    plane: k,
                },
            ),
            EdgeFrame::Planes { p, q } => {
                let lpi = |line: [u32; 2], plane: [u32; 3]| {
                    (
                        GenericPoint::Lpi(LpiPoint {
                            p: ex(line[0]),
                            q: ex(line[1]),
                            r: ex(plane[0]),
                            s: ex(plane[1]),
                            t: ex(plane[2]),
                        }),
                        Provenance::Lpi { line, plane },
                    )
                };
                if let Some(line) = shared_pair(k, p) {
                    lpi(line, q)
                } else if let Some(line) = shared_pair(k, q) {
                    lpi(line, p)
                } else if let Some(line) = shared_pair(q, p) {
                    lpi(line, k)
                } else {
                    let tri = |t: [u32; 3]| [ex(t[0]), ex(t[1]), ex(t[2])];
                    (
                        GenericPoint::Tpi(TpiPoint {
                            v: tri(p),
                            w: tri(q),
                            u: tri(k),
                        }),
                        Provenance::Tpi { planes: [p, q, k] },
                    )
                }
            }
        };
        self.push_vertex(point, origin)
    }

    /// Splits `edge` at its intersection with the plane of `constr` and
    /// threads the new half into every incident face's cycle.
    pub(crate) fn split_edge(&mut self, edge: usize, constr: u32) {
        let ring = self.ef_relation(edge);
        let new_vertex = self.intersection_vertex(edge, constr);
        let half = self.edges[edge].split(new_vertex);
        let new_edge = self.push_edge(half);
        for f in ring {
            self.add_edge_to_face_cycle(f, new_edge);
        }
    }

    // --- Face splitting ----------------------------------------------------

    /// Rotates the cycle of `face` so it starts where the under-arc
    /// leaves the splitting plane, then moves the over-arc tail into
    /// `new_face`.
    fn edges_partition(&mut self, face: usize, new_face: usize) -> Result<()> {
        let n = self.faces[face].edges.len();
        let mut pivot = None;
        for e in 0..n {
            let edge_i = self.faces[face].edges[e];
            let next_i = self.faces[face].edges[if e + 1 == n { 0 } else { e + 1 }];
            let ev = self.edges[edge_i].verts;
            let nv = self.edges[next_i].verts;
            // Endpoint shared with the next edge in cycle direction.
            let comm = usize::from(!(ev[0] == nv[0] || ev[0] == nv[1]));
            if self.vert_orient[ev[comm] as usize] < 0
                && self.vert_orient[ev[1 - comm] as usize] == 0
            {
                pivot = Some(e);
                break;
            }
        }
        let Some(pivot) = pivot else {
            return Err(Error::CyclePartitionPivot(face));
        };
        self.faces[face].edges.rotate_left(pivot);

        // The under-arc ends at the first edge that touches the plane again.
        let mut cut = None;
        for e in 1..n {
            let ev = self.edges[self.faces[face].edges[e]].verts;
            if self.vert_orient[ev[0] as usize] == 0 || self.vert_orient[ev[1] as usize] == 0 {
                cut = Some(e + 1);
                break;
            }
        }
        let Some(cut) = cut else {
            return Err(Error::CyclePartitionClose(face));
        };

        let tail = self.faces[face].edges.split_off(cut);
        for &e in &tail {
            self.edges[e].conn_face_0 = new_face;
        }
        self.faces[new_face].edges = tail;
        Ok(())
    }

    /// Connects the two halves of a split face with a new edge between the
    /// two on-plane vertices. The edge is carried by the face plane and
    /// the constraint plane.
    fn add_common_edge(&mut self, constr: u32, face: usize, new_face: usize, endpts: [u32; 2]) {
        let mut edge = Edge::on_planes(
            endpts[0],
            endpts[1],
            self.faces[face].plane,
            self.constraints.verts(constr),
        );
        edge.conn_face_0 = face;
        let edge_id = self.push_edge(edge);
        self.faces[face].edges.push(edge_id);
        self.faces[new_face].edges.push(edge_id);
    }

    /// Splits a face crossed by the plane of `constr`. The original face
    /// becomes the under half; the new face inherits plane, colour,
    /// coplanar constraints and both cell links.
    fn split_face(&mut self, face: usize, constr: u32, face_vrts: &[u32]) -> Result<()> {
        let twin = Face {
            edges: Vec::new(),
            conn_cells: self.faces[face].conn_cells,
            plane: self.faces[face].plane,
            colour: self.faces[face].colour,
            coplanar: self.faces[face].coplanar.clone(),
        };
        let new_face = self.push_face(twin);
        let [c0, c1] = self.faces[face].conn_cells;
        self.cells[c0].faces.push(new_face);
        if c1 != GHOST_CELL {
            self.cells[c1].faces.push(new_face);
        }

        let mut endpts = [NO_VERTEX; 2];
        let mut pos = 0;
        for &v in face_vrts {
            if self.vert_orient[v as usize] == 0 && pos < 2 {
                endpts[pos] = v;
                pos += 1;
            }
        }
        debug_assert_eq!(pos, 2, "a crossed convex face meets the plane in two vertices");

        self.edges_partition(face, new_face)?;
        self.add_common_edge(constr, face, new_face, endpts);
        Ok(())
    }

    /// Moves every face with a strictly-over vertex into the up-cell.
    fn faces_partition(&mut self, cell: usize, new_cell: usize) {
        let mut f = 0;
        while f < self.cells[cell].faces.len() {
            let face = self.cells[cell].faces[f];
            let face_vrts = self.face_vertices(face);
            let (over, _, _) = self.count_orientations(&face_vrts);
            // A face of a crossed convex cell cannot have vertices on both
            // sides here: crossed faces were already split.
            if over > 0 {
                self.faces[face].exchange_conn_cell(cell, new_cell);
                self.cells[new_cell].faces.push(face);
                self.cells[cell].faces.swap_remove(f);
            } else {
                f += 1;
            }
        }
    }

    // --- Common face -------------------------------------------------------

    /// Rebuilds a single cycle out of an unordered set of boundary edges
    /// via a vertex → two-incident-edges table.
    fn link_common_face_cycle(&mut self, face: usize, edge_ids: &[usize]) {
        // Face vertices: the boundary is closed, so there are as many
        // vertices as edges, each incident to exactly two of them.
        let mut face_vrts: Vec<u32> = Vec::with_capacity(edge_ids.len());
        for &e in edge_ids {
            for i in 0..2 {
                let v = self.edges[e].verts[i];
                if self.vert_visit[v as usize] == 0 {
                    self.vert_visit[v as usize] = 1;
                    face_vrts.push(v);
                }
            }
        }

        // Repurpose vert_visit as a position map into rel_ve.
        for &v in &face_vrts {
            self.vert_visit[v as usize] = u32::MAX;
        }
        let mut rel_ve = vec![NO_INDEX; 2 * face_vrts.len()];
        let mut pos: u32 = 0;
        for &e in edge_ids {
            for i in 0..2 {
                let v = self.edges[e].verts[i] as usize;
                if self.vert_visit[v] == u32::MAX {
                    rel_ve[2 * pos as usize] = e;
                    self.vert_visit[v] = pos;
                    pos += 1;
                } else {
                    rel_ve[2 * self.vert_visit[v] as usize + 1] = e;
                }
            }
        }

        // Walk the table, always leaving a vertex through its unvisited
        // incident edge.
        let mut cycle = Vec::with_capacity(edge_ids.len());
        let mut next_vrt = face_vrts[0];
        let mut e = rel_ve[2 * self.vert_visit[next_vrt as usize] as usize];
        while cycle.len() < face_vrts.len() {
            if self.edge_visit[e] == 0 {
                self.edge_visit[e] = 1;
                cycle.push(e);
                let ev = self.edges[e].verts;
                next_vrt = if next_vrt == ev[0] { ev[1] } else { ev[0] };
                e = rel_ve[2 * self.vert_visit[next_vrt as usize] as usize];
            } else {
                let base = 2 * self.vert_visit[next_vrt as usize] as usize;
                e = if e == rel_ve[base] {
                    rel_ve[base + 1]
                } else {
                    rel_ve[base]
                };
            }
        }
        self.faces[face].edges = cycle;

        // Restore only the touched entries.
        for &v in &face_vrts {
            self.vert_visit[v as usize] = 0;
        }
        for &e in edge_ids {
            self.edge_visit[e] = 0;
        }
    }

    /// Swaps `conn_cells` of a freshly built common face so that
    /// `conn_cells[0]` is the cell on the positive side of the face's
    /// oriented plane, decided by a 2D orientation on the dominant
    /// projection axis of the plane fingerprint.
    fn fix_common_face_orientation(&mut self, cf: usize) -> Result<()> {
        let plane = self.faces[cf].plane;
        let m0 = self.vertex_coords(plane[0]);
        let m1 = self.vertex_coords(plane[1]);
        let m2 = self.vertex_coords(plane[2]);
        let axis = max_component_in_triangle_normal(&m0, &m1, &m2);
        let ori0 = orient2d(
            &GenericPoint::Explicit(m0),
            &GenericPoint::Explicit(m1),
            &GenericPoint::Explicit(m2),
            axis,
        ) as i32;

        let cycle = self.faces[cf].edges.clone();
        let first = cycle[0];
        let mut vid = common_endpoint(self.edges[cycle[cycle.len() - 1]].verts, self.edges[first].verts);
        let v0 = vid;
        let ev = self.edges[first].verts;
        vid = if vid == ev[0] { ev[1] } else { ev[0] };
        let v1 = vid;
        let first_frame = self.edges[first].frame.clone();

        for &edge_i in &cycle[1..] {
            let ev = self.edges[edge_i].verts;
            vid = if vid == ev[0] { ev[1] } else { ev[0] };
            // A sibling edge on the same supporting planes is collinear
            // with the first one and cannot decide the orientation.
            if self.edges[edge_i].frame == first_frame {
                continue;
            }
            let ori = ori0
                * orient2d(
                    &self.vertices[v0 as usize].point,
                    &self.vertices[v1 as usize].point,
                    &self.vertices[vid as usize].point,
                    axis,
                ) as i32;
            if ori < 0 {
                return Ok(());
            }
            if ori > 0 {
                if self.faces[cf].conn_cells[1] == GHOST_CELL {
                    tracing::warn!(face = cf, "common face with a ghost side cannot be flipped");
                    return Ok(());
                }
                self.faces[cf].conn_cells.swap(0, 1);
                return Ok(());
            }
        }
        Err(Error::DegenerateCommonFace(cf))
    }

    /// Builds the face separating the two sub-cells out of every cell edge
    /// whose endpoints both lie on the splitting plane.
    fn add_common_face(
        &mut self,
        constr: u32,
        cell: usize,
        new_cell: usize,
        cell_edges: &[usize],
    ) -> Result<usize> {
        let colour = if self.is_virtual(constr) {
            FaceColour::White
        } else {
            FaceColour::Grey
        };
        let face = self.push_face(Face::new(
            self.constraints.verts(constr),
            cell,
            new_cell,
            colour,
        ));

        let on_plane: Vec<usize> = cell_edges
            .iter()
            .copied()
            .filter(|&e| {
                let ev = self.edges[e].verts;
                self.vert_orient[ev[0] as usize] == 0 && self.vert_orient[ev[1] as usize] == 0
            })
            .collect();
        self.link_common_face_cycle(face, &on_plane);
        for &e in &on_plane {
            self.edges[e].conn_face_0 = face;
        }

        self.cells[cell].faces.push(face);
        self.cells[new_cell].faces.push(face);
        self.fix_common_face_orientation(face)?;
        Ok(face)
    }

    // --- Constraint bookkeeping --------------------------------------------

    /// Removes from the cell every pending non-virtual constraint whose
    /// three vertices are incident to the plane of `constr`, and returns
    /// them together with `constr` itself (unless virtual).
    fn find_coplanar_constraints(&mut self, cell: usize, constr: u32) -> Vec<u32> {
        let k = self.constraints.verts(constr);
        let mut coplanar = Vec::new();
        let mut i = 0;
        while i < self.cells[cell].constraints.len() {
            let c = self.cells[cell].constraints[i];
            if self.is_virtual(c) {
                i += 1;
                continue;
            }
            let cv = self.constraints.verts(c);
            self.orient_verts_against_plane(&cv, k);
            if cv.iter().all(|&v| self.vert_orient[v as usize] == 0) {
                coplanar.push(c);
                self.cells[cell].constraints.swap_remove(i);
            } else {
                i += 1;
            }
        }
        if !self.is_virtual(constr) {
            coplanar.push(constr);
        }
        coplanar
    }

    /// Distributes the down-cell's remaining constraints between the two
    /// sub-cells of a completed split.
    fn constraints_partition(&mut self, ref_constr: u32, down: usize, up: usize) {
        let k = self.constraints.verts(ref_constr);
        let mut i = 0;
        while i < self.cells[down].constraints.len() {
            let c = self.cells[down].constraints[i];
            let cv = self.constraints.verts(c);
            self.orient_verts_against_plane(&cv, k);
            let (over, under, _) = self.count_orientations(&cv);

            // Same plane as the splitting constraint: the cut cannot
            // produce any further split.
            if over == 0 && under == 0 {
                self.cells[down].constraints.swap_remove(i);
                continue;
            }
            if over > 0 {
                self.cells[up].constraints.push(c);
            }
            if under == 0 {
                self.cells[down].constraints.swap_remove(i);
                continue;
            }
            i += 1;
        }
    }

    // --- The split ----------------------------------------------------------

    /// Pops one pending constraint of the cell and cuts the cell by its
    /// plane. When the plane only grazes the boundary the cell is left
    /// whole (and the coplanar harvest is discarded with the constraint).
    pub fn split_cell(&mut self, cell: usize) -> Result<()> {
        let Some(constr) = self.cells[cell].constraints.pop() else {
            return Ok(());
        };
        let k = self.constraints.verts(constr);

        let coplanar = self.find_coplanar_constraints(cell, constr);

        let (mut cell_edges, mut cell_verts) = self.cell_edges_and_verts(cell);
        self.orient_verts_against_plane(&cell_verts, k);
        let (over, under, _on) = self.count_orientations(&cell_verts);

        // The plane grazes the boundary: a face or an edge may lie on it,
        // everything else is in one half-space. Nothing to cut.
        if over == 0 || under == 0 {
            return Ok(());
        }

        // Split every edge whose endpoints straddle the plane. New halves
        // join the scan; their on-plane endpoint can never straddle.
        let mut e = 0;
        while e < cell_edges.len() {
            let ev = self.edges[cell_edges[e]].verts;
            if opposite_signs(
                self.vert_orient[ev[0] as usize],
                self.vert_orient[ev[1] as usize],
            ) {
                self.split_edge(cell_edges[e], constr);
                let new_vrt = (self.vertices.len() - 1) as u32;
                self.vert_orient[new_vrt as usize] = 0;
                cell_verts.push(new_vrt);
                cell_edges.push(self.edges.len() - 1);
            }
            e += 1;
        }

        // Split every face with vertices on both sides. Each split adds
        // one common edge lying on the plane.
        let num_faces = self.cells[cell].faces.len();
        for f in 0..num_faces {
            let face = self.cells[cell].faces[f];
            let face_vrts = self.face_vertices(face);
            let (fo, fu, _) = self.count_orientations(&face_vrts);
            if fo > 0 && fu > 0 {
                self.split_face(face, constr, &face_vrts)?;
                cell_edges.push(self.edges.len() - 1);
            }
        }

        // The down-subcell keeps the original index; the up-subcell is
        // appended.
        self.cells.push(Cell::default());
        let new_cell = self.cells.len() - 1;

        self.faces_partition(cell, new_cell);
        let common = self.add_common_face(constr, cell, new_cell, &cell_edges)?;
        self.faces[common].coplanar = coplanar.into_iter().collect();

        self.constraints_partition(constr, cell, new_cell);
        Ok(())
    }

    /// Cuts cells until no pending constraint remains. Newly appended
    /// cells are revisited by the same loop.
    pub fn subdivide(&mut self) -> Result<()> {
        let initial = self.cells.len();
        let mut i = 0;
        while i < self.cells.len() {
            if self.cells[i].constraints.is_empty() {
                i += 1;
            } else {
                self.split_cell(i)?;
            }
        }
        tracing::debug!(
            initial_cells = initial,
            final_cells = self.cells.len(),
            vertices = self.vertices.len(),
            "cell subdivision complete"
        );
        Ok(())
    }
}
