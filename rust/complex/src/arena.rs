// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for the polyhedral complex.
//!
//! The [`Complex`] is the central owner of all entities. Vertices, edges,
//! faces and cells live in append-only vectors and reference each other by
//! integer index; an index is an identity for the lifetime of the complex
//! (subdivision is additive, nothing is ever deallocated). The only
//! back-references are `Edge::conn_face_0` (a traversal seed into the
//! edge–face ring) and `Face::conn_cells` — everything else is re-derived
//! on demand.
//!
//! ## Scratch maps
//!
//! Three process-wide dense vectors (`vert_orient`, `vert_visit`,
//! `edge_visit`) provide O(1) lookups during traversals. They grow in
//! lockstep with the arenas and every routine that writes them resets
//! exactly the entries it touched before returning; a full clear would
//! break the amortised-linear cost, a missed reset would misclassify
//! entities on the next call.

use nalgebra::Point3;
use polycut_predicates::{orient3d, GenericPoint};
use smallvec::SmallVec;

use crate::constraint::ConstraintSet;

/// Sentinel cell index: the outside of the convex hull.
pub const GHOST_CELL: usize = usize::MAX;
/// Sentinel for "no edge/face found".
pub(crate) const NO_INDEX: usize = usize::MAX;
/// Sentinel vertex index.
pub const NO_VERTEX: u32 = u32::MAX;

/// How a vertex came into existence, recorded by vertex *indices* so that
/// symbolic incidence can be decided without evaluating a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// An input point.
    Input,
    /// Intersection of the line through two input points with the plane
    /// through three input points.
    Lpi { line: [u32; 2], plane: [u32; 3] },
    /// Intersection of three planes, each through a triple of input points.
    Tpi { planes: [[u32; 3]; 3] },
}

/// A vertex: its coordinate-level point plus its symbolic construction.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub point: GenericPoint,
    pub origin: Provenance,
}

/// The mesh-plane fingerprint of an edge: what geometry supports it.
/// Splitting a `Line` edge yields an LPI vertex, splitting a `Planes`
/// edge yields a TPI vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeFrame {
    /// The edge lies on the line through two input points.
    Line { a: u32, b: u32 },
    /// The edge is the intersection of two planes, each a triple of
    /// input points.
    Planes { p: [u32; 3], q: [u32; 3] },
}

/// An edge of the complex.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Unordered endpoint pair.
    pub verts: [u32; 2],
    pub frame: EdgeFrame,
    /// Any one incident face, used as the seed of the edge–face ring.
    pub conn_face_0: usize,
}

impl Edge {
    pub fn on_line(v0: u32, v1: u32, a: u32, b: u32) -> Self {
        Self {
            verts: [v0, v1],
            frame: EdgeFrame::Line { a, b },
            conn_face_0: NO_INDEX,
        }
    }

    pub fn on_planes(v0: u32, v1: u32, p: [u32; 3], q: [u32; 3]) -> Self {
        Self {
            verts: [v0, v1],
            frame: EdgeFrame::Planes { p, q },
            conn_face_0: NO_INDEX,
        }
    }

    /// Splits the edge at `new_point`. `self` becomes the
    /// `<new_point, v1>` half and the returned edge is `<v0, new_point>`;
    /// both halves keep the frame and the ring seed.
    pub fn split(&mut self, new_point: u32) -> Edge {
        let half = Edge {
            verts: [self.verts[0], new_point],
            frame: self.frame.clone(),
            conn_face_0: self.conn_face_0,
        };
        self.verts[0] = new_point;
        half
    }
}

/// A face's membership relation to input-triangle interiors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceColour {
    /// Not on any input triangle.
    White,
    /// Touched by coplanar constraints, not yet resolved.
    Grey,
    BlackA,
    BlackB,
    BlackAb,
}

impl FaceColour {
    #[inline]
    pub fn is_black(&self) -> bool {
        matches!(self, FaceColour::BlackA | FaceColour::BlackB | FaceColour::BlackAb)
    }
}

/// A face of the complex: a convex planar polygon between two cells.
#[derive(Debug, Clone)]
pub struct Face {
    /// Edge indices forming a single cycle; consecutive edges share
    /// exactly one vertex.
    pub edges: Vec<usize>,
    /// The two incident cells; `conn_cells[1]` may be [`GHOST_CELL`].
    pub conn_cells: [usize; 2],
    /// Plane fingerprint: the input triangle whose plane contains the face.
    pub plane: [u32; 3],
    pub colour: FaceColour,
    /// Indices of non-virtual constraints lying in this face's plane.
    pub coplanar: SmallVec<[u32; 2]>,
}

impl Face {
    pub fn new(plane: [u32; 3], cell: usize, adj_cell: usize, colour: FaceColour) -> Self {
        Self {
            edges: Vec::new(),
            conn_cells: [cell, adj_cell],
            plane,
            colour,
            coplanar: SmallVec::new(),
        }
    }

    #[inline]
    pub fn exchange_conn_cell(&mut self, cell: usize, new_cell: usize) {
        if self.conn_cells[0] == cell {
            self.conn_cells[0] = new_cell;
        } else {
            self.conn_cells[1] = new_cell;
        }
    }

    #[inline]
    pub fn opposite_cell(&self, cell: usize) -> usize {
        if self.conn_cells[0] == cell {
            self.conn_cells[1]
        } else {
            self.conn_cells[0]
        }
    }
}

/// A cell's membership in the input solids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellPlace {
    Undecided,
    External,
    InternalA,
    InternalB,
    InternalAb,
}

/// A convex cell of the complex.
#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub faces: SmallVec<[usize; 8]>,
    /// Input triangles whose interior still crosses this cell's interior.
    pub constraints: Vec<u32>,
    pub place: CellPlace,
}

impl Default for CellPlace {
    fn default() -> Self {
        CellPlace::Undecided
    }
}

/// The polyhedral complex: a partition of the convex hull of the input
/// points into convex cells whose 2-skeleton carries every constraint.
#[derive(Debug, Clone)]
pub struct Complex {
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    pub faces: Vec<Face>,
    pub cells: Vec<Cell>,
    pub constraints: ConstraintSet,

    // Dense scratch maps, index-aligned with the arenas.
    pub(crate) vert_orient: Vec<i8>,
    pub(crate) vert_visit: Vec<u32>,
    pub(crate) edge_visit: Vec<u8>,
}

/// orBin value meaning "not computed".
pub(crate) const ORIENT_UNSET: i8 = 2;

impl Complex {
    pub(crate) fn push_vertex(&mut self, point: GenericPoint, origin: Provenance) -> u32 {
        self.vertices.push(Vertex { point, origin });
        self.vert_orient.push(ORIENT_UNSET);
        self.vert_visit.push(0);
        (self.vertices.len() - 1) as u32
    }

    pub(crate) fn push_edge(&mut self, edge: Edge) -> usize {
        self.edges.push(edge);
        self.edge_visit.push(0);
        self.edges.len() - 1
    }

    pub(crate) fn push_face(&mut self, face: Face) -> usize {
        self.faces.push(face);
        self.faces.len() - 1
    }

    /// Approximate coordinates of a vertex (exact for input points).
    #[inline]
    pub fn vertex_coords(&self, v: u32) -> Point3<f64> {
        self.vertices[v as usize].point.approx()
    }

    #[inline]
    pub fn is_virtual(&self, c: u32) -> bool {
        self.constraints.is_virtual(c)
    }

    // --- Symbolic incidence ------------------------------------------------

    /// True when vertex `v` is provably on the plane through the input
    /// points `plane` *by construction*: an input vertex of the plane, an
    /// LPI whose line is a side of the plane or whose plane is the same
    /// triangle, or a TPI one of whose planes is the same triangle.
    ///
    /// This is the only mechanism that guarantees `orient3d` is exactly
    /// zero for symbolically incident points; plane triangles compare by
    /// their stored vertex order.
    pub fn built_from_plane(&self, v: u32, plane: [u32; 3]) -> bool {
        let [p0, p1, p2] = plane;
        match &self.vertices[v as usize].origin {
            Provenance::Input => v == p0 || v == p1 || v == p2,
            Provenance::Lpi { line, plane: q } => {
                let side = |a: u32, b: u32| {
                    (line[0] == a && line[1] == b) || (line[0] == b && line[1] == a)
                };
                side(p0, p1) || side(p1, p2) || side(p2, p0) || *q == plane
            }
            Provenance::Tpi { planes } => planes.iter().any(|q| *q == plane),
        }
    }

    /// Classifies every vertex of `verts` against the plane through the
    /// constraint triangle `plane`, writing `vert_orient` (positive =
    /// over). Vertices recognised as incident by construction are forced
    /// to zero. Entries stay valid until the next call that touches them.
    pub(crate) fn orient_verts_against_plane(&mut self, verts: &[u32], plane: [u32; 3]) {
        let a = self.vertex_coords(plane[0]);
        let b = self.vertex_coords(plane[2]);
        let c = self.vertex_coords(plane[1]);
        for &v in verts {
            self.vert_orient[v as usize] = if self.built_from_plane(v, plane) {
                0
            } else {
                orient3d(&self.vertices[v as usize].point, &a, &b, &c)
            };
        }
    }

    /// Counts `(over, under, on)` among the classified vertices.
    pub(crate) fn count_orientations(&self, verts: &[u32]) -> (u32, u32, u32) {
        let mut over = 0;
        let mut under = 0;
        let mut on = 0;
        for &v in verts {
            match self.vert_orient[v as usize] {
                1 => over += 1,
                -1 => under += 1,
                0 => on += 1,
                _ => {}
            }
        }
        (over, under, on)
    }

    // --- Traversal helpers -------------------------------------------------

    /// The number of distinct edges bounding a cell (each half-edge is
    /// counted once per incident face).
    pub fn count_cell_edges(&self, cell: usize) -> usize {
        let half: usize = self.cells[cell]
            .faces
            .iter()
            .map(|&f| self.faces[f].edges.len())
            .sum();
        half / 2
    }

    /// Distinct edges and vertices of a cell, each listed exactly once.
    /// Uses (and restores) the visit scratch.
    pub(crate) fn cell_edges_and_verts(&mut self, cell: usize) -> (Vec<usize>, Vec<u32>) {
        let num_edges = self.count_cell_edges(cell);
        // Euler: V = E + 2 − F.
        let num_verts = num_edges + 2 - self.cells[cell].faces.len();
        let mut cell_edges = Vec::with_capacity(num_edges + 4);
        let mut cell_verts = Vec::with_capacity(num_verts + 4);

        for fi in 0..self.cells[cell].faces.len() {
            let f = self.cells[cell].faces[fi];
            for ei in 0..self.faces[f].edges.len() {
                let e = self.faces[f].edges[ei];
                if self.edge_visit[e] == 0 {
                    self.edge_visit[e] = 1;
                    cell_edges.push(e);
                    for &v in &self.edges[e].verts {
                        if self.vert_visit[v as usize] == 0 {
                            self.vert_visit[v as usize] = 1;
                            cell_verts.push(v);
                        }
                    }
                }
            }
        }

        // Restore only the touched entries.
        for &e in &cell_edges {
            self.edge_visit[e] = 0;
        }
        for &v in &cell_verts {
            self.vert_visit[v as usize] = 0;
        }
        (cell_edges, cell_verts)
    }

    /// The vertices of a face in cycle order. Relies on the cycle
    /// invariant: consecutive edges share exactly one vertex.
    pub fn face_vertices(&self, face: usize) -> Vec<u32> {
        let edges = &self.faces[face].edges;
        let mut out = Vec::with_capacity(edges.len());

        let e0 = self.edges[edges[0]].verts;
        let e1 = self.edges[edges[1]].verts;
        let link = common_endpoint(e0, e1);
        // Orient the first edge so the walk leaves through `link`.
        if link == e0[0] {
            out.push(e0[1]);
            out.push(e0[0]);
        } else {
            out.push(e0[0]);
            out.push(e0[1]);
        }

        let mut link = out[1];
        for &e in &edges[1..edges.len() - 1] {
            let ev = self.edges[e].verts;
            link = if link == ev[0] { ev[1] } else { ev[0] };
            out.push(link);
        }
        out
    }

}

/// Common endpoint of two consecutive edges; [`NO_VERTEX`] if they do not
/// touch (which would mean the cycle invariant is broken).
pub(crate) fn common_endpoint(u: [u32; 2], v: [u32; 2]) -> u32 {
    if u[0] == v[0] || u[0] == v[1] {
        u[0]
    } else if u[1] == v[0] || u[1] == v[1] {
        u[1]
    } else {
        debug_assert!(false, "edges are not consecutive");
        NO_VERTEX
    }
}

/// True when two edges share at least one endpoint (the edges themselves
/// are assumed distinct).
#[inline]
pub(crate) fn consecutive_edges(a: [u32; 2], b: [u32; 2]) -> bool {
    a[0] == b[0] || a[0] == b[1] || a[1] == b[0] || a[1] == b[1]
}
