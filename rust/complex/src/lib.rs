// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Polycut Complex
//!
//! An exact polyhedral complex built by BSP subdivision of a constrained
//! tetrahedralization. The complex partitions the convex hull of the
//! input points into convex cells whose 2-skeleton carries every input
//! triangle ("constraint"); face colouring and cell labelling then turn
//! the partition into a boolean composition of the input solids.
//!
//! ## Pipeline
//!
//! 1. [`Complex::from_tet_mesh`] — one cell per tetrahedron, shared faces
//!    and edges deduplicated, colours and pending constraints seeded.
//! 2. [`Complex::subdivide`] — cut every cell by its pending constraint
//!    planes; intersection vertices are symbolic (LPI/TPI) and all
//!    incidence decisions are exact.
//! 3. [`Complex::resolve_face_colours`] — decide for every grey face
//!    whether it lies inside a coplanar input triangle.
//! 4. [`Complex::classify_cells`] — flood interior/exterior placement
//!    across the cell graph.
//! 5. [`Complex::extract_skin`] — emit the boundary of the selected
//!    boolean as an indexed polygon mesh ([`SkinMesh`], OFF emitter
//!    included).
//!
//! The tetrahedralizer and the constraint-incidence analysis are external
//! collaborators; [`TetMesh`] and [`TetMaps`] are their interface.
//!
//! ## Example
//!
//! ```rust,ignore
//! use polycut_complex::{BoolOp, Complex};
//!
//! let mut complex = Complex::from_tet_mesh(&mesh, constraints, &maps);
//! complex.subdivide()?;
//! complex.resolve_face_colours(true);
//! complex.classify_cells();
//! let skin = complex.extract_skin(BoolOp::Intersection);
//! skin.write_off(&mut std::io::stdout())?;
//! ```

pub mod arena;
pub mod bootstrap;
pub mod classify;
pub mod colour;
pub mod constraint;
pub mod error;
pub mod skin;
pub mod split;
pub mod validate;

pub use arena::{
    Cell, CellPlace, Complex, Edge, EdgeFrame, Face, FaceColour, Provenance, Vertex, GHOST_CELL,
    NO_VERTEX,
};
pub use bootstrap::{TetMaps, TetMesh};
pub use constraint::{ConstraintGroup, ConstraintSet};
pub use error::{Error, Result};
pub use skin::{BoolOp, SkinMesh};
