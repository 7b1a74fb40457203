// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Polycut Engine
//!
//! The stable facade over the boolean pipeline: validate and deduplicate
//! the input triangle soups, hand the point set to the meshing
//! collaborator ([`MeshingBackend`]), drive the subdivision/colouring/
//! labelling passes of [`polycut_complex`], and emit the result skin.
//!
//! ```rust,ignore
//! use polycut_engine::{make_polyhedral_mesh, parse_opcode, save_skin, TriangleSoup};
//!
//! let op = parse_opcode('I')?;
//! let mut complex = make_polyhedral_mesh(&soup_a, Some(&soup_b), op, &backend)?;
//! save_skin(&mut complex, "result.off", op)?;
//! ```

pub mod backend;
pub mod error;
pub mod input;
pub mod pipeline;

pub use backend::MeshingBackend;
pub use error::{Error, Result};
pub use input::{prepare, PreparedInput, TriangleSoup};
pub use pipeline::{make_polyhedral_mesh, parse_opcode, save_skin};

// Re-export the complex-side types callers need to consume the result.
pub use polycut_complex::{BoolOp, Complex, ConstraintSet, SkinMesh, TetMaps, TetMesh};
