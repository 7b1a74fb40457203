// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The end-to-end pipeline driver.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;

use polycut_complex::{BoolOp, Complex, ConstraintSet};

use crate::backend::MeshingBackend;
use crate::error::{Error, Result};
use crate::input::{self, TriangleSoup};

/// Parses a boolean opcode character: `'U'`, `'I'`, `'D'` or `'0'`.
pub fn parse_opcode(op: char) -> Result<BoolOp> {
    BoolOp::from_opcode(op).ok_or(Error::InvalidOpcode(op))
}

/// Runs the whole pipeline and returns the labelled complex, ready for
/// [`Complex::extract_skin`].
///
/// `b` must be present exactly when `op` is a two-input operator;
/// single-input repair resolves the self-intersections of `a` alone.
pub fn make_polyhedral_mesh(
    a: &TriangleSoup,
    b: Option<&TriangleSoup>,
    op: BoolOp,
    backend: &dyn MeshingBackend,
) -> Result<Complex> {
    match (op.is_two_input(), b.is_some()) {
        (true, false) => return Err(Error::MissingSecondInput(op)),
        (false, true) => return Err(Error::UnexpectedSecondInput),
        _ => {}
    }

    let start = Instant::now();
    let prepared = input::prepare(a, b)?;
    tracing::info!(
        points = prepared.points.len(),
        constraints = prepared.triangles.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "input prepared"
    );

    let stage = Instant::now();
    let mesh = backend.tetrahedralize(&prepared.points)?;
    let mut constraints = ConstraintSet::new(prepared.triangles, prepared.groups);
    let virtuals = backend.close_envelope(&mesh, &mut constraints)?;
    let maps = backend.map_intersections(&mesh, &constraints)?;
    tracing::info!(
        tets = mesh.num_tets(),
        virtuals,
        elapsed_ms = stage.elapsed().as_millis() as u64,
        "tetrahedralization and incidence maps ready"
    );

    let stage = Instant::now();
    let mut complex = Complex::from_tet_mesh(&mesh, constraints, &maps);
    complex.subdivide()?;
    tracing::info!(
        cells = complex.cells.len(),
        elapsed_ms = stage.elapsed().as_millis() as u64,
        "cell subdivision done"
    );

    let stage = Instant::now();
    complex.resolve_face_colours(op.is_two_input());
    complex.classify_cells();
    tracing::info!(
        faces = complex.faces.len(),
        elapsed_ms = stage.elapsed().as_millis() as u64,
        total_ms = start.elapsed().as_millis() as u64,
        "faces coloured and cells classified"
    );

    Ok(complex)
}

/// Extracts the skin for `op` and writes it as an OFF file.
pub fn save_skin<P: AsRef<Path>>(complex: &mut Complex, path: P, op: BoolOp) -> Result<()> {
    let skin = complex.extract_skin(op);
    let mut out = BufWriter::new(File::create(path)?);
    skin.write_off(&mut out)?;
    Ok(())
}
