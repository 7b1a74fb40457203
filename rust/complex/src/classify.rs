// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cell labelling: interior/exterior classification of the complex.
//!
//! Placement floods from the ghost exterior across the cell-adjacency
//! graph. A white face propagates the membership pair unchanged; a black
//! face toggles membership in its group (A, B, or both for AB). The first
//! assignment to a cell wins; a constraint surface that does not enclose a
//! volume therefore labels both of its sides external, and the
//! inconsistent re-entry is only logged.

use std::collections::VecDeque;

use crate::arena::{CellPlace, Complex, FaceColour, GHOST_CELL};

#[inline]
fn cross_face(membership: (bool, bool), colour: FaceColour) -> (bool, bool) {
    match colour {
        FaceColour::BlackA => (!membership.0, membership.1),
        FaceColour::BlackB => (membership.0, !membership.1),
        FaceColour::BlackAb => (!membership.0, !membership.1),
        _ => membership,
    }
}

impl Complex {
    /// Assigns every cell its placement. Requires the colour pass to have
    /// resolved all grey faces.
    pub fn classify_cells(&mut self) {
        let mut membership: Vec<Option<(bool, bool)>> = vec![None; self.cells.len()];
        let mut queue: VecDeque<(usize, (bool, bool))> = VecDeque::new();

        // Entering from outside the hull.
        for face in &self.faces {
            if face.conn_cells[1] == GHOST_CELL {
                queue.push_back((face.conn_cells[0], cross_face((false, false), face.colour)));
            }
        }

        let mut conflicts = 0usize;
        while let Some((cell, m)) = queue.pop_front() {
            match membership[cell] {
                Some(prev) => {
                    if prev != m {
                        conflicts += 1;
                    }
                }
                None => {
                    membership[cell] = Some(m);
                    for &f in &self.cells[cell].faces {
                        let other = self.faces[f].opposite_cell(cell);
                        if other != GHOST_CELL && membership[other].is_none() {
                            queue.push_back((other, cross_face(m, self.faces[f].colour)));
                        }
                    }
                }
            }
        }
        if conflicts > 0 {
            tracing::warn!(
                conflicts,
                "placement flood met inconsistent labels; kept the first assignment"
            );
        }

        let mut internal = 0usize;
        for (cell, m) in membership.into_iter().enumerate() {
            self.cells[cell].place = match m {
                Some((true, false)) => CellPlace::InternalA,
                Some((false, true)) => CellPlace::InternalB,
                Some((true, true)) => CellPlace::InternalAb,
                _ => CellPlace::External,
            };
            if self.cells[cell].place != CellPlace::External {
                internal += 1;
            }
        }
        tracing::debug!(
            cells = self.cells.len(),
            internal,
            "cells classified against the constraint surface"
        );
    }
}
