// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Constraints: the input triangles the complex must carry in its
//! 2-skeleton.

/// Which input solid a constraint belongs to. In single-input mode every
/// constraint is tagged [`ConstraintGroup::A`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintGroup {
    A,
    B,
}

/// The constraint table: one triangle of input-vertex indices per
/// constraint, plus its group tag.
///
/// Constraints with index ≥ `first_virtual` are *virtual*: synthesised to
/// close the manifold envelope, they cut cells like any other constraint
/// but carry no colouring weight.
#[derive(Debug, Clone)]
pub struct ConstraintSet {
    verts: Vec<[u32; 3]>,
    groups: Vec<ConstraintGroup>,
    first_virtual: u32,
}

impl ConstraintSet {
    /// Builds the table from real (non-virtual) constraints.
    pub fn new(verts: Vec<[u32; 3]>, groups: Vec<ConstraintGroup>) -> Self {
        debug_assert_eq!(verts.len(), groups.len());
        let first_virtual = verts.len() as u32;
        Self {
            verts,
            groups,
            first_virtual,
        }
    }

    /// Appends a virtual constraint; returns its index.
    pub fn push_virtual(&mut self, tri: [u32; 3]) -> u32 {
        self.verts.push(tri);
        self.groups.push(ConstraintGroup::A);
        (self.verts.len() - 1) as u32
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.verts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.verts.is_empty()
    }

    #[inline]
    pub fn verts(&self, c: u32) -> [u32; 3] {
        self.verts[c as usize]
    }

    #[inline]
    pub fn group(&self, c: u32) -> ConstraintGroup {
        self.groups[c as usize]
    }

    #[inline]
    pub fn is_virtual(&self, c: u32) -> bool {
        c >= self.first_virtual
    }

    #[inline]
    pub fn first_virtual(&self) -> u32 {
        self.first_virtual
    }
}
