// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Polycut Predicates
//!
//! Exact geometric predicates over *generic points*: explicit points with
//! double coordinates, LPI points (line ∩ plane) and TPI points
//! (plane ∩ plane ∩ plane), both defined symbolically by explicit points.
//!
//! Every predicate returns a sign in {−1, 0, +1} (or a boolean) that is
//! decided **exactly**:
//!
//! 1. an interval-arithmetic filter evaluates the expression with
//!    directed widening ([`interval::Interval`]);
//! 2. if the filter cannot separate the value from zero, the expression is
//!    re-evaluated over arbitrary-precision rationals ([`exact`]).
//!
//! Predicates never fail: a symbolically degenerate implicit point (a line
//! parallel to its plane, three planes sharing a line) evaluates to sign 0.
//!
//! ## Conventions
//!
//! - `orient3d(p, a, b, c)` is the sign of `det[a−p, b−p, c−p]`.
//! - 2D predicates take a projection axis: the named axis is dropped and
//!   the remaining pair keeps the cyclic order `0 → (y,z)`, `1 → (z,x)`,
//!   `2 → (x,y)`, so a projected orientation never flips sign relative to
//!   the dominant normal component that selected the axis.

pub mod exact;
pub mod interval;
pub mod point;
pub mod predicates;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

pub use interval::Interval;
pub use point::{GenericPoint, LpiPoint, TpiPoint};
pub use predicates::{
    inner_segments_cross, localized_point_in_triangle, max_component_in_triangle_normal,
    misaligned, orient2d, orient3d, point_in_inner_segment, point_in_triangle,
};
