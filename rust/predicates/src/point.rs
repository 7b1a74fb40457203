// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Generic points: explicit coordinates and the two implicit kinds.
//!
//! An implicit point stores copies of the explicit points that define it.
//! The defining points come from the immutable input vertex set, so the
//! copies can never go stale; symbolic identity (which *indices* built the
//! point) is tracked by the caller, not here.

use nalgebra::Point3;

use crate::exact::{self, Rat3};
use crate::interval::Interval;

/// Line ∩ plane: the intersection of the line through `p`, `q` with the
/// plane through `r`, `s`, `t`.
#[derive(Debug, Clone, PartialEq)]
pub struct LpiPoint {
    pub p: Point3<f64>,
    pub q: Point3<f64>,
    pub r: Point3<f64>,
    pub s: Point3<f64>,
    pub t: Point3<f64>,
}

/// Plane ∩ plane ∩ plane: each plane given by a triple of explicit points.
#[derive(Debug, Clone, PartialEq)]
pub struct TpiPoint {
    pub v: [Point3<f64>; 3],
    pub w: [Point3<f64>; 3],
    pub u: [Point3<f64>; 3],
}

/// A point of one of three kinds. Predicates dispatch on the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum GenericPoint {
    Explicit(Point3<f64>),
    Lpi(LpiPoint),
    Tpi(TpiPoint),
}

impl GenericPoint {
    #[inline]
    pub fn explicit(x: f64, y: f64, z: f64) -> Self {
        GenericPoint::Explicit(Point3::new(x, y, z))
    }

    #[inline]
    pub fn is_explicit(&self) -> bool {
        matches!(self, GenericPoint::Explicit(_))
    }

    /// The explicit coordinates, if this is an explicit point.
    #[inline]
    pub fn as_explicit(&self) -> Option<&Point3<f64>> {
        match self {
            GenericPoint::Explicit(p) => Some(p),
            _ => None,
        }
    }

    /// Approximate double coordinates.
    ///
    /// Exact for explicit points; for implicit points the coordinates are
    /// evaluated in double precision. Degenerate implicit points yield the
    /// midpoint of an empty enclosure, i.e. NaN — callers that can meet
    /// degeneracy must go through [`GenericPoint::exact`] instead.
    pub fn approx(&self) -> Point3<f64> {
        match self {
            GenericPoint::Explicit(p) => *p,
            GenericPoint::Lpi(lpi) => {
                let c = exact::lpi_approx(lpi);
                Point3::new(c[0], c[1], c[2])
            }
            GenericPoint::Tpi(tpi) => {
                let c = exact::tpi_approx(tpi);
                Point3::new(c[0], c[1], c[2])
            }
        }
    }

    /// Interval enclosure of the coordinates, or `None` when the interval
    /// evaluation cannot bound them (division by a straddling denominator).
    pub fn interval(&self) -> Option<[Interval; 3]> {
        match self {
            GenericPoint::Explicit(p) => {
                Some([Interval::new(p.x), Interval::new(p.y), Interval::new(p.z)])
            }
            GenericPoint::Lpi(lpi) => exact::lpi_interval(lpi),
            GenericPoint::Tpi(tpi) => exact::tpi_interval(tpi),
        }
    }

    /// Exact rational coordinates, or `None` for a symbolically degenerate
    /// implicit point.
    pub fn exact(&self) -> Option<Rat3> {
        match self {
            GenericPoint::Explicit(p) => Some(exact::rat3(p)),
            GenericPoint::Lpi(lpi) => exact::lpi_exact(lpi),
            GenericPoint::Tpi(tpi) => exact::tpi_exact(tpi),
        }
    }
}

impl From<Point3<f64>> for GenericPoint {
    #[inline]
    fn from(p: Point3<f64>) -> Self {
        GenericPoint::Explicit(p)
    }
}
