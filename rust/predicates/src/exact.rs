// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinate evaluation for implicit points.
//!
//! The same construction formulas are instantiated three times — double,
//! interval and exact rational — through the private [`Field`] trait, so
//! the filter and the fallback can never disagree on the geometry.

use nalgebra::Point3;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::interval::Interval;
use crate::point::{LpiPoint, TpiPoint};

/// Exact rational coordinates of a point.
pub type Rat3 = [BigRational; 3];

/// Every double is an exact rational; coordinates are validated finite
/// before they reach the predicate layer.
pub(crate) fn rat(v: f64) -> BigRational {
    BigRational::from_float(v).expect("finite coordinate")
}

pub(crate) fn rat3(p: &Point3<f64>) -> Rat3 {
    [rat(p.x), rat(p.y), rat(p.z)]
}

/// Lossy conversion back to double, for diagnostics and tests.
pub fn rat_to_f64(r: &BigRational) -> f64 {
    r.to_f64().unwrap_or(f64::NAN)
}

/// Sign of a rational in {−1, 0, +1}.
#[inline]
pub(crate) fn rat_sign(r: &BigRational) -> i8 {
    if r.is_zero() {
        0
    } else if r.is_positive() {
        1
    } else {
        -1
    }
}

// --- Shared construction formulas -----------------------------------------

trait Field: Clone {
    fn from_f64(v: f64) -> Self;
    fn add(&self, o: &Self) -> Self;
    fn sub(&self, o: &Self) -> Self;
    fn mul(&self, o: &Self) -> Self;
    /// `None` when the divisor cannot be certified non-zero.
    fn div_checked(&self, o: &Self) -> Option<Self>;
}

impl Field for f64 {
    fn from_f64(v: f64) -> Self {
        v
    }
    fn add(&self, o: &Self) -> Self {
        self + o
    }
    fn sub(&self, o: &Self) -> Self {
        self - o
    }
    fn mul(&self, o: &Self) -> Self {
        self * o
    }
    fn div_checked(&self, o: &Self) -> Option<Self> {
        Some(self / o)
    }
}

impl Field for Interval {
    fn from_f64(v: f64) -> Self {
        Interval::new(v)
    }
    fn add(&self, o: &Self) -> Self {
        *self + *o
    }
    fn sub(&self, o: &Self) -> Self {
        *self - *o
    }
    fn mul(&self, o: &Self) -> Self {
        *self * *o
    }
    fn div_checked(&self, o: &Self) -> Option<Self> {
        self.checked_div(*o)
    }
}

impl Field for BigRational {
    fn from_f64(v: f64) -> Self {
        rat(v)
    }
    fn add(&self, o: &Self) -> Self {
        self + o
    }
    fn sub(&self, o: &Self) -> Self {
        self - o
    }
    fn mul(&self, o: &Self) -> Self {
        self * o
    }
    fn div_checked(&self, o: &Self) -> Option<Self> {
        if o.is_zero() {
            None
        } else {
            Some(self / o)
        }
    }
}

fn lift<T: Field>(p: &Point3<f64>) -> [T; 3] {
    [T::from_f64(p.x), T::from_f64(p.y), T::from_f64(p.z)]
}

fn sub3<T: Field>(a: &[T; 3], b: &[T; 3]) -> [T; 3] {
    [a[0].sub(&b[0]), a[1].sub(&b[1]), a[2].sub(&b[2])]
}

fn cross3<T: Field>(a: &[T; 3], b: &[T; 3]) -> [T; 3] {
    [
        a[1].mul(&b[2]).sub(&a[2].mul(&b[1])),
        a[2].mul(&b[0]).sub(&a[0].mul(&b[2])),
        a[0].mul(&b[1]).sub(&a[1].mul(&b[0])),
    ]
}

fn dot3<T: Field>(a: &[T; 3], b: &[T; 3]) -> T {
    a[0].mul(&b[0]).add(&a[1].mul(&b[1])).add(&a[2].mul(&b[2]))
}

/// Determinant of the matrix with rows `a`, `b`, `c`.
fn det3<T: Field>(a: &[T; 3], b: &[T; 3], c: &[T; 3]) -> T {
    dot3(a, &cross3(b, c))
}

/// Line `p→q` intersected with the plane through `r`, `s`, `t`.
fn lpi_coords<T: Field>(lpi: &LpiPoint) -> Option<[T; 3]> {
    let p: [T; 3] = lift(&lpi.p);
    let q: [T; 3] = lift(&lpi.q);
    let r: [T; 3] = lift(&lpi.r);
    let s: [T; 3] = lift(&lpi.s);
    let t: [T; 3] = lift(&lpi.t);

    let n = cross3(&sub3(&s, &r), &sub3(&t, &r));
    let dir = sub3(&q, &p);
    let tau = dot3(&n, &sub3(&r, &p)).div_checked(&dot3(&n, &dir))?;
    Some([
        p[0].add(&tau.mul(&dir[0])),
        p[1].add(&tau.mul(&dir[1])),
        p[2].add(&tau.mul(&dir[2])),
    ])
}

/// Intersection point of three planes, each through a triple of points.
fn tpi_coords<T: Field>(tpi: &TpiPoint) -> Option<[T; 3]> {
    let plane = |tri: &[Point3<f64>; 3]| -> ([T; 3], T) {
        let a: [T; 3] = lift(&tri[0]);
        let b: [T; 3] = lift(&tri[1]);
        let c: [T; 3] = lift(&tri[2]);
        let n = cross3(&sub3(&b, &a), &sub3(&c, &a));
        let d = dot3(&n, &a);
        (n, d)
    };
    let (n1, d1) = plane(&tpi.v);
    let (n2, d2) = plane(&tpi.w);
    let (n3, d3) = plane(&tpi.u);

    let det = det3(&n1, &n2, &n3);
    // Cramer: replace one column of N with d at a time.
    let col = |i: usize| -> T {
        let mut r1 = n1.clone();
        let mut r2 = n2.clone();
        let mut r3 = n3.clone();
        r1[i] = d1.clone();
        r2[i] = d2.clone();
        r3[i] = d3.clone();
        det3(&r1, &r2, &r3)
    };
    Some([
        col(0).div_checked(&det)?,
        col(1).div_checked(&det)?,
        col(2).div_checked(&det)?,
    ])
}

// --- Public per-representation entry points -------------------------------

pub(crate) fn lpi_approx(lpi: &LpiPoint) -> [f64; 3] {
    lpi_coords::<f64>(lpi).unwrap_or([f64::NAN; 3])
}

pub(crate) fn tpi_approx(tpi: &TpiPoint) -> [f64; 3] {
    tpi_coords::<f64>(tpi).unwrap_or([f64::NAN; 3])
}

pub(crate) fn lpi_interval(lpi: &LpiPoint) -> Option<[Interval; 3]> {
    lpi_coords::<Interval>(lpi)
}

pub(crate) fn tpi_interval(tpi: &TpiPoint) -> Option<[Interval; 3]> {
    tpi_coords::<Interval>(tpi)
}

pub(crate) fn lpi_exact(lpi: &LpiPoint) -> Option<Rat3> {
    lpi_coords::<BigRational>(lpi)
}

pub(crate) fn tpi_exact(tpi: &TpiPoint) -> Option<Rat3> {
    tpi_coords::<BigRational>(tpi)
}

// --- Exact determinant signs used by the predicate fallback ---------------

/// Sign of `det[a−p, b−p, c−p]` with `p` rational and `a,b,c` doubles.
pub(crate) fn orient3d_exact(p: &Rat3, a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> i8 {
    let a = rat3(a);
    let b = rat3(b);
    let c = rat3(c);
    rat_sign(&det3(&sub3(&a, p), &sub3(&b, p), &sub3(&c, p)))
}

/// Sign of the 2D determinant `det[a−p, b−p]` on the projected pair
/// `(u, v)` of coordinate indices.
pub(crate) fn orient2d_exact(p: &Rat3, a: &Rat3, b: &Rat3, u: usize, v: usize) -> i8 {
    let au = a[u].sub(&p[u]);
    let av = a[v].sub(&p[v]);
    let bu = b[u].sub(&p[u]);
    let bv = b[v].sub(&p[v]);
    rat_sign(&au.mul(&bv).sub(&av.mul(&bu)))
}
