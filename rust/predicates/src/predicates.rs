// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The predicate layer: exact signs over generic points.
//!
//! Explicit-only calls go straight to the adaptive-precision kernels of
//! the `robust` crate. Calls involving implicit points run the interval
//! filter and fall back to rational arithmetic when the filter cannot
//! separate the value from zero.

use std::cmp::Ordering;

use nalgebra::Point3;
use robust::{Coord, Coord3D};

use crate::exact;
use crate::interval::Interval;
use crate::point::GenericPoint;

#[inline]
fn coord2(p: &Point3<f64>, u: usize, v: usize) -> Coord<f64> {
    Coord { x: p[u], y: p[v] }
}

#[inline]
fn coord3(p: &Point3<f64>) -> Coord3D<f64> {
    Coord3D {
        x: p.x,
        y: p.y,
        z: p.z,
    }
}

#[inline]
fn sign_f64(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// The projected coordinate pair left after dropping `axis`, in the cyclic
/// order that keeps orientation signs consistent with the 3D normal:
/// `0 → (y,z)`, `1 → (z,x)`, `2 → (x,y)`.
#[inline]
fn proj_axes(axis: usize) -> (usize, usize) {
    match axis {
        0 => (1, 2),
        1 => (2, 0),
        _ => (0, 1),
    }
}

/// Sign of `det[a−p, b−p, c−p]`; 0 when the four points are coplanar.
pub fn orient3d(p: &GenericPoint, a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> i8 {
    if let GenericPoint::Explicit(pe) = p {
        return sign_f64(robust::orient3d(coord3(a), coord3(b), coord3(c), coord3(pe)));
    }
    if let Some(pi) = p.interval() {
        if let Some(s) = orient3d_interval(&pi, a, b, c) {
            return s;
        }
    }
    match p.exact() {
        Some(pr) => exact::orient3d_exact(&pr, a, b, c),
        None => 0,
    }
}

fn orient3d_interval(
    p: &[Interval; 3],
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> Option<i8> {
    let row = |q: &Point3<f64>| {
        [
            Interval::new(q.x) - p[0],
            Interval::new(q.y) - p[1],
            Interval::new(q.z) - p[2],
        ]
    };
    let [ax, ay, az] = row(a);
    let [bx, by, bz] = row(b);
    let [cx, cy, cz] = row(c);
    let det = ax * (by * cz - bz * cy) - ay * (bx * cz - bz * cx) + az * (bx * cy - by * cx);
    det.sign()
}

/// Sign of the projected `det[a−p, b−p]` after dropping `axis`: the
/// orientation of the triangle `(p, a, b)` in the projection plane.
pub fn orient2d(p: &GenericPoint, a: &GenericPoint, b: &GenericPoint, axis: usize) -> i8 {
    let (u, v) = proj_axes(axis);
    if let (GenericPoint::Explicit(pe), GenericPoint::Explicit(ae), GenericPoint::Explicit(be)) =
        (p, a, b)
    {
        return sign_f64(robust::orient2d(
            coord2(pe, u, v),
            coord2(ae, u, v),
            coord2(be, u, v),
        ));
    }
    if let (Some(pi), Some(ai), Some(bi)) = (p.interval(), a.interval(), b.interval()) {
        let det = (ai[u] - pi[u]) * (bi[v] - pi[v]) - (ai[v] - pi[v]) * (bi[u] - pi[u]);
        if let Some(s) = det.sign() {
            return s;
        }
    }
    match (p.exact(), a.exact(), b.exact()) {
        (Some(pr), Some(ar), Some(br)) => exact::orient2d_exact(&pr, &ar, &br, u, v),
        _ => 0,
    }
}

/// Exact ordering of two generic points along one coordinate axis.
/// Symbolically degenerate points compare equal.
fn cmp_axis(p: &GenericPoint, q: &GenericPoint, axis: usize) -> Ordering {
    if let (GenericPoint::Explicit(pe), GenericPoint::Explicit(qe)) = (p, q) {
        return pe[axis].total_cmp(&qe[axis]);
    }
    if let (Some(pi), Some(qi)) = (p.interval(), q.interval()) {
        if pi[axis].hi < qi[axis].lo {
            return Ordering::Less;
        }
        if pi[axis].lo > qi[axis].hi {
            return Ordering::Greater;
        }
    }
    match (p.exact(), q.exact()) {
        (Some(pr), Some(qr)) => pr[axis].cmp(&qr[axis]),
        _ => Ordering::Equal,
    }
}

/// True when `p` lies strictly inside the segment `a`–`b` in the
/// projection that drops `axis` (endpoints excluded).
pub fn point_in_inner_segment(
    p: &GenericPoint,
    a: &GenericPoint,
    b: &GenericPoint,
    axis: usize,
) -> bool {
    if orient2d(p, a, b, axis) != 0 {
        return false;
    }
    let (u, v) = proj_axes(axis);
    for ax in [u, v] {
        match cmp_axis(a, b, ax) {
            Ordering::Less => {
                return cmp_axis(a, p, ax) == Ordering::Less && cmp_axis(p, b, ax) == Ordering::Less
            }
            Ordering::Greater => {
                return cmp_axis(b, p, ax) == Ordering::Less && cmp_axis(p, a, ax) == Ordering::Less
            }
            Ordering::Equal => {}
        }
    }
    // a and b coincide in the projection.
    false
}

/// True when the open segments `u1`–`u2` and `v1`–`v2` properly cross in
/// the projection that drops `axis`. Touching endpoints and collinear
/// overlaps do not count.
pub fn inner_segments_cross(
    u1: &GenericPoint,
    u2: &GenericPoint,
    v1: &GenericPoint,
    v2: &GenericPoint,
    axis: usize,
) -> bool {
    let o1 = orient2d(u1, u2, v1, axis) as i32;
    let o2 = orient2d(u1, u2, v2, axis) as i32;
    if o1 * o2 >= 0 {
        return false;
    }
    let o3 = orient2d(v1, v2, u1, axis) as i32;
    let o4 = orient2d(v1, v2, u2, axis) as i32;
    o3 * o4 < 0
}

/// Localizes `p` against the projected triangle `a`, `b`, `c`:
/// 2 = interior, 1 = boundary, 0 = outside.
pub fn localized_point_in_triangle(
    p: &GenericPoint,
    a: &GenericPoint,
    b: &GenericPoint,
    c: &GenericPoint,
    axis: usize,
) -> u8 {
    let o1 = orient2d(p, a, b, axis);
    let o2 = orient2d(p, b, c, axis);
    let o3 = orient2d(p, c, a, axis);
    let closed = (o1 >= 0 && o2 >= 0 && o3 >= 0) || (o1 <= 0 && o2 <= 0 && o3 <= 0);
    let open = (o1 > 0 && o2 > 0 && o3 > 0) || (o1 < 0 && o2 < 0 && o3 < 0);
    closed as u8 + open as u8
}

/// True when `p` lies in the projected triangle `a`, `b`, `c`, boundary
/// included.
pub fn point_in_triangle(
    p: &GenericPoint,
    a: &GenericPoint,
    b: &GenericPoint,
    c: &GenericPoint,
    axis: usize,
) -> bool {
    localized_point_in_triangle(p, a, b, c, axis) > 0
}

/// The coordinate axis of the largest absolute component of the triangle
/// normal — the axis to drop so the projection is non-degenerate.
pub fn max_component_in_triangle_normal(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> usize {
    let n = (b - a).cross(&(c - a));
    let (ax, ay, az) = (n.x.abs(), n.y.abs(), n.z.abs());
    if ax >= ay && ax >= az {
        0
    } else if ay >= az {
        1
    } else {
        2
    }
}

/// True when the three points are **not** collinear. Checked exactly on
/// all three axis-aligned projections.
pub fn misaligned(p: &Point3<f64>, q: &Point3<f64>, r: &Point3<f64>) -> bool {
    for axis in 0..3 {
        let (u, v) = proj_axes(axis);
        if robust::orient2d(coord2(p, u, v), coord2(q, u, v), coord2(r, u, v)) != 0.0 {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{LpiPoint, TpiPoint};

    fn ex(x: f64, y: f64, z: f64) -> GenericPoint {
        GenericPoint::explicit(x, y, z)
    }

    fn p3(x: f64, y: f64, z: f64) -> Point3<f64> {
        Point3::new(x, y, z)
    }

    #[test]
    fn orient3d_explicit_signs() {
        let a = p3(0.0, 0.0, 0.0);
        let b = p3(1.0, 0.0, 0.0);
        let c = p3(0.0, 1.0, 0.0);
        assert_eq!(orient3d(&ex(0.0, 0.0, 1.0), &a, &b, &c), -1);
        assert_eq!(orient3d(&ex(0.0, 0.0, -1.0), &a, &b, &c), 1);
        assert_eq!(orient3d(&ex(0.3, 0.3, 0.0), &a, &b, &c), 0);
    }

    #[test]
    fn lpi_on_its_own_plane_is_exactly_coplanar() {
        // The filter cannot certify zero; the rational fallback must.
        let r = p3(0.0, 0.0, 1.0);
        let s = p3(1.0, 0.0, 1.0);
        let t = p3(0.0, 1.0, 1.0);
        let lpi = GenericPoint::Lpi(LpiPoint {
            p: p3(0.1, 0.2, 0.0),
            q: p3(0.3, 0.7, 2.0),
            r,
            s,
            t,
        });
        assert_eq!(orient3d(&lpi, &r, &s, &t), 0);
        // And it is strictly on one side of a parallel plane.
        let r2 = p3(0.0, 0.0, 2.0);
        let s2 = p3(1.0, 0.0, 2.0);
        let t2 = p3(0.0, 1.0, 2.0);
        assert_ne!(orient3d(&lpi, &r2, &s2, &t2), 0);
    }

    #[test]
    fn tpi_on_each_defining_plane() {
        let px = [p3(1.0, 0.0, 0.0), p3(1.0, 1.0, 0.0), p3(1.0, 0.0, 1.0)];
        let py = [p3(0.0, 2.0, 0.0), p3(1.0, 2.0, 0.0), p3(0.0, 2.0, 1.0)];
        let pz = [p3(0.0, 0.0, 3.0), p3(1.0, 0.0, 3.0), p3(0.0, 1.0, 3.0)];
        let tpi = GenericPoint::Tpi(TpiPoint {
            v: px,
            w: py,
            u: pz,
        });
        assert_eq!(orient3d(&tpi, &px[0], &px[1], &px[2]), 0);
        assert_eq!(orient3d(&tpi, &py[0], &py[1], &py[2]), 0);
        assert_eq!(orient3d(&tpi, &pz[0], &pz[1], &pz[2]), 0);
    }

    #[test]
    fn orient2d_projections() {
        // Dropping z: counter-clockwise in (x, y).
        assert_eq!(
            orient2d(&ex(0.0, 0.0, 9.0), &ex(1.0, 0.0, -3.0), &ex(0.0, 1.0, 5.0), 2),
            1
        );
        // Dropping x: the pair is (y, z).
        assert_eq!(
            orient2d(&ex(7.0, 0.0, 0.0), &ex(1.0, 1.0, 0.0), &ex(2.0, 0.0, 1.0), 0),
            1
        );
    }

    #[test]
    fn inner_segment_membership() {
        let a = ex(0.0, 0.0, 0.0);
        let b = ex(2.0, 2.0, 0.0);
        assert!(point_in_inner_segment(&ex(1.0, 1.0, 0.0), &a, &b, 2));
        assert!(!point_in_inner_segment(&a, &a, &b, 2));
        assert!(!point_in_inner_segment(&ex(3.0, 3.0, 0.0), &a, &b, 2));
        assert!(!point_in_inner_segment(&ex(1.0, 0.5, 0.0), &a, &b, 2));
    }

    #[test]
    fn segments_cross_strictly() {
        let u1 = ex(0.0, 0.0, 0.0);
        let u2 = ex(2.0, 2.0, 0.0);
        let v1 = ex(0.0, 2.0, 0.0);
        let v2 = ex(2.0, 0.0, 0.0);
        assert!(inner_segments_cross(&u1, &u2, &v1, &v2, 2));
        // Sharing an endpoint is not a proper crossing.
        assert!(!inner_segments_cross(&u1, &u2, &u1, &v2, 2));
        // Disjoint.
        assert!(!inner_segments_cross(&u1, &u2, &ex(3.0, 0.0, 0.0), &ex(4.0, 1.0, 0.0), 2));
    }

    #[test]
    fn triangle_localization() {
        let a = ex(0.0, 0.0, 0.0);
        let b = ex(4.0, 0.0, 0.0);
        let c = ex(0.0, 4.0, 0.0);
        assert_eq!(localized_point_in_triangle(&ex(1.0, 1.0, 0.0), &a, &b, &c, 2), 2);
        assert_eq!(localized_point_in_triangle(&ex(2.0, 0.0, 0.0), &a, &b, &c, 2), 1);
        assert_eq!(localized_point_in_triangle(&ex(5.0, 5.0, 0.0), &a, &b, &c, 2), 0);
        assert!(point_in_triangle(&ex(2.0, 0.0, 0.0), &a, &b, &c, 2));
        assert!(!point_in_triangle(&ex(-1.0, 0.0, 0.0), &a, &b, &c, 2));
    }

    #[test]
    fn dominant_axis_selection() {
        let axis = max_component_in_triangle_normal(
            &p3(0.0, 0.0, 0.0),
            &p3(1.0, 0.0, 0.0),
            &p3(0.0, 1.0, 0.0),
        );
        assert_eq!(axis, 2);
        let axis = max_component_in_triangle_normal(
            &p3(0.0, 0.0, 0.0),
            &p3(0.0, 1.0, 0.0),
            &p3(0.0, 0.0, 1.0),
        );
        assert_eq!(axis, 0);
    }

    #[test]
    fn misalignment_detects_collinear_triples() {
        assert!(!misaligned(
            &p3(0.0, 0.0, 0.0),
            &p3(1.0, 1.0, 1.0),
            &p3(2.0, 2.0, 2.0)
        ));
        assert!(misaligned(
            &p3(0.0, 0.0, 0.0),
            &p3(1.0, 1.0, 1.0),
            &p3(2.0, 2.0, 3.0)
        ));
    }
}
