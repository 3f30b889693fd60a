/*

    Triangle level geometric predicates shared by
    the brute-force and the BVH-backed queries:

    - Ray / triangle (Möller-Trumbore, double sided)
    - Closest point on triangle (for sphere overlap)
    - Degenerate triangle detection

    Triangles are given as indices into a positions slice.

    @date: 9 Oct, 2025
*/


use crate::{ray::Ray, interval::Interval};
use crate::prelude::*;

/// Relative tolerance of the triangle predicates. Every threshold below is this
/// fraction of the triangle's own size, so tiny and huge models behave alike.
pub const RELATIVE_EPSILON: Float = 1e-10;

fn longest_edge(a: &Vector3, b: &Vector3, c: &Vector3) -> Float {
    a.distance(*b).max(b.distance(*c)).max(c.distance(*a))
}

/// Return true if any of the two verts at the same position, an index repeats,
/// or the triangle has (numerically) no area compared to its size.
pub fn is_degenerate_triangle(verts: &[Vector3], face: [usize; 3]) -> bool {

    let [a, b, c] = face.map(|i| verts[i]);
    let scale = longest_edge(&a, &b, &c);
    let min_edge = scale * RELATIVE_EPSILON;

    for i in 0..3 {
        for j in (i + 1)..3 {

            let outer = face[i];
            let inner = face[j];
            if outer == inner {
                debug!("Found degenerate triangle where face indices correspond to same vertex. {:?}", face);
                return true;
            }

            if verts[outer].distance(verts[inner]) <= min_edge {
                debug!("Found degenerate triangle with vertices v1: {:?}, v2: {:?}, v3: {:?} ", a, b, c);
                return true;
            }
        }
    }

    let doubled_area = (b - a).cross(c - a).length();
    if !doubled_area.is_finite() || doubled_area <= RELATIVE_EPSILON * scale * scale {
        debug!("Found collinear triangle {:?}", face);
        return true;
    }

    false
}

pub fn moller_trumbore_intersection(ray: &Ray, t_interval: &Interval, tri_indices: [usize; 3], verts: &[Vector3]) -> Option<Float> {
    // Based on Möller-Trumbore algorithm
    //
    //     a (pivot)
    //    / \
    //  b  -  c
    //
    // Both faces are hit, the parity count does not care about winding.

    let [tri_pivot, tri_left, tri_right] = tri_indices.map(|i| verts[i]);
    let edge_ab = tri_left - tri_pivot;
    let edge_ac = tri_right - tri_pivot;
    // Scalar triple product https://youtu.be/fK1RPmF_zjQ
    let perp = ray.direction.cross(edge_ac);
    let determinant: Float = perp.dot(edge_ab);
    // |det| is |sin| of the ray/plane angle times the edge lengths
    let parallel_limit = RELATIVE_EPSILON * edge_ab.length() * edge_ac.length();
    if !determinant.is_finite() || determinant.abs() <= parallel_limit {
        return None;
    }
    let inverse_determinant = 1.0 as Float / determinant;
    let dist = ray.origin - tri_pivot;
    let barycentric_u = dist.dot(perp) * inverse_determinant;
    if !(0.0..=1.0).contains(&barycentric_u) {
        return None;
    }
    let another_perp = dist.cross(edge_ab);
    let barycentric_v = ray.direction.dot(another_perp) * inverse_determinant;
    if (barycentric_v < 0.0) || ((barycentric_u + barycentric_v) > 1.0) {
        return None;
    }
    // Get ray t
    let t = edge_ac.dot(another_perp) * inverse_determinant;
    if !t_interval.contains(t) {
        return None;
    }
    Some(t)
}

/// Find the closest point on triangle abc to p.
/// Region classification from "Real-Time Collision Detection" (Ericson).
pub fn closest_point_on_triangle(p: &Vector3, a: &Vector3, b: &Vector3, c: &Vector3) -> Vector3 {
    let ab = *b - *a;
    let ac = *c - *a;
    let ap = *p - *a;

    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a; // vertex region A
    }

    let bp = *p - *b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b; // vertex region B
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return *a + ab * v; // edge AB
    }

    let cp = *p - *c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c; // vertex region C
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return *a + ac * w; // edge AC
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return *b + (*c - *b) * w; // edge BC
    }

    // face region
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    *a + ab * v + ac * w
}

/// A sphere touches a triangle iff the triangle's closest point lies within the radius.
/// The radius gets a slack relative to the triangle size, so a zero radius still
/// accepts points lying on the triangle up to rounding.
/// Malformed input (NaN from broken vertex data) counts as no intersection.
pub fn sphere_intersects_triangle(center: &Vector3, radius: Float, tri_indices: [usize; 3], verts: &[Vector3]) -> bool {
    let [a, b, c] = tri_indices.map(|i| verts[i]);
    let closest = closest_point_on_triangle(center, &a, &b, &c);
    let dist_sq = closest.distance_squared(*center);
    let reach = radius + RELATIVE_EPSILON * longest_edge(&a, &b, &c);
    dist_sq.is_finite() && dist_sq <= reach * reach
}
