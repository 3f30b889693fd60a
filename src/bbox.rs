/*

    Axis Aligned Bounding Box

    Used both as the node volume of the BVH and as the
    world-space bounds of a loaded model (the voxel grid
    is laid over it).

    @date: 9 Nov, 2025
*/


use crate::prelude::*;

use crate::interval::Interval;
use crate::ray::Ray;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min: Vector3,
    pub max: Vector3,
}

impl BBox {

    pub const EMPTY: Self = Self {
        min: Vector3::splat(Float::INFINITY),
        max: Vector3::splat(Float::NEG_INFINITY),
    };

    pub fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    pub fn new_from(xint: &Interval, yint: &Interval, zint: &Interval) -> Self {
        Self {
            min: Vector3::new(xint.min, yint.min, zint.min),
            max: Vector3::new(xint.max, yint.max, zint.max),
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vector3>) -> Self {
        let mut bbox = Self::EMPTY;
        for p in points {
            bbox.expand_point(p);
        }
        bbox
    }

    pub fn expand_point(&mut self, p: &Vector3) {
        self.min = self.min.min(*p);
        self.max = self.max.max(*p);
    }

    pub fn union(&self, other: &BBox) -> BBox {
        BBox::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// True when no point was ever added (any max < min).
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Width, height, depth. Zero vector for an empty box.
    pub fn size(&self) -> Vector3 {
        if self.is_empty() {
            return Vector3::ZERO;
        }
        self.max - self.min
    }

    pub fn center(&self) -> Vector3 {
        (self.min + self.max) * 0.5
    }

    pub fn axis(&self, axis: usize) -> Interval {
        Interval::new(component(&self.min, axis), component(&self.max, axis))
    }

    /// Index of the longest axis (0 = x, 1 = y, 2 = z).
    pub fn longest_axis(&self) -> usize {
        let s = self.size();
        if s.x >= s.y && s.x >= s.z {
            0
        } else if s.y >= s.z {
            1
        } else {
            2
        }
    }

    /// Slab test against the ray restricted to `t_interval`.
    pub fn intersects_ray(&self, ray: &Ray, t_interval: &Interval) -> bool {
        // See slides 03, p.5-6
        if self.is_empty() {
            return false;
        }

        // Axis-aligned rays have zero components, dividing would give 0/0 on the slab planes
        let slab_intersect = |min: Float, max: Float, o: Float, d: Float| -> Interval {
            if d == 0.0 {
                return if min <= o && o <= max { Interval::UNIVERSE } else { Interval::EMPTY };
            }
            let mut t1 = (min - o) / d;
            let mut t2 = (max - o) / d;
            if t2 < t1 {
                std::mem::swap(&mut t1, &mut t2);
            }
            Interval::new(t1, t2)
        };

        let mut t = *t_interval;
        for axis in 0..3 {
            let slab = slab_intersect(
                component(&self.min, axis),
                component(&self.max, axis),
                component(&ray.origin, axis),
                component(&ray.direction, axis),
            );
            t = t.intersection(&slab);
            if !t.validate() {
                return false;
            }
        }
        true
    }

    /// Squared distance from `p` to the closest point of the box, zero inside.
    pub fn distance_squared_to(&self, p: &Vector3) -> Float {
        let clamped = p.max(self.min).min(self.max);
        clamped.distance_squared(*p)
    }

    pub fn intersects_sphere(&self, center: &Vector3, radius: Float) -> bool {
        !self.is_empty() && self.distance_squared_to(center) <= radius * radius
    }
}

pub trait BBoxable {
    fn get_bbox(&self, verts: &[Vector3]) -> BBox;
}

impl BBoxable for [usize; 3] {
    fn get_bbox(&self, verts: &[Vector3]) -> BBox {
        let (mut xint, mut yint, mut zint) = (Interval::EMPTY, Interval::EMPTY, Interval::EMPTY);
        for &i in self { // using & to borrow instead of move
            let v = verts[i];

            xint.expand(v.x);
            yint.expand(v.y);
            zint.expand(v.z);
        }

        BBox::new_from(&xint, &yint, &zint)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::ray::AXIS_DIRECTIONS;

    fn unit_box() -> BBox {
        BBox::new(Vector3::splat(-0.5), Vector3::splat(0.5))
    }

    #[test]
    fn test_from_points() {
        let pts = [Vector3::new(1., -2., 0.), Vector3::new(-1., 3., 0.5)];
        let bbox = BBox::from_points(pts.iter());
        assert_eq!(bbox.min, Vector3::new(-1., -2., 0.));
        assert_eq!(bbox.max, Vector3::new(1., 3., 0.5));
        assert_eq!(bbox.longest_axis(), 1);
        assert!(BBox::from_points([].iter()).is_empty());
        assert_eq!(BBox::EMPTY.size(), Vector3::ZERO);
    }

    #[test]
    fn test_ray_from_inside_hits_in_every_direction() {
        let bbox = unit_box();
        for dir in AXIS_DIRECTIONS {
            let ray = Ray::new(Vector3::ZERO, dir);
            assert!(bbox.intersects_ray(&ray, &Interval::positive(1e-9)));
        }
    }

    #[test]
    fn test_ray_behind_origin_is_rejected() {
        let bbox = unit_box();
        let ray = Ray::new(Vector3::new(10., 0., 0.), Vector3::X);
        assert!(!bbox.intersects_ray(&ray, &Interval::positive(1e-9)));
        let ray = Ray::new(Vector3::new(10., 0., 0.), Vector3::NEG_X);
        assert!(bbox.intersects_ray(&ray, &Interval::positive(1e-9)));
    }

    #[test]
    fn test_ray_against_flat_box() {
        // A triangle lying in the z = 0 plane has a zero-depth box
        let flat = BBox::new(Vector3::new(0., 0., 0.), Vector3::new(1., 1., 0.));
        let ray = Ray::new(Vector3::new(0.5, 0.5, 2.), Vector3::NEG_Z);
        assert!(flat.intersects_ray(&ray, &Interval::positive(1e-9)));
        let ray = Ray::new(Vector3::new(0.5, 0.5, 2.), Vector3::X);
        assert!(!flat.intersects_ray(&ray, &Interval::positive(1e-9)));
    }

    #[test]
    fn test_sphere_overlap() {
        let bbox = unit_box();
        assert!(bbox.intersects_sphere(&Vector3::new(0.55, 0., 0.), 0.1));
        assert!(!bbox.intersects_sphere(&Vector3::new(2., 0., 0.), 0.1));
        assert_eq!(bbox.distance_squared_to(&Vector3::ZERO), 0.0);
    }
}
