/*

    Half-line used by the parity containment test.
    A ray only "sees" surfaces ahead of its origin,
    i.e. at t > 0 along the direction.

    @date: Oct, 2025
*/

use crate::prelude::*;


/// +x, -x, +y, -y, +z, -z. The order is the order in which the
/// parity test tries the directions.
pub const AXIS_DIRECTIONS: [Vector3; 6] = [
    Vector3::X,
    Vector3::NEG_X,
    Vector3::Y,
    Vector3::NEG_Y,
    Vector3::Z,
    Vector3::NEG_Z,
];

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

impl Ray {

    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        debug_assert!(direction.is_normalized());
        Self {
            origin,
            direction,
        }
    }

    #[inline]
    pub fn at(&self, t: Float) -> Vector3 {
        self.origin + self.direction * t // r(t) = o + dt
    }
}
