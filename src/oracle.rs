/*

    Point classification against a loaded model.

    Two interchangeable strategies sit behind `ContainmentOracle`:

    - RayParity:    the point is interior if, for ANY of the six
                    axis directions, a ray from the point crosses
                    the surface an odd number of times.
    - BvhProximity: the point is accepted if a sphere around it
                    touches any indexed triangle (a one voxel thick
                    shell around the surface).

    Neither strategy fails: missing geometry, unindexed sub-meshes
    and NaN inputs all simply mean "not accepted".

    NOTE: "odd in any one direction" is a heuristic, not a proof of
    interiority. It is cheap and robust against a ray that grazes an
    edge, but meshes with holes or several shells can be misclassified.

    @date: Nov, 2025
*/

use std::fmt::Debug;

use crate::config::EditorConfig;
use crate::geometry::moller_trumbore_intersection;
use crate::interval::Interval;
use crate::mesh::{Model, SubMesh};
use crate::ray::{Ray, AXIS_DIRECTIONS};
use crate::sampler::GridSpec;
use crate::prelude::*;


// =======================================================================================================
// ContainmentOracle Trait
// =======================================================================================================
pub trait ContainmentOracle : Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Decide whether the grid cell centered at `point` becomes a hitbox.
    fn accepts(&self, point: &Vector3, grid: &GridSpec, model: &Model) -> bool;
}

pub type HeapAllocatedOracle = Box<dyn ContainmentOracle>;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleStrategy {
    /// Proximity when the model carries at least one index, ray parity otherwise.
    #[default]
    Auto,
    RayParity,
    Proximity,
}

impl OracleStrategy {
    pub fn resolve(self, model: &Model, config: &EditorConfig) -> HeapAllocatedOracle {
        let strategy = match self {
            OracleStrategy::Auto if model.has_index() => OracleStrategy::Proximity,
            OracleStrategy::Auto => OracleStrategy::RayParity,
            other => other,
        };
        match strategy {
            OracleStrategy::Proximity => Box::new(BvhProximity::new(config.proximity_factor)),
            _ => {
                // Tolerances are configured relative to the model size
                let scale = model.bbox().size().length();
                Box::new(RayParity::new(config.ray_epsilon * scale, config.hit_merge_tolerance * scale))
            }
        }
    }
}


// =======================================================================================================
// RayParity (impl ContainmentOracle)
// =======================================================================================================
#[derive(Debug, Clone, SmartDefault)]
pub struct RayParity {
    #[default = 1e-9]
    pub epsilon: Float,
    #[default = 1e-7]
    pub merge_tolerance: Float,
    /// Traverse each sub-mesh's BVH (true) or test every triangle (false).
    #[default = true]
    pub use_index: bool,
}

impl RayParity {
    pub fn new(epsilon: Float, merge_tolerance: Float) -> Self {
        Self { epsilon, merge_tolerance, use_index: true }
    }

    pub fn brute_force(epsilon: Float, merge_tolerance: Float) -> Self {
        Self { epsilon, merge_tolerance, use_index: false }
    }

    /// Parity test along the six axis directions, true on the first odd count.
    pub fn is_inside(&self, point: &Vector3, submeshes: &[SubMesh]) -> bool {
        if !is_finite_vec(point) {
            return false;
        }
        AXIS_DIRECTIONS
            .iter()
            .any(|dir| self.crossings(&Ray::new(*point, *dir), submeshes) % 2 == 1)
    }

    /// Number of surface crossings ahead of the ray origin, over every indexed sub-mesh.
    pub fn crossings(&self, ray: &Ray, submeshes: &[SubMesh]) -> usize {
        let t_interval = Interval::positive(self.epsilon);
        let mut hits: Vec<Float> = Vec::new();

        for submesh in submeshes {
            let Some(bvh) = &submesh.index else {
                continue; // nothing indexable, contributes no intersections
            };
            if self.use_index {
                bvh.ray_hit_distances(ray, &t_interval, &submesh.triangles, &submesh.positions, &mut hits);
            } else {
                hits.extend(submesh.triangles.iter().filter_map(|&tri| {
                    moller_trumbore_intersection(ray, &t_interval, tri, &submesh.positions)
                }));
            }
        }

        count_distinct_hits(&mut hits, self.merge_tolerance)
    }
}

/// A ray through a shared edge or vertex hits every adjacent triangle at the same t,
/// yet crosses the surface once. Hits closer than `tolerance` count as one.
fn count_distinct_hits(hits: &mut [Float], tolerance: Float) -> usize {
    if hits.is_empty() {
        return 0;
    }
    hits.sort_by(|a, b| a.total_cmp(b));
    1 + hits.windows(2).filter(|w| w[1] - w[0] > tolerance).count()
}

impl ContainmentOracle for RayParity {
    fn name(&self) -> &'static str {
        "ray_parity"
    }

    fn accepts(&self, point: &Vector3, _grid: &GridSpec, model: &Model) -> bool {
        self.is_inside(point, &model.submeshes)
    }
}


// =======================================================================================================
// BvhProximity (impl ContainmentOracle)
// =======================================================================================================
#[derive(Debug, Clone, SmartDefault)]
pub struct BvhProximity {
    /// Sphere radius as a fraction of the smallest cell side. 0.6 lets the spheres of
    /// neighbouring cells overlap near the surface without reaching the next center.
    #[default = 0.6]
    pub factor: Float,
}

impl BvhProximity {
    pub fn new(factor: Float) -> Self {
        Self { factor }
    }

    pub fn radius_for(&self, cell_size: &Vector3) -> Float {
        self.factor * cell_size.min_element()
    }

    /// True on the first sub-mesh whose index reports a triangle within `radius`.
    pub fn is_near_surface(point: &Vector3, radius: Float, submeshes: &[SubMesh]) -> bool {
        if !is_finite_vec(point) || !radius.is_finite() || radius < 0.0 {
            return false;
        }
        submeshes.iter().any(|submesh| match &submesh.index {
            Some(bvh) => bvh.intersects_sphere(point, radius, &submesh.triangles, &submesh.positions),
            None => false,
        })
    }
}

impl ContainmentOracle for BvhProximity {
    fn name(&self) -> &'static str {
        "bvh_proximity"
    }

    fn accepts(&self, point: &Vector3, grid: &GridSpec, model: &Model) -> bool {
        Self::is_near_surface(point, self.radius_for(&grid.cell_size), &model.submeshes)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MeshNode, SceneNode};

    /// Unit cube centered at the origin, 12 outward facing triangles.
    fn unit_cube() -> Model {
        let h = 0.5;
        let positions = vec![
            Vector3::new(-h, -h, -h), Vector3::new(h, -h, -h),
            Vector3::new(h, h, -h), Vector3::new(-h, h, -h),
            Vector3::new(-h, -h, h), Vector3::new(h, -h, h),
            Vector3::new(h, h, h), Vector3::new(-h, h, h),
        ];
        let triangles = vec![
            [0, 2, 1], [0, 3, 2], // -z
            [4, 5, 6], [4, 6, 7], // +z
            [0, 1, 5], [0, 5, 4], // -y
            [3, 7, 6], [3, 6, 2], // +y
            [0, 4, 7], [0, 7, 3], // -x
            [1, 2, 6], [1, 6, 5], // +x
        ];
        let root = SceneNode::group("cube", vec![SceneNode::Mesh(MeshNode::new("cube", positions, triangles))]);
        Model::from_scene(&root, 2)
    }

    #[test]
    fn test_ray_parity_on_cube() {
        let cube = unit_cube();
        let oracle = RayParity::default();
        assert!(oracle.is_inside(&Vector3::ZERO, &cube.submeshes));
        assert!(oracle.is_inside(&Vector3::new(0.2, -0.3, 0.1), &cube.submeshes));
        for dir in AXIS_DIRECTIONS {
            assert!(!oracle.is_inside(&(dir * 10.0), &cube.submeshes), "outside along {:?}", dir);
        }
    }

    #[test]
    fn test_ray_through_shared_edge_counts_once() {
        let cube = unit_cube();
        let oracle = RayParity::default();
        // From the center every axis ray hits a face on its diagonal
        let ray = Ray::new(Vector3::ZERO, Vector3::X);
        assert_eq!(oracle.crossings(&ray, &cube.submeshes), 1);
        let ray = Ray::new(Vector3::new(-10., 0., 0.), Vector3::X);
        assert_eq!(oracle.crossings(&ray, &cube.submeshes), 2);
    }

    #[test]
    fn test_index_and_brute_force_agree() {
        let cube = unit_cube();
        let indexed = RayParity::default();
        let brute = RayParity::brute_force(1e-9, 1e-7);
        let probes = [
            Vector3::ZERO,
            Vector3::new(0.49, 0.1, -0.2),
            Vector3::new(0.6, 0.1, -0.2),
            Vector3::new(-3., 2., 1.),
        ];
        for p in probes {
            assert_eq!(indexed.is_inside(&p, &cube.submeshes), brute.is_inside(&p, &cube.submeshes));
        }
    }

    #[test]
    fn test_near_surface_on_cube() {
        let cube = unit_cube();
        assert!(BvhProximity::is_near_surface(&Vector3::new(0.55, 0., 0.), 0.1, &cube.submeshes));
        assert!(!BvhProximity::is_near_surface(&Vector3::new(2.5, 0., 0.), 0.1, &cube.submeshes));
        // deep inside is not near the surface
        assert!(!BvhProximity::is_near_surface(&Vector3::ZERO, 0.1, &cube.submeshes));
    }

    #[test]
    fn test_no_geometry_never_accepts() {
        let empty = Model::from_scene(&SceneNode::group("empty", vec![]), 4);
        assert!(!RayParity::default().is_inside(&Vector3::ZERO, &empty.submeshes));
        assert!(!BvhProximity::is_near_surface(&Vector3::ZERO, 1.0, &empty.submeshes));
    }

    #[test]
    fn test_nan_point_rejected() {
        let cube = unit_cube();
        let nan = Vector3::new(Float::NAN, 0., 0.);
        assert!(!RayParity::default().is_inside(&nan, &cube.submeshes));
        assert!(!BvhProximity::is_near_surface(&nan, 0.1, &cube.submeshes));
    }

    #[test]
    fn test_radius_from_cell_size() {
        let oracle = BvhProximity::default();
        let r = oracle.radius_for(&Vector3::new(1.0, 0.5, 2.0));
        assert!(approx_zero(r - 0.3));
    }

    #[test]
    fn test_strategy_resolution() {
        let config = EditorConfig::default();
        let cube = unit_cube();
        assert_eq!(OracleStrategy::Auto.resolve(&cube, &config).name(), "bvh_proximity");
        assert_eq!(OracleStrategy::RayParity.resolve(&cube, &config).name(), "ray_parity");
        let empty = Model::from_scene(&SceneNode::group("empty", vec![]), 4);
        assert_eq!(OracleStrategy::Auto.resolve(&empty, &config).name(), "ray_parity");
        assert_eq!(OracleStrategy::Proximity.resolve(&empty, &config).name(), "bvh_proximity");
    }

    #[test]
    fn test_parity_on_tiny_cube() {
        let h = 0.5e-6;
        let positions = unit_cube().submeshes[0].positions.iter().map(|p| *p * 1e-6).collect();
        let triangles = unit_cube().submeshes[0].triangles.clone();
        let root = SceneNode::group("tiny", vec![SceneNode::Mesh(MeshNode::new("tiny", positions, triangles))]);
        let tiny = Model::from_scene(&root, 2);
        assert!(tiny.has_index());

        let config = EditorConfig::default();
        let scale = tiny.bbox().size().length();
        let oracle = RayParity::new(config.ray_epsilon * scale, config.hit_merge_tolerance * scale);
        assert!(oracle.is_inside(&Vector3::ZERO, &tiny.submeshes));
        assert!(oracle.is_inside(&Vector3::new(0.4 * h, -0.2 * h, 0.1 * h), &tiny.submeshes));
        assert!(!oracle.is_inside(&Vector3::new(3. * h, 0., 0.), &tiny.submeshes));
    }

    #[test]
    fn test_count_distinct_hits() {
        let mut hits = vec![0.5, 0.5 + 1e-12, 1.5, 0.5];
        assert_eq!(count_distinct_hits(&mut hits, 1e-7), 2);
        assert_eq!(count_distinct_hits(&mut [], 1e-7), 0);
    }
}
