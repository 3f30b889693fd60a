
use crate::prelude::*;
use crate::bbox::{BBox, BBoxable};
use crate::geometry::{is_degenerate_triangle, moller_trumbore_intersection, sphere_intersects_triangle};
use crate::interval::Interval;
use crate::ray::Ray;


// ====================================================================================================
// Bounding Volume Hierarchy
// ====================================================================================================
// Binary tree creation is inspired by:
// https://google.github.io/comprehensive-rust/smart-pointers/exercise.html
//
// The tree is built once per loaded sub-mesh over its (world space) triangles
// and is never mutated afterwards. Nodes hold triangle indices, not copies.


/// BVH node storing a bounding box, children, and a list of triangle ids for leaves.
#[derive(Debug)]
pub struct BVHNode {
    pub bbox: BBox,
    pub left: BVHSubtree,
    pub right: BVHSubtree,
    pub triangles: Vec<usize>,
}

/// BVHSubtree is a wrapper around an optional root node.
#[derive(Debug, Clone, Default)]
pub struct BVHSubtree(pub Option<Arc<BVHNode>>);

/// Per-triangle data needed only while building.
struct BuildItem {
    tri: usize,
    bbox: BBox,
    centroid: Vector3,
}

impl BVHSubtree {
    /// Build a BVH over the non-degenerate triangles of a sub-mesh.
    /// Returns `None` when there is nothing to index (empty or fully degenerate geometry).
    pub fn build(triangles: &[[usize; 3]], verts: &[Vector3], max_leaf_triangles: usize) -> Option<Self> {

        let mut items: Vec<BuildItem> = triangles
            .iter()
            .enumerate()
            .filter(|(_, face)| face.iter().all(|&i| i < verts.len()))
            .filter(|(_, face)| !is_degenerate_triangle(verts, **face))
            .map(|(tri, face)| {
                let bbox = face.get_bbox(verts);
                BuildItem { tri, bbox, centroid: bbox.center() }
            })
            .collect();

        if items.is_empty() {
            return None;
        }

        let leaf_size = max_leaf_triangles.max(1);
        Some(Self::build_recursive(&mut items, leaf_size))
    }

    fn build_recursive(items: &mut [BuildItem], leaf_size: usize) -> Self {
        let bbox = items.iter().fold(BBox::EMPTY, |acc, it| acc.union(&it.bbox));

        if items.len() <= leaf_size {
            return BVHSubtree(Some(Arc::new(BVHNode {
                bbox,
                left: BVHSubtree(None),
                right: BVHSubtree(None),
                triangles: items.iter().map(|it| it.tri).collect(),
            })));
        }

        // Split at the median centroid along the longest axis of the centroid bounds.
        // Ties are broken by triangle id so the tree shape is deterministic.
        let centroid_bounds = BBox::from_points(items.iter().map(|it| &it.centroid));
        let axis = centroid_bounds.longest_axis();
        items.sort_by(|a, b| {
            component(&a.centroid, axis)
                .total_cmp(&component(&b.centroid, axis))
                .then(a.tri.cmp(&b.tri))
        });

        let mid = items.len() / 2;
        let (left_items, right_items) = items.split_at_mut(mid);
        let left = Self::build_recursive(left_items, leaf_size);
        let right = Self::build_recursive(right_items, leaf_size);

        BVHSubtree(Some(Arc::new(BVHNode {
            bbox,
            left,
            right,
            triangles: Vec::new(),
        })))
    }

    pub fn bbox(&self) -> Option<BBox> {
        self.0.as_ref().map(|node| node.bbox)
    }

    pub fn triangle_count(&self) -> usize {
        match &self.0 {
            None => 0,
            Some(node) => node.triangles.len() + node.left.triangle_count() + node.right.triangle_count(),
        }
    }

    pub fn depth(&self) -> usize {
        match &self.0 {
            None => 0,
            Some(node) => 1 + node.left.depth().max(node.right.depth()),
        }
    }

    /// True as soon as any indexed triangle touches the sphere.
    pub fn intersects_sphere(&self, center: &Vector3, radius: Float, triangles: &[[usize; 3]], verts: &[Vector3]) -> bool {
        match &self.0 {
            None => false,
            Some(node) => {
                if !node.bbox.intersects_sphere(center, radius) {
                    return false;
                }
                if node.triangles.iter().any(|&tri| sphere_intersects_triangle(center, radius, triangles[tri], verts)) {
                    return true;
                }
                node.left.intersects_sphere(center, radius, triangles, verts)
                    || node.right.intersects_sphere(center, radius, triangles, verts)
            }
        }
    }

    /// Append the distance of every triangle hit within `t_interval` to `hits`.
    /// Hits are not sorted and not merged.
    pub fn ray_hit_distances(&self, ray: &Ray, t_interval: &Interval, triangles: &[[usize; 3]], verts: &[Vector3], hits: &mut Vec<Float>) {
        // Intersection logic follows Slides 03_acceleration_structures p.64
        if let Some(node) = &self.0 {
            if !node.bbox.intersects_ray(ray, t_interval) {
                return; // The ray entirely misses this bounding box
            }
            for &tri in &node.triangles {
                if let Some(t) = moller_trumbore_intersection(ray, t_interval, triangles[tri], verts) {
                    hits.push(t);
                }
            }
            node.left.ray_hit_distances(ray, t_interval, triangles, verts, hits);
            node.right.ray_hit_distances(ray, t_interval, triangles, verts, hits);
        }
    }
}
