/*

    Loaded model: the scene graph flattened into world-space
    sub-meshes, each carrying its own BVH.

    The index of every sub-mesh is built exactly once, when
    the model is constructed. Sub-meshes that cannot be indexed
    (no triangles, or only degenerate ones) keep `index: None`
    and contribute no intersections to any query.

    @date: Oct-Nov 2025
*/

use std::sync::atomic::{AtomicBool, Ordering};

use crate::acceleration::BVHSubtree;
use crate::bbox::BBox;
use crate::error::{EditorError, EditorResult};
use crate::scene::SceneNode;
use crate::prelude::*;


#[derive(Debug, Clone)]
pub struct SubMesh {
    pub name: String,
    pub positions: Vec<Vector3>,
    pub triangles: Vec<[usize; 3]>,
    pub index: Option<BVHSubtree>,
}

impl SubMesh {
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }
}


#[derive(Debug)]
pub struct Model {
    pub name: String,
    pub submeshes: Vec<SubMesh>,
    busy: AtomicBool,
}

impl Model {

    /// Flatten `root` into world-space sub-meshes and index each of them.
    pub fn from_scene(root: &SceneNode, max_leaf_triangles: usize) -> Self {

        let span = tracing::span!(tracing::Level::INFO, "index_model", model = root.name());
        let _enter = span.enter();

        let mut submeshes = Vec::new();
        root.visit_meshes(&mut |node, world| {
            let positions: Vec<Vector3> = node.positions
                .iter()
                .map(|p| transform_point(world, p))
                .collect();

            let n_verts = positions.len();
            let triangles: Vec<[usize; 3]> = node.triangles
                .iter()
                .copied()
                .filter(|face| face.iter().all(|&i| i < n_verts))
                .collect();
            if triangles.len() != node.triangles.len() {
                warn!("Mesh '{}' has {} faces referencing missing vertices, dropping them.",
                      node.name, node.triangles.len() - triangles.len());
            }

            let index = BVHSubtree::build(&triangles, &positions, max_leaf_triangles);
            match &index {
                Some(bvh) => debug!("Indexed '{}': {} triangles, depth {}", node.name, bvh.triangle_count(), bvh.depth()),
                None => warn!("Mesh '{}' has no indexable geometry, it will be skipped by queries.", node.name),
            }

            submeshes.push(SubMesh {
                name: node.name.clone(),
                positions,
                triangles,
                index,
            });
        });

        info!("Model '{}' loaded with {} sub-meshes ({} indexed).",
              root.name(), submeshes.len(), submeshes.iter().filter(|s| s.is_indexed()).count());

        Self {
            name: root.name().to_string(),
            submeshes,
            busy: AtomicBool::new(false),
        }
    }

    /// World-space bounds of the vertices used by faces, recomputed on each call.
    /// Stray vertices no face references do not stretch the box.
    pub fn bbox(&self) -> BBox {
        BBox::from_points(self.submeshes.iter().flat_map(|s| {
            s.triangles.iter().flatten().filter_map(|&i| s.positions.get(i))
        }))
    }

    pub fn has_index(&self) -> bool {
        self.submeshes.iter().any(SubMesh::is_indexed)
    }

    pub fn triangle_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.triangles.len()).sum()
    }

    /// Claim the model for one auto-generation pass.
    pub fn begin_pass(&self) -> EditorResult<PassGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| EditorError::Busy)?;
        Ok(PassGuard { model: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the model's busy flag when dropped.
#[derive(Debug)]
pub struct PassGuard<'a> {
    model: &'a Model,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.model.busy.store(false, Ordering::Release);
    }
}
