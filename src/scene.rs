/*

    Declare the scene graph handed over by a model loader.

    The node kinds are a closed set: Group, Mesh and Other
    (lights, cameras, helpers... anything without triangles).
    Walking the graph is done through `visit_meshes`, which
    accumulates world transforms and matches every kind
    explicitly so adding a kind forces a decision here.

    @date: 2 Oct, 2025
*/

use crate::prelude::*;


#[derive(Debug, Clone, SmartDefault)]
pub struct MeshNode {
    pub name: String,
    #[default(Matrix4::IDENTITY)]
    pub transform: Matrix4,
    pub positions: Vec<Vector3>,
    pub triangles: Vec<[usize; 3]>,
}

impl MeshNode {
    pub fn new(name: impl Into<String>, positions: Vec<Vector3>, triangles: Vec<[usize; 3]>) -> Self {
        Self {
            name: name.into(),
            transform: Matrix4::IDENTITY,
            positions,
            triangles,
        }
    }

    pub fn with_transform(mut self, transform: Matrix4) -> Self {
        self.transform = transform;
        self
    }

    pub fn has_geometry(&self) -> bool {
        !self.positions.is_empty() && !self.triangles.is_empty()
    }
}


#[derive(Debug, Clone)]
pub enum SceneNode {
    Group {
        name: String,
        transform: Matrix4,
        children: Vec<SceneNode>,
    },
    Mesh(MeshNode),
    Other {
        name: String,
    },
}

impl SceneNode {
    pub fn group(name: impl Into<String>, children: Vec<SceneNode>) -> Self {
        SceneNode::Group {
            name: name.into(),
            transform: Matrix4::IDENTITY,
            children,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SceneNode::Group { name, .. } => name,
            SceneNode::Mesh(mesh) => &mesh.name,
            SceneNode::Other { name } => name,
        }
    }

    /// Call `f` for every mesh node in depth-first order with its world transform.
    pub fn visit_meshes<F>(&self, f: &mut F)
    where
        F: FnMut(&MeshNode, &Matrix4),
    {
        self.visit_meshes_with(&Matrix4::IDENTITY, f);
    }

    fn visit_meshes_with<F>(&self, parent: &Matrix4, f: &mut F)
    where
        F: FnMut(&MeshNode, &Matrix4),
    {
        match self {
            SceneNode::Group { transform, children, .. } => {
                let world = *parent * *transform;
                for child in children {
                    child.visit_meshes_with(&world, f);
                }
            }
            SceneNode::Mesh(mesh) => {
                let world = *parent * mesh.transform;
                f(mesh, &world);
            }
            SceneNode::Other { name } => {
                debug!("Skipping non-mesh node '{}'", name);
            }
        }
    }

    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.visit_meshes(&mut |_, _| count += 1);
        count
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visit_accumulates_transforms() {
        let tri = MeshNode::new("tri", vec![Vector3::ZERO, Vector3::X, Vector3::Y], vec![[0, 1, 2]])
            .with_transform(Matrix4::from_translation(Vector3::new(0., 1., 0.)));
        let root = SceneNode::Group {
            name: "root".into(),
            transform: Matrix4::from_translation(Vector3::new(2., 0., 0.)),
            children: vec![
                SceneNode::Other { name: "light".into() },
                SceneNode::group("inner", vec![SceneNode::Mesh(tri)]),
            ],
        };

        let mut seen = Vec::new();
        root.visit_meshes(&mut |mesh, world| {
            seen.push((mesh.name.clone(), transform_point(world, &mesh.positions[0])));
        });
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "tri");
        assert!(approx_zero((seen[0].1 - Vector3::new(2., 1., 0.)).length()));
        assert_eq!(root.mesh_count(), 1);
        assert_eq!(root.name(), "root");
    }

    #[test]
    fn test_default_mesh_node_is_empty() {
        let node = MeshNode::default();
        assert!(!node.has_geometry());
        assert_eq!(node.transform, Matrix4::IDENTITY);
    }
}
