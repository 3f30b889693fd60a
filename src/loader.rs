/*

    Read model files into a SceneNode tree.

    - .obj: one mesh node per `o` / `g` part under a root group.
            Polygons are fan triangulated, `v/vt/vn` and negative
            (relative) indices are accepted, everything besides
            positions and faces is ignored.
    - .ply: a single mesh node (vertex x y z, face vertex_indices).

    @date: Oct-Nov 2025
*/

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{EditorError, EditorResult};
use crate::scene::{MeshNode, SceneNode};
use crate::prelude::*;


pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["obj", "ply"];

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn load_model(path: &Path) -> EditorResult<SceneNode> {

    let span = tracing::span!(tracing::Level::INFO, "load_model");
    let _enter = span.enter();
    info!("Loading model from {:?}...", path);

    let ext = path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let name = path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model")
        .to_string();

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    match ext.as_str() {
        "obj" => parse_obj(reader, &name),
        "ply" => parse_ply(reader, &name),
        other => Err(EditorError::load(format!("unsupported model extension '{}'", other))),
    }
}


// =======================================================================================================
// Wavefront OBJ
// =======================================================================================================

/// Positions are shared by the whole file, faces belong to the part declared last.
struct ObjPart {
    name: String,
    faces: Vec<[usize; 3]>,
}

impl ObjPart {
    /// Mesh node holding only the positions this part's faces use, faces remapped to them.
    fn into_mesh(self, positions: &[Vector3]) -> MeshNode {
        let mut remap: Vec<Option<usize>> = vec![None; positions.len()];
        let mut used: Vec<Vector3> = Vec::new();
        let faces = self.faces
            .into_iter()
            .map(|face| face.map(|i| {
                *remap[i].get_or_insert_with(|| {
                    used.push(positions[i]);
                    used.len() - 1
                })
            }))
            .collect();
        MeshNode::new(self.name, used, faces)
    }
}

pub fn parse_obj<R: BufRead>(reader: R, name: &str) -> EditorResult<SceneNode> {
    let mut positions: Vec<Vector3> = Vec::new();
    let mut parts: Vec<ObjPart> = Vec::new();
    let mut current = ObjPart { name: name.to_string(), faces: Vec::new() };

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else { continue };
        let rest: Vec<&str> = tokens.collect();

        match keyword {
            "v" => {
                if rest.len() < 3 {
                    return Err(EditorError::load(format!("line {}: vertex needs 3 coordinates", line_no + 1)));
                }
                let coords = rest[..3]
                    .iter()
                    .map(|s| s.parse::<Float>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| EditorError::load(format!("line {}: {}", line_no + 1, e)))?;
                positions.push(Vector3::new(coords[0], coords[1], coords[2]));
            }
            "f" => {
                if rest.len() < 3 {
                    warn!("line {}: face with {} vertices, skipping", line_no + 1, rest.len());
                    continue;
                }
                let polygon = rest
                    .iter()
                    .map(|token| resolve_obj_index(token, positions.len()))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| EditorError::load(format!("line {}: {}", line_no + 1, e)))?;

                for i in 1..polygon.len() - 1 {
                    current.faces.push([polygon[0], polygon[i], polygon[i + 1]]);
                }
            }
            "o" | "g" => {
                let part_name = if rest.is_empty() { name.to_string() } else { rest.join(" ") };
                // Reuse the current part if nothing was added to it yet
                if current.faces.is_empty() {
                    current.name = part_name;
                } else {
                    parts.push(std::mem::replace(&mut current, ObjPart { name: part_name, faces: Vec::new() }));
                }
            }
            _ => {} // vt, vn, usemtl, mtllib, s, ...
        }
    }

    parts.push(current);
    let children: Vec<SceneNode> = parts
        .into_iter()
        .filter(|part| !part.faces.is_empty())
        .map(|part| SceneNode::Mesh(part.into_mesh(&positions)))
        .collect();

    debug!("Parsed OBJ '{}': {} vertices, {} parts", name, positions.len(), children.len());
    Ok(SceneNode::group(name, children))
}

/// "7", "7/1", "7//3", "-1/2/3" -> zero based position index.
fn resolve_obj_index(token: &str, n_positions: usize) -> Result<usize, String> {
    let raw = token.split('/').next().unwrap_or("");
    let idx: i64 = raw.parse().map_err(|_| format!("invalid face index '{}'", token))?;
    let resolved = if idx > 0 {
        idx - 1
    } else if idx < 0 {
        n_positions as i64 + idx
    } else {
        return Err("face index 0 is not valid in OBJ".to_string());
    };
    if resolved < 0 || resolved as usize >= n_positions {
        return Err(format!("face index {} out of range ({} vertices)", idx, n_positions));
    }
    Ok(resolved as usize)
}


// =======================================================================================================
// PLY
// =======================================================================================================

#[derive(Deserialize)]
pub struct PlyVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Deserialize)]
pub struct PlyFace {
    pub vertex_indices: Vec<usize>,
}

#[derive(Deserialize)]
pub struct PlyMesh {
    pub vertex: Vec<PlyVertex>,
    pub face: Option<Vec<PlyFace>>,
}

pub fn parse_ply<R: BufRead>(reader: R, name: &str) -> EditorResult<SceneNode> {
    let plymesh: PlyMesh = serde_ply::from_reader(reader)
        .map_err(|e| EditorError::load(format!("PLY '{}': {}", name, e)))?;

    let positions: Vec<Vector3> = plymesh.vertex
        .iter()
        .map(|v| Vector3::new(v.x as Float, v.y as Float, v.z as Float))
        .collect();

    let mut triangles = Vec::new();
    match &plymesh.face {
        Some(faces) => {
            for face in faces {
                let idx = &face.vertex_indices;
                if idx.len() < 3 {
                    continue;
                }
                for i in 1..idx.len() - 1 {
                    triangles.push([idx[0], idx[i], idx[i + 1]]);
                }
            }
        }
        None => warn!("PLY mesh '{}' has no face data!", name),
    }

    debug!("Parsed PLY '{}': {} vertices, {} triangles", name, positions.len(), triangles.len());
    Ok(SceneNode::group(name, vec![SceneNode::Mesh(MeshNode::new(name, positions, triangles))]))
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const TWO_PARTS: &str = "\
# two parts
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
o base
f 1 2 3 4
g lid
f 1/1/1 -2/2/2 -1/3/3
";

    #[test]
    fn test_obj_parts_and_fans() {
        let root = parse_obj(Cursor::new(TWO_PARTS), "box").unwrap();
        let mut parts = Vec::new();
        root.visit_meshes(&mut |mesh, _| parts.push((mesh.name.clone(), mesh.triangles.clone())));
        assert_eq!(root.name(), "box");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].0, "base");
        assert_eq!(parts[0].1, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(parts[1].0, "lid");
        assert_eq!(parts[1].1, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_obj_parts_keep_only_used_vertices() {
        let root = parse_obj(Cursor::new(TWO_PARTS.to_string() + "v 100 100 100\n"), "box").unwrap();
        let mut meshes = Vec::new();
        root.visit_meshes(&mut |mesh, _| meshes.push(mesh.positions.clone()));
        assert_eq!(meshes[0].len(), 4);
        assert_eq!(meshes[1], vec![Vector3::ZERO, Vector3::new(1., 1., 0.), Vector3::Y]);
        assert!(meshes.iter().flatten().all(|p| p.max_element() <= 1.0));
    }

    #[test]
    fn test_obj_errors() {
        assert!(parse_obj(Cursor::new("v 0 0\n"), "bad").is_err());
        assert!(parse_obj(Cursor::new("v 0 0 0\nf 1 2 3\n"), "bad").is_err());
        assert!(parse_obj(Cursor::new("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n"), "bad").is_err());
    }

    #[test]
    fn test_obj_without_faces_is_empty_group() {
        let root = parse_obj(Cursor::new("v 0 0 0\n"), "points").unwrap();
        assert_eq!(root.mesh_count(), 0);
    }

    #[test]
    fn test_resolve_obj_index() {
        assert_eq!(resolve_obj_index("3", 3), Ok(2));
        assert_eq!(resolve_obj_index("-1//4", 3), Ok(2));
        assert!(resolve_obj_index("4", 3).is_err());
        assert!(resolve_obj_index("x", 3).is_err());
    }

    #[test]
    fn test_supported_extensions() {
        assert!(is_supported(Path::new("a/b/model.OBJ")));
        assert!(is_supported(Path::new("model.ply")));
        assert!(!is_supported(Path::new("model.fbx")));
        assert!(!is_supported(Path::new("model")));
    }
}
