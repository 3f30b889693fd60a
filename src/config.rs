/*

    Editor settings, optionally read from a JSON file.
    Every field is optional in the file, missing ones
    fall back to the defaults below.

    e.g.
    {
        "Quality": 8,
        "Strategy": "proximity",
        "ProximityFactor": "0.6",
        "ExportPath": "out/hitboxes.json"
    }

    @date: 8 Nov, 2025
*/

use std::path::{Path, PathBuf};

use crate::error::EditorResult;
use crate::json_parser::{deser_float, deser_usize, deser_vec3, parse_json_file};
use crate::oracle::OracleStrategy;
use crate::prelude::*;


#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(rename_all = "PascalCase")]
#[serde(default)] // If any of the fields below is missing in the JSON, use default
pub struct EditorConfig {
    /// Voxels per axis used when none is given on the command line.
    #[default = 5]
    #[serde(deserialize_with = "deser_usize")]
    pub quality: usize,

    pub strategy: OracleStrategy,

    /// Test sphere radius as a fraction of the smallest cell side.
    #[default = 0.6]
    #[serde(deserialize_with = "deser_float")]
    pub proximity_factor: Float,

    /// Hits closer than this (along one ray) are treated as a single crossing.
    /// Fraction of the model's bounding box diagonal.
    #[default = 1e-7]
    #[serde(deserialize_with = "deser_float")]
    pub hit_merge_tolerance: Float,

    /// Minimum ray distance, hits at or behind the origin are ignored.
    /// Fraction of the model's bounding box diagonal.
    #[default = 1e-9]
    #[serde(deserialize_with = "deser_float")]
    pub ray_epsilon: Float,

    #[default = 4]
    #[serde(deserialize_with = "deser_usize")]
    pub max_leaf_triangles: usize,

    /// Evaluate grid cells with rayon. Results are identical either way.
    #[default = false]
    pub parallel: bool,

    /// Above this quality a warning about the cubic cost is logged.
    #[default = 64]
    #[serde(deserialize_with = "deser_usize")]
    pub quality_warn_threshold: usize,

    #[default(Vector3::new(0.0, 0.5, 0.0))]
    #[serde(deserialize_with = "deser_vec3")]
    pub manual_position: Vector3,

    #[default = 1.2]
    #[serde(deserialize_with = "deser_float")]
    pub manual_label_height: Float,

    /// Gap between the top of an auto hitbox and its label.
    #[default = 0.1]
    #[serde(deserialize_with = "deser_float")]
    pub label_margin: Float,

    #[default(PathBuf::from("hitboxes.json"))]
    pub export_path: PathBuf,
}

impl EditorConfig {
    pub fn load(path: &Path) -> EditorResult<Self> {
        info!("Loading editor config from {:?}...", path);
        let config: EditorConfig = parse_json_file(path)?;
        debug!("Editor config: {:#?}", config);
        Ok(config.sanitized())
    }

    /// Clamp values that would break the pipeline back to usable ones.
    pub fn sanitized(mut self) -> Self {
        if self.quality == 0 {
            warn!("Quality 0 in config, using 1 instead");
            self.quality = 1;
        }
        if self.max_leaf_triangles == 0 {
            warn!("MaxLeafTriangles 0 in config, using 1 instead");
            self.max_leaf_triangles = 1;
        }
        if !(self.proximity_factor.is_finite() && self.proximity_factor >= 0.0) {
            warn!("Invalid ProximityFactor {}, using 0.6", self.proximity_factor);
            self.proximity_factor = 0.6;
        }
        if !(self.hit_merge_tolerance.is_finite() && self.hit_merge_tolerance >= 0.0) {
            warn!("Invalid HitMergeTolerance {}, using 1e-7", self.hit_merge_tolerance);
            self.hit_merge_tolerance = 1e-7;
        }
        if !(self.ray_epsilon.is_finite() && self.ray_epsilon >= 0.0) {
            warn!("Invalid RayEpsilon {}, using 1e-9", self.ray_epsilon);
            self.ray_epsilon = 1e-9;
        }
        self
    }
}
