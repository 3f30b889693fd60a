/*

    Exported hitbox document:

    {
      "hitboxes": [
        { "name": "auto_0", "size": [w, h, d], "rel_pos": [x, y, z] },
        ...
      ]
    }

    WARNING: despite its name `rel_pos` is the absolute scene-space
    position of the hitbox, not relative to the model. Downstream
    consumers already read it that way, so it is kept as is.

    @date: Nov, 2025
*/

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::EditorResult;
use crate::hitbox::Hitbox;
use crate::prelude::*;


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitboxRecord {
    pub name: String,
    pub size: [Float; 3],
    pub rel_pos: [Float; 3],
}

impl From<&Hitbox> for HitboxRecord {
    fn from(hitbox: &Hitbox) -> Self {
        Self {
            name: hitbox.name.clone(),
            size: hitbox.size.to_array(),
            rel_pos: hitbox.position.to_array(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub hitboxes: Vec<HitboxRecord>,
}

impl ExportDocument {
    /// One record per hitbox, in collection order.
    pub fn from_hitboxes(hitboxes: &[Hitbox]) -> Self {
        Self {
            hitboxes: hitboxes.iter().map(HitboxRecord::from).collect(),
        }
    }

    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> EditorResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn write(&self, path: &Path) -> EditorResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
