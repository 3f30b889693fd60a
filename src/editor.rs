/*

    Editor session: owns the current model, the hitbox
    collection and the selection, and exposes every action
    the UI host can trigger (load, auto-generate, add, rename,
    select, delete, transform edits, export).

    All actions run synchronously to completion. The redraw
    task only ever reads `EditorState`.

    @date: Nov, 2025
*/

use std::path::Path;

use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult};
use crate::export::ExportDocument;
use crate::hitbox::{Hitbox, HitboxId, Provenance, TransformEdit};
use crate::mesh::Model;
use crate::sampler::{sample, CellSample};
use crate::scene::SceneNode;
use crate::prelude::*;


#[derive(Debug, Default)]
pub struct EditorState {
    pub model: Option<Arc<Model>>,
    pub hitboxes: Vec<Hitbox>,
    pub selected: Option<HitboxId>,
}

impl EditorState {
    pub fn get(&self, id: HitboxId) -> Option<&Hitbox> {
        self.hitboxes.iter().find(|h| h.id == id)
    }

    fn get_mut(&mut self, id: HitboxId) -> Option<&mut Hitbox> {
        self.hitboxes.iter_mut().find(|h| h.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Hitbox> {
        self.hitboxes.iter().find(|h| h.name == name)
    }

    pub fn selected_hitbox(&self) -> Option<&Hitbox> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn is_selected(&self, id: HitboxId) -> bool {
        self.selected == Some(id)
    }

    pub fn names(&self) -> Vec<&str> {
        self.hitboxes.iter().map(|h| h.name.as_str()).collect()
    }

    fn name_taken(&self, name: &str) -> bool {
        self.hitboxes.iter().any(|h| h.name == name)
    }
}


#[derive(Debug, Default)]
pub struct EditorSession {
    pub config: EditorConfig,
    state: EditorState,
    next_id: u64,
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            state: EditorState::default(),
            next_id: 0,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    fn allocate_id(&mut self) -> HitboxId {
        let id = HitboxId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Replace the current model. Indexes are built here, once per load.
    /// Hitboxes are kept, they are independent of the model.
    pub fn load_model(&mut self, root: &SceneNode) -> Arc<Model> {
        if let Some(previous) = &self.state.model {
            info!("Replacing model '{}'", previous.name);
        }
        let model = Arc::new(Model::from_scene(root, self.config.max_leaf_triangles));
        self.state.model = Some(Arc::clone(&model));
        model
    }

    fn require_model(&self) -> EditorResult<Arc<Model>> {
        self.state.model.clone().ok_or(EditorError::NoModel)
    }

    /// Voxelize the current model at `quality` cells per axis and replace every hitbox
    /// with one per accepted cell. Returns the number of hitboxes created.
    pub fn auto_generate(&mut self, quality: usize) -> EditorResult<usize> {
        let model = self.require_model()?;
        if quality == 0 {
            return Err(EditorError::InvalidQuality(quality));
        }

        let span = tracing::span!(tracing::Level::INFO, "auto_generate", quality);
        let _enter = span.enter();

        let _guard = model.begin_pass()?;
        if quality > self.config.quality_warn_threshold {
            warn!("Quality {} means {} cell evaluations, this may take a while.", quality, quality.pow(3));
        }

        let oracle = self.config.strategy.resolve(&model, &self.config);
        info!("Auto-generating hitboxes with {} at quality {}", oracle.name(), quality);

        let cells = sample(&model, quality, oracle.as_ref(), self.config.parallel)?;
        Ok(self.materialize(&cells))
    }

    /// Drop every hitbox (manual ones too), clear the selection, create `auto_<n>`
    /// for each cell in order and select the first one.
    pub fn materialize(&mut self, cells: &[CellSample]) -> usize {
        let removed = self.state.hitboxes.len();
        self.state.hitboxes.clear();
        self.state.selected = None;
        debug!("Removed {} hitboxes before materializing", removed);

        let mut created = Vec::with_capacity(cells.len());
        for (n, cell) in cells.iter().enumerate() {
            let id = self.allocate_id();
            let label_height = cell.cell_size.y / 2.0 + self.config.label_margin;
            created.push(Hitbox::new(id, format!("auto_{}", n), cell.center, cell.cell_size, Provenance::Auto, label_height));
        }
        self.state.hitboxes = created;
        self.state.selected = self.state.hitboxes.first().map(|h| h.id);

        info!("Created {} auto hitboxes", self.state.hitboxes.len());
        self.state.hitboxes.len()
    }

    /// Unit box at the configured default position, named `hitbox_<count>`.
    /// The new box becomes the selection.
    pub fn add_manual(&mut self) -> EditorResult<&Hitbox> {
        self.require_model()?;

        let mut n = self.state.hitboxes.len();
        let mut name = format!("hitbox_{}", n);
        while self.state.name_taken(&name) {
            n += 1;
            name = format!("hitbox_{}", n);
        }

        let id = self.allocate_id();
        let hitbox = Hitbox::new(id, name, self.config.manual_position, Vector3::ONE, Provenance::Manual, self.config.manual_label_height);
        debug!("Adding manual hitbox '{}'", hitbox.name);
        self.state.hitboxes.push(hitbox);
        self.state.selected = Some(id);

        self.state.get(id).ok_or(EditorError::UnknownHitbox(id.0))
    }

    /// Rename `id`. Fails on an empty (after trimming) name or one used by another hitbox.
    pub fn rename(&mut self, id: HitboxId, new_name: &str) -> EditorResult<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(EditorError::InvalidName(new_name.to_string()));
        }
        if self.state.hitboxes.iter().any(|h| h.name == new_name && h.id != id) {
            return Err(EditorError::DuplicateName(new_name.to_string()));
        }
        let hitbox = self.state.get_mut(id).ok_or(EditorError::UnknownHitbox(id.0))?;
        debug!("Renaming '{}' to '{}'", hitbox.name, new_name);
        hitbox.set_name(new_name.to_string());
        Ok(())
    }

    pub fn rename_selected(&mut self, new_name: &str) -> EditorResult<()> {
        let id = self.state.selected.ok_or(EditorError::NoSelection)?;
        self.rename(id, new_name)
    }

    pub fn select(&mut self, id: HitboxId) -> EditorResult<()> {
        if self.state.get(id).is_none() {
            return Err(EditorError::UnknownHitbox(id.0));
        }
        self.state.selected = Some(id);
        Ok(())
    }

    pub fn select_by_name(&mut self, name: &str) -> EditorResult<HitboxId> {
        let id = self.state
            .find_by_name(name)
            .map(|h| h.id)
            .ok_or_else(|| EditorError::InvalidName(name.to_string()))?;
        self.state.selected = Some(id);
        Ok(id)
    }

    pub fn clear_selection(&mut self) {
        self.state.selected = None;
    }

    /// Remove one hitbox. If it was selected, nothing is selected afterwards.
    pub fn delete(&mut self, id: HitboxId) -> EditorResult<Hitbox> {
        let pos = self.state.hitboxes
            .iter()
            .position(|h| h.id == id)
            .ok_or(EditorError::UnknownHitbox(id.0))?;
        if self.state.is_selected(id) {
            self.state.selected = None;
        }
        Ok(self.state.hitboxes.remove(pos))
    }

    /// Apply a transform edit to the selected hitbox.
    pub fn apply_transform_edit(&mut self, edit: &TransformEdit) -> EditorResult<()> {
        let id = self.state.selected.ok_or(EditorError::NoSelection)?;
        let hitbox = self.state.get_mut(id).ok_or(EditorError::UnknownHitbox(id.0))?;
        edit.apply(hitbox);
        Ok(())
    }

    pub fn export(&self) -> ExportDocument {
        ExportDocument::from_hitboxes(&self.state.hitboxes)
    }

    pub fn export_to(&self, path: &Path) -> EditorResult<()> {
        let doc = self.export();
        doc.write(path)?;
        info!("Exported {} hitboxes to {:?}", doc.hitboxes.len(), path);
        Ok(())
    }
}
