/*

    Redraw loop between the editor state and a render host.

    One iteration per display refresh: snapshot the current
    hitbox transforms into a Frame and hand it to the host.
    The task only reads EditorState, it never mutates hitboxes
    or the model and never triggers generation.

    Cancelling is done through a shared token so the host
    (or another thread) can stop the loop between frames.

    @date: Nov, 2025
*/

use std::sync::atomic::{AtomicBool, Ordering};

use crate::editor::EditorState;
use crate::hitbox::{HitboxId, Label, COLOR_IDLE, COLOR_SELECTED};
use crate::prelude::*;


#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub id: HitboxId,
    pub position: Vector3,
    pub rotation: Vector3,
    pub scale: Vector3,
    pub size: Vector3,
    pub label: Label,
    pub color: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub number: u64,
    pub items: Vec<DrawItem>,
}

impl Frame {
    pub fn snapshot(number: u64, state: &EditorState) -> Self {
        let items = state.hitboxes
            .iter()
            .map(|h| DrawItem {
                id: h.id,
                position: h.position,
                rotation: h.rotation,
                scale: h.scale,
                size: h.size,
                label: h.label.clone(),
                color: if state.is_selected(h.id) { COLOR_SELECTED } else { COLOR_IDLE },
            })
            .collect();
        Self { number, items }
    }
}

pub trait RenderHost {
    /// Draw one frame. Returning false asks the task to stop (e.g. window closed).
    fn present(&mut self, frame: &Frame) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Default)]
pub struct RedrawTask {
    token: CancelToken,
    frames: u64,
}

impl RedrawTask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }

    /// Run a single iteration. Returns false once the task is cancelled.
    pub fn tick<H: RenderHost>(&mut self, state: &EditorState, host: &mut H) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        let frame = Frame::snapshot(self.frames, state);
        self.frames += 1;
        if !host.present(&frame) {
            debug!("Render host asked to stop after frame {}", frame.number);
            self.token.cancel();
            return false;
        }
        true
    }

    /// Tick until cancelled, or until `max_frames` frames were drawn when given.
    pub fn run<H: RenderHost>(&mut self, state: &EditorState, host: &mut H, max_frames: Option<u64>) {
        while max_frames.is_none_or(|max| self.frames < max) {
            if !self.tick(state, host) {
                break;
            }
        }
    }
}
