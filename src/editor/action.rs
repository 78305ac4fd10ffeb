use std::sync::Arc;

use crate::assets::frames::FrameSource;
use crate::editor::state::{DrawingSettings, EditorState};
use crate::foundation::core::{LayerId, Point, Vec2};
use crate::foundation::error::LoopmaskResult;
use crate::model::mask::BrushDab;

/// A user or scheduler request against an [`EditorState`].
#[derive(Clone, Debug)]
pub enum Action {
    /// Push a new layer on top and select it.
    AddLayer(Option<Arc<FrameSource>>),
    DeleteLayer(LayerId),
    MoveLayer {
        layer: LayerId,
        index: usize,
    },
    SetLayerFrames {
        layer: LayerId,
        frames: Arc<FrameSource>,
    },
    ToggleLayerVisibility(LayerId),
    ToggleMaskRendering(LayerId),
    SelectLayer(LayerId),
    SetPlaying(bool),
    /// Move the cursor by a signed number of frames.
    IncrementFrame(i64),
    SetActiveFrame(i64),
    SetZoom(f64),
    SetLayerPosition {
        layer: LayerId,
        position: Vec2,
    },
    SetLayerScale {
        layer: LayerId,
        scale: Vec2,
    },
    SetDrawingSettings(DrawingSettings),
    /// Stamp the current brush into a layer mask at a layer-local point.
    PaintMask {
        layer: LayerId,
        at: Point,
    },
}

impl Action {
    /// Short name for logs; avoids dumping pixel buffers through `Debug`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddLayer(_) => "add_layer",
            Self::DeleteLayer(_) => "delete_layer",
            Self::MoveLayer { .. } => "move_layer",
            Self::SetLayerFrames { .. } => "set_layer_frames",
            Self::ToggleLayerVisibility(_) => "toggle_layer_visibility",
            Self::ToggleMaskRendering(_) => "toggle_mask_rendering",
            Self::SelectLayer(_) => "select_layer",
            Self::SetPlaying(_) => "set_playing",
            Self::IncrementFrame(_) => "increment_frame",
            Self::SetActiveFrame(_) => "set_active_frame",
            Self::SetZoom(_) => "set_zoom",
            Self::SetLayerPosition { .. } => "set_layer_position",
            Self::SetLayerScale { .. } => "set_layer_scale",
            Self::SetDrawingSettings(_) => "set_drawing_settings",
            Self::PaintMask { .. } => "paint_mask",
        }
    }
}

impl EditorState {
    /// Apply `action`, reporting why it was refused.
    pub fn try_apply(&self, action: &Action) -> LoopmaskResult<Self> {
        let doc = self.document();
        Ok(match action {
            Action::AddLayer(frames) => {
                let (doc, id) = doc.add_layer(frames.clone());
                self.update_document(doc).update_active_layer(id)?
            }
            Action::DeleteLayer(id) => self.update_document(doc.remove_layer(*id)?),
            Action::MoveLayer { layer, index } => {
                self.update_document(doc.move_layer(*layer, *index)?)
            }
            Action::SetLayerFrames { layer, frames } => {
                self.update_document(doc.set_layer_frames(*layer, Arc::clone(frames))?)
            }
            Action::ToggleLayerVisibility(id) => {
                self.update_document(doc.toggle_layer_visibility(*id)?)
            }
            Action::ToggleMaskRendering(id) => self.toggle_mask_rendering(*id)?,
            Action::SelectLayer(id) => self.update_active_layer(*id)?,
            Action::SetPlaying(playing) => self.set_playing(*playing),
            Action::IncrementFrame(delta) => self.step_frames(*delta),
            Action::SetActiveFrame(index) => self.set_active_frame(*index),
            Action::SetZoom(zoom) => self.set_zoom(*zoom)?,
            Action::SetLayerPosition { layer, position } => {
                self.update_document(doc.set_layer_position(*layer, *position)?)
            }
            Action::SetLayerScale { layer, scale } => {
                self.update_document(doc.set_layer_scale(*layer, *scale)?)
            }
            Action::SetDrawingSettings(settings) => self.update_draw_settings(*settings),
            Action::PaintMask { layer, at } => {
                let settings = self.draw_settings();
                let dab = BrushDab {
                    center: *at,
                    diameter: settings.stroke_size,
                    tool: settings.tool,
                };
                self.update_document(doc.paint_layer_mask(*layer, &dab)?)
            }
        })
    }

    /// Apply `action`; a refused action leaves the state unchanged and is logged.
    pub fn apply(&self, action: &Action) -> Self {
        match self.try_apply(action) {
            Ok(next) => next,
            Err(err) => {
                tracing::warn!(action = action.name(), error = %err, "action rejected");
                self.clone()
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/action.rs"]
mod tests;
