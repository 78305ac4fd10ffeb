use crate::assets::frames::Frame;
use crate::foundation::core::LayerId;
use crate::foundation::error::{LoopmaskError, LoopmaskResult};
use crate::foundation::math::wrap_index;
use crate::model::document::Document;
use crate::model::layer::Layer;
use crate::model::mask::DrawingTool;
use crate::render::compositor::RenderOptions;

/// Largest accepted canvas zoom.
pub const MAX_ZOOM: f64 = 64.0;

/// What the editor canvas shows for the active layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RenderMode {
    /// Every layer is drawn through its mask.
    #[default]
    Normal,
    /// The active layer's mask is drawn in place of its masked frame.
    ActiveMask,
}

/// Mask brush configuration.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DrawingSettings {
    pub tool: DrawingTool,
    /// Brush diameter in layer pixels.
    pub stroke_size: f64,
}

impl Default for DrawingSettings {
    fn default() -> Self {
        Self {
            tool: DrawingTool::Brush,
            stroke_size: 40.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlaybackSettings {
    pub render_mode: RenderMode,
    /// Uniform canvas scale, in `(0, MAX_ZOOM]`.
    pub zoom: f64,
    /// Frame cursor, in `[0, frame_count)` whenever the document has frames.
    pub current_frame_index: usize,
    pub playing: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::Normal,
            zoom: 1.0,
            current_frame_index: 0,
            playing: false,
        }
    }
}

/// Complete editor state: the document plus everything needed to present and play it.
///
/// Every transition takes `&self` and returns a new state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EditorState {
    doc: Document,
    draw_settings: DrawingSettings,
    playback: PlaybackSettings,
    active_layer: Option<LayerId>,
}

impl EditorState {
    /// Empty document, paused at frame 0.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(doc: Document) -> Self {
        Self::empty().update_document(doc)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn draw_settings(&self) -> DrawingSettings {
        self.draw_settings
    }

    pub fn playback(&self) -> PlaybackSettings {
        self.playback
    }

    pub fn current_frame_index(&self) -> usize {
        self.playback.current_frame_index
    }

    pub fn is_playing(&self) -> bool {
        self.playback.playing
    }

    pub fn zoom(&self) -> f64 {
        self.playback.zoom
    }

    pub fn active_layer_id(&self) -> Option<LayerId> {
        self.active_layer
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.active_layer.and_then(|id| self.doc.layer(id))
    }

    /// The base layer's frame visible at the current cursor.
    ///
    /// This frame's duration paces playback.
    pub fn current_frame(&self) -> Option<&Frame> {
        self.doc
            .base_layer()?
            .frame_at(self.playback.current_frame_index as u64)
    }

    /// Swap in a new document, keeping the cursor in range and dropping a stale selection.
    pub fn update_document(&self, doc: Document) -> Self {
        let frame_count = doc.frame_count();
        let cursor = wrap_index(
            i64::try_from(self.playback.current_frame_index).unwrap_or(i64::MAX),
            frame_count,
        );
        let active_layer = self.active_layer.filter(|&id| doc.layer(id).is_some());
        Self {
            doc,
            draw_settings: self.draw_settings,
            playback: PlaybackSettings {
                current_frame_index: cursor,
                ..self.playback
            },
            active_layer,
        }
    }

    pub fn update_active_layer(&self, id: LayerId) -> LoopmaskResult<Self> {
        if self.doc.layer(id).is_none() {
            return Err(LoopmaskError::layer(id, "cannot select a missing layer"));
        }
        Ok(Self {
            active_layer: Some(id),
            ..self.clone()
        })
    }

    pub fn update_draw_settings(&self, draw_settings: DrawingSettings) -> Self {
        Self {
            draw_settings,
            ..self.clone()
        }
    }

    pub fn update_playback(&self, playback: PlaybackSettings) -> Self {
        Self {
            playback,
            ..self.clone()
        }
    }

    /// Start or pause playback. Asking for the current state returns an identical state.
    pub fn set_playing(&self, playing: bool) -> Self {
        if playing == self.playback.playing {
            return self.clone();
        }
        self.update_playback(PlaybackSettings {
            playing,
            ..self.playback
        })
    }

    /// Move the cursor to `index`, folded into `[0, frame_count)`.
    ///
    /// Negative indices count back from the end. With no frames the cursor stays at 0.
    pub fn set_active_frame(&self, index: i64) -> Self {
        let current_frame_index = wrap_index(index, self.doc.frame_count());
        self.update_playback(PlaybackSettings {
            current_frame_index,
            ..self.playback
        })
    }

    pub fn advance_frame(&self) -> Self {
        self.step_frames(1)
    }

    /// Move the cursor by `delta` frames, wrapping in both directions.
    pub fn step_frames(&self, delta: i64) -> Self {
        let current = i64::try_from(self.playback.current_frame_index).unwrap_or(i64::MAX);
        self.set_active_frame(current.saturating_add(delta))
    }

    pub fn set_zoom(&self, zoom: f64) -> LoopmaskResult<Self> {
        if !(zoom > 0.0 && zoom <= MAX_ZOOM) {
            return Err(LoopmaskError::validation(format!(
                "zoom must be in (0, {MAX_ZOOM}], got {zoom}"
            )));
        }
        Ok(self.update_playback(PlaybackSettings {
            zoom,
            ..self.playback
        }))
    }

    /// Select `id` and flip mask preview on, or off when it is already previewing `id`.
    pub fn toggle_mask_rendering(&self, id: LayerId) -> LoopmaskResult<Self> {
        let previewing =
            self.active_layer == Some(id) && self.playback.render_mode == RenderMode::ActiveMask;
        let render_mode = if previewing {
            RenderMode::Normal
        } else {
            RenderMode::ActiveMask
        };
        Ok(self.update_active_layer(id)?.update_playback(PlaybackSettings {
            render_mode,
            ..self.playback
        }))
    }

    /// Compositor options for presenting this state: the active layer gets a border, and a
    /// mask preview in [`RenderMode::ActiveMask`].
    pub fn render_options(&self) -> RenderOptions {
        let mut opts = RenderOptions::default();
        if let Some(id) = self.active_layer {
            opts.show_borders_for.insert(id);
            if self.playback.render_mode == RenderMode::ActiveMask {
                opts.mask_preview = Some(id);
            }
        }
        opts
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/state.rs"]
mod tests;
