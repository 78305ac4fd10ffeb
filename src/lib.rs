//! Loopmask composites stacks of looping animated GIFs into a single canvas.
//!
//! The bottom layer is the base: it defines the canvas size and paces playback with its own
//! frame delays. Every other layer is positioned and scaled on top of it, can be hidden, and
//! can carry an alpha mask that clips its pixels. The API is value-oriented:
//!
//! - Build a [`Document`] (or load a [`Project`] manifest) and wrap it in an [`EditorState`]
//! - Drive edits through [`Action`]s or the state's own transition methods
//! - Render the current frame with a [`Compositor`] into a [`Surface`]
//! - Advance time with a [`PlaybackLoop`] over a [`StateStore`] and a [`TimerHost`]
#![forbid(unsafe_code)]

mod assets;
mod editor;
mod foundation;
mod model;
mod playback;
mod project;
mod render;

pub use crate::foundation::core::{Canvas, LayerId, Point, Rect, Rgba8Premul, Vec2};
pub use crate::foundation::error::{LoopmaskError, LoopmaskResult};

pub use crate::assets::decode::{decode_animation, decode_mask, load_animation, load_mask};
pub use crate::assets::encode::{encode_animation, save_animation, save_mask};
pub use crate::assets::frames::{Frame, FrameSource, Raster, resolve_frame_index};
pub use crate::editor::action::Action;
pub use crate::editor::state::{
    DrawingSettings, EditorState, MAX_ZOOM, PlaybackSettings, RenderMode,
};
pub use crate::model::document::Document;
pub use crate::model::layer::Layer;
pub use crate::model::mask::{BrushDab, DrawingTool};
pub use crate::playback::clock::{ClockConfig, PlaybackClock, Tick};
pub use crate::playback::driver::{
    EditorStore, PlaybackLoop, StateStore, StopToken, ThreadTimer, TimerHost, VirtualTimer,
};
pub use crate::project::manifest::{LayerDef, Project, ProjectDef};
pub use crate::project::snapshot::PROJECT_FILE;
pub use crate::render::compositor::{
    BORDER_RGBA, Compositor, RenderOptions, border_rect, content_rect,
};
pub use crate::render::surface::{CompositeMode, MAX_SURFACE_DIM, ModeScope, Surface};
