use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::decode::{load_animation, load_mask};
use crate::assets::frames::FrameSource;
use crate::editor::state::{EditorState, MAX_ZOOM};
use crate::foundation::core::Vec2;
use crate::foundation::error::{LoopmaskError, LoopmaskResult};
use crate::model::document::Document;
use crate::playback::clock::ClockConfig;

/// JSON-facing project description. Layers are listed bottom to top; the first is the base.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectDef {
    pub layers: Vec<LayerDef>,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default)]
    pub playing: bool,
    /// Initial playback cursor; wrapped into the document's frame range.
    #[serde(default)]
    pub frame: i64,
    #[serde(default)]
    pub clock: ClockConfig,
}

/// One layer entry. Paths are relative to the assets root passed to [`Project::load`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerDef {
    /// GIF or still image; a layer without a source stays empty until frames are assigned.
    #[serde(default)]
    pub source: Option<PathBuf>,
    #[serde(default)]
    pub position: [f64; 2],
    #[serde(default = "default_scale")]
    pub scale: [f64; 2],
    #[serde(default)]
    pub hidden: bool,
    /// Alpha mask image. Ignored on the base layer.
    #[serde(default)]
    pub mask: Option<PathBuf>,
}

fn default_zoom() -> f64 {
    1.0
}

fn default_scale() -> [f64; 2] {
    [1.0, 1.0]
}

impl LayerDef {
    pub fn from_source(source: impl Into<PathBuf>) -> Self {
        Self {
            source: Some(source.into()),
            position: [0.0, 0.0],
            scale: default_scale(),
            hidden: false,
            mask: None,
        }
    }
}

/// Parsed project manifest.
#[derive(Debug, Clone)]
pub struct Project {
    def: ProjectDef,
}

impl Project {
    pub fn from_reader<R: std::io::Read>(r: R) -> LoopmaskResult<Self> {
        let def: ProjectDef = serde_json::from_reader(r)
            .map_err(|e| LoopmaskError::serde(format!("parse project JSON: {e}")))?;
        Ok(Self { def })
    }

    pub fn from_path(path: impl AsRef<Path>) -> LoopmaskResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            LoopmaskError::validation(format!("open project JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn from_def(def: ProjectDef) -> Self {
        Self { def }
    }

    pub fn def(&self) -> &ProjectDef {
        &self.def
    }

    pub fn clock(&self) -> ClockConfig {
        self.def.clock
    }

    /// Check numeric fields before any asset is touched.
    pub fn validate(&self) -> LoopmaskResult<()> {
        let def = &self.def;
        if !(def.zoom > 0.0 && def.zoom <= MAX_ZOOM) {
            return Err(LoopmaskError::validation(format!(
                "zoom must be in (0, {MAX_ZOOM}], got {}",
                def.zoom
            )));
        }
        for (i, layer) in def.layers.iter().enumerate() {
            if !layer.position.iter().all(|v| v.is_finite()) {
                return Err(LoopmaskError::validation(format!(
                    "layers[{i}].position must be finite"
                )));
            }
            if !layer.scale.iter().all(|v| v.is_finite()) {
                return Err(LoopmaskError::validation(format!(
                    "layers[{i}].scale must be finite"
                )));
            }
            if i == 0 && layer.mask.is_some() {
                tracing::warn!("layers[0] is the base layer; its mask is never applied");
            }
        }
        Ok(())
    }

    /// Decode every referenced asset and build the initial editor state.
    ///
    /// Layers naming the same source path share one decoded [`FrameSource`].
    #[tracing::instrument(skip(self, assets_root), fields(layers = self.def.layers.len()))]
    pub fn load(&self, assets_root: impl AsRef<Path>) -> LoopmaskResult<EditorState> {
        self.validate()?;
        let root = assets_root.as_ref();
        let mut sources: BTreeMap<PathBuf, Arc<FrameSource>> = BTreeMap::new();
        let mut doc = Document::empty();

        for def in &self.def.layers {
            let frames = match &def.source {
                Some(rel) => Some(match sources.entry(root.join(rel)) {
                    Entry::Occupied(e) => Arc::clone(e.get()),
                    Entry::Vacant(e) => {
                        let decoded = Arc::new(load_animation(e.key())?);
                        tracing::debug!(
                            path = %e.key().display(),
                            frames = decoded.frame_count(),
                            "decoded layer source"
                        );
                        Arc::clone(e.insert(decoded))
                    }
                }),
                None => None,
            };
            let mask = def.mask.as_ref().map(|rel| load_mask(root.join(rel))).transpose()?;

            let (next, id) = doc.add_layer(frames);
            doc = next.update_layer(id, |layer| {
                layer
                    .with_position(Vec2::new(def.position[0], def.position[1]))
                    .with_scale(Vec2::new(def.scale[0], def.scale[1]))
                    .with_hidden(def.hidden)
                    .with_mask(mask)
            })?;
        }

        Ok(EditorState::new(doc)
            .set_zoom(self.def.zoom)?
            .set_active_frame(self.def.frame)
            .set_playing(self.def.playing))
    }

    /// Load `path`, falling back to an empty editor state when anything fails.
    pub fn load_or_default(path: impl AsRef<Path>, assets_root: impl AsRef<Path>) -> EditorState {
        let path = path.as_ref();
        match Self::from_path(path).and_then(|p| p.load(assets_root)) {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "project load failed; starting empty");
                EditorState::empty()
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/manifest.rs"]
mod tests;
