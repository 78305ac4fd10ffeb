use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::assets::encode::{save_animation, save_mask};
use crate::assets::frames::FrameSource;
use crate::editor::state::EditorState;
use crate::foundation::error::{LoopmaskError, LoopmaskResult};
use crate::playback::clock::ClockConfig;
use crate::project::manifest::{LayerDef, Project, ProjectDef};

/// File name [`Project::snapshot`] writes the manifest to.
pub const PROJECT_FILE: &str = "project.json";

impl Project {
    /// Serialize the manifest as pretty JSON.
    pub fn to_writer<W: Write>(&self, w: W) -> LoopmaskResult<()> {
        serde_json::to_writer_pretty(w, self.def())
            .map_err(|e| LoopmaskError::serde(format!("write project JSON: {e}")))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> LoopmaskResult<()> {
        let path = path.as_ref();
        let f = File::create(path)
            .with_context(|| format!("create project JSON '{}'", path.display()))?;
        let mut w = BufWriter::new(f);
        self.to_writer(&mut w)?;
        w.flush()
            .with_context(|| format!("flush project JSON '{}'", path.display()))?;
        Ok(())
    }

    /// Write `state` into `dir` as a self-contained project and return its manifest.
    ///
    /// Each distinct animation is written once as `source_<n>.gif`, each painted mask as
    /// `mask_<n>.png` (n = stack index) and the manifest as [`PROJECT_FILE`]. Loading the
    /// result with `dir` as assets root restores layer order, geometry, visibility, masks,
    /// zoom, cursor and play state. Layer ids are reassigned on load.
    #[tracing::instrument(skip(state, clock, dir), fields(layers = state.document().len()))]
    pub fn snapshot(
        state: &EditorState,
        clock: ClockConfig,
        dir: impl AsRef<Path>,
    ) -> LoopmaskResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create snapshot dir '{}'", dir.display()))?;

        let mut written: Vec<(Arc<FrameSource>, PathBuf)> = Vec::new();
        let mut layers = Vec::with_capacity(state.document().len());
        for (index, layer) in state.document().layers().iter().enumerate() {
            let source = match layer.frames() {
                Some(frames) if frames.frame_count() == 0 => {
                    tracing::warn!(layer = %layer.id(), "animation without frames is not saved");
                    None
                }
                Some(frames) => Some(match written.iter().find(|(f, _)| Arc::ptr_eq(f, frames)) {
                    Some((_, name)) => name.clone(),
                    None => {
                        let name = PathBuf::from(format!("source_{}.gif", written.len()));
                        save_animation(frames, dir.join(&name))?;
                        written.push((Arc::clone(frames), name.clone()));
                        name
                    }
                }),
                None => None,
            };

            let mask = match layer.mask() {
                Some(mask) if !mask.is_empty() => {
                    let name = PathBuf::from(format!("mask_{index}.png"));
                    save_mask(mask, dir.join(&name))?;
                    Some(name)
                }
                _ => None,
            };

            layers.push(LayerDef {
                source,
                position: [layer.position().x, layer.position().y],
                scale: [layer.scale().x, layer.scale().y],
                hidden: layer.is_hidden(),
                mask,
            });
        }

        let project = Self::from_def(ProjectDef {
            layers,
            zoom: state.zoom(),
            playing: state.is_playing(),
            frame: i64::try_from(state.current_frame_index()).unwrap_or(i64::MAX),
            clock,
        });
        project.save(dir.join(PROJECT_FILE))?;
        tracing::debug!(dir = %dir.display(), sources = written.len(), "wrote snapshot");
        Ok(project)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/project/snapshot.rs"]
mod tests;
