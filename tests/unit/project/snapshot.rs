use super::*;
use crate::assets::frames::{Frame, Raster};
use crate::editor::action::Action;
use crate::foundation::core::{Point, Rgba8Premul, Vec2};
use crate::model::document::Document;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "loopmask_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn source(w: u32, h: u32, colors: &[(Rgba8Premul, u32)]) -> Arc<FrameSource> {
    let frames = colors
        .iter()
        .map(|&(px, duration)| Frame {
            raster: Raster::filled(w, h, px),
            duration,
        })
        .collect();
    Arc::new(FrameSource::new(w, h, frames))
}

fn alpha(raster: &Raster) -> Vec<u8> {
    raster.as_bytes().chunks_exact(4).map(|p| p[3]).collect()
}

/// Base (3 frames), a masked and moved overlay, and a hidden layer sharing the base's frames.
fn edited_state() -> EditorState {
    let base = source(
        8,
        6,
        &[
            (Rgba8Premul::opaque(255, 0, 0), 3),
            (Rgba8Premul::opaque(0, 255, 0), 6),
            (Rgba8Premul::opaque(0, 0, 255), 3),
        ],
    );
    let sprite = source(4, 4, &[(Rgba8Premul::opaque(255, 255, 0), 5)]);

    let (doc, _) = Document::empty().add_layer(Some(Arc::clone(&base)));
    let (doc, top) = doc.add_layer(Some(sprite));
    let (doc, ghost) = doc.add_layer(Some(base));
    let doc = doc
        .set_layer_position(top, Vec2::new(2.5, 1.0))
        .unwrap()
        .set_layer_scale(top, Vec2::new(-1.0, 0.5))
        .unwrap()
        .toggle_layer_visibility(ghost)
        .unwrap();

    EditorState::new(doc)
        .apply(&Action::SelectLayer(top))
        .apply(&Action::PaintMask {
            layer: top,
            at: Point::new(1.5, 1.5),
        })
        .set_zoom(2.0)
        .unwrap()
        .set_active_frame(2)
        .set_playing(true)
}

#[test]
fn snapshot_round_trips_through_load() {
    let dir = temp_dir("snapshot");
    let state = edited_state();
    let clock = ClockConfig {
        fallback_delay_ms: 45,
        ..ClockConfig::default()
    };

    let project = Project::snapshot(&state, clock, &dir).unwrap();
    let reread = Project::from_path(dir.join(PROJECT_FILE)).unwrap();
    assert_eq!(reread.def(), project.def());
    assert_eq!(reread.clock(), clock);

    let loaded = reread.load(&dir).unwrap();
    assert_eq!(loaded.zoom(), 2.0);
    assert_eq!(loaded.current_frame_index(), 2);
    assert!(loaded.is_playing());

    let before = state.document();
    let after = loaded.document();
    assert_eq!(after.len(), before.len());
    assert_eq!(after.canvas(), before.canvas());
    for (a, b) in after.layers().iter().zip(before.layers()) {
        assert_eq!(a.position(), b.position());
        assert_eq!(a.scale(), b.scale());
        assert_eq!(a.is_hidden(), b.is_hidden());
        assert_eq!(a.frame_count(), b.frame_count());
        assert_eq!(a.mask().map(alpha), b.mask().map(alpha));
    }

    let base = after.layers()[0].frames().unwrap();
    let durations: Vec<u32> = base.frames().iter().map(|f| f.duration).collect();
    assert_eq!(durations, vec![3, 6, 3]);
    assert_eq!(
        base.frame(1).unwrap().raster.pixel(7, 5),
        Some(Rgba8Premul::opaque(0, 255, 0).to_array())
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn shared_sources_are_written_once() {
    let dir = temp_dir("snapshot_shared");
    let project = Project::snapshot(&edited_state(), ClockConfig::default(), &dir).unwrap();

    let layers = &project.def().layers;
    assert_eq!(layers[0].source, layers[2].source);
    assert_ne!(layers[0].source, layers[1].source);
    assert_eq!(layers[1].mask, Some(PathBuf::from("mask_1.png")));
    assert_eq!(layers[0].mask, None);

    let gifs = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|x| x == "gif"))
        .count();
    assert_eq!(gifs, 2);

    let loaded = project.load(&dir).unwrap();
    let doc = loaded.document();
    assert!(Arc::ptr_eq(
        doc.layers()[0].frames().unwrap(),
        doc.layers()[2].frames().unwrap()
    ));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn layers_without_frames_save_without_a_source() {
    let dir = temp_dir("snapshot_empty_layer");
    let still = source(2, 2, &[(Rgba8Premul::opaque(1, 2, 3), 4)]);
    let (doc, _) = Document::empty().add_layer(Some(still));
    let (doc, _) = doc.add_layer(None);
    let (doc, _) = doc.add_layer(Some(Arc::new(FrameSource::new(2, 2, Vec::new()))));

    let project = Project::snapshot(&EditorState::new(doc), ClockConfig::default(), &dir).unwrap();
    assert!(project.def().layers[0].source.is_some());
    assert_eq!(project.def().layers[1].source, None);
    assert_eq!(project.def().layers[2].source, None);
    assert_eq!(project.load(&dir).unwrap().document().len(), 3);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn to_writer_emits_parseable_json() {
    let project = Project::from_def(ProjectDef {
        layers: vec![LayerDef::from_source("a.gif")],
        zoom: 3.0,
        playing: true,
        frame: -2,
        clock: ClockConfig::default(),
    });
    let mut buf = Vec::new();
    project.to_writer(&mut buf).unwrap();
    let back = Project::from_reader(std::io::Cursor::new(buf)).unwrap();
    assert_eq!(back.def(), project.def());
}
