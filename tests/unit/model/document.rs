use super::*;
use crate::assets::frames::Frame;
use crate::foundation::core::Rgba8Premul;

fn source(frames: usize, w: u32, h: u32) -> Arc<FrameSource> {
    let frames = (0..frames)
        .map(|_| Frame {
            raster: Raster::filled(w, h, Rgba8Premul::opaque(10, 20, 30)),
            duration: 10,
        })
        .collect();
    Arc::new(FrameSource::new(w, h, frames))
}

fn three_layers() -> (Document, [LayerId; 3]) {
    let doc = Document::empty();
    let (doc, a) = doc.add_layer(Some(source(4, 16, 8)));
    let (doc, b) = doc.add_layer(Some(source(6, 4, 4)));
    let (doc, c) = doc.add_layer(None);
    (doc, [a, b, c])
}

fn order(doc: &Document) -> Vec<LayerId> {
    doc.layers().iter().map(Layer::id).collect()
}

#[test]
fn empty_document_has_no_base_and_no_frames() {
    let doc = Document::empty();
    assert!(doc.is_empty());
    assert!(doc.base_layer().is_none());
    assert_eq!(doc.frame_count(), 0);
    assert!(doc.canvas().is_empty());
}

#[test]
fn first_layer_is_base_and_sets_canvas() {
    let (doc, [a, b, _]) = three_layers();
    assert!(doc.is_base_layer(a));
    assert!(!doc.is_base_layer(b));
    assert_eq!((doc.width(), doc.height()), (16, 8));
}

#[test]
fn frame_count_is_max_over_layers() {
    let (doc, _) = three_layers();
    assert_eq!(doc.frame_count(), 6);
}

#[test]
fn ids_are_unique_and_survive_removal() {
    let (doc, [a, b, c]) = three_layers();
    let doc = doc.remove_layer(b).unwrap();
    let (doc, d) = doc.add_layer(None);
    assert_ne!(d, b);
    assert_eq!(order(&doc), vec![a, c, d]);
}

#[test]
fn mutations_do_not_alter_the_original() {
    let (doc, [_, b, c]) = three_layers();
    let before = doc.clone();

    let _ = doc.remove_layer(c).unwrap();
    let _ = doc.toggle_layer_visibility(b).unwrap();
    let _ = doc.move_layer(b, 2).unwrap();
    let _ = doc.set_layer_position(b, Vec2::new(3.0, 4.0)).unwrap();
    let _ = doc.add_layer(None);

    assert_eq!(doc, before);
}

#[test]
fn base_layer_cannot_be_removed_or_reordered() {
    let (doc, [a, b, _]) = three_layers();
    assert!(matches!(
        doc.remove_layer(a),
        Err(LoopmaskError::Layer { layer, .. }) if layer == a
    ));
    assert!(doc.move_layer(a, 2).is_err());
    assert!(doc.move_layer(b, 0).is_err());
}

#[test]
fn move_layer_reorders_and_clamps_to_top() {
    let (doc, [a, b, c]) = three_layers();
    let moved = doc.move_layer(b, 99).unwrap();
    assert_eq!(order(&moved), vec![a, c, b]);

    let back = moved.move_layer(b, 1).unwrap();
    assert_eq!(order(&back), vec![a, b, c]);

    let same = doc.move_layer(c, 2).unwrap();
    assert_eq!(same, doc);
}

#[test]
fn unknown_layer_is_rejected() {
    let (doc, _) = three_layers();
    let ghost = LayerId(99);
    assert!(doc.remove_layer(ghost).is_err());
    assert!(doc.toggle_layer_visibility(ghost).is_err());
    assert!(doc.set_layer_frames(ghost, source(1, 1, 1)).is_err());
}

#[test]
fn toggle_visibility_flips_flag() {
    let (doc, [_, b, _]) = three_layers();
    let hidden = doc.toggle_layer_visibility(b).unwrap();
    assert!(hidden.layer(b).unwrap().is_hidden());
    let shown = hidden.toggle_layer_visibility(b).unwrap();
    assert!(!shown.layer(b).unwrap().is_hidden());
}

#[test]
fn assigning_frames_to_base_changes_canvas_and_frame_count() {
    let (doc, [a, _, c]) = three_layers();
    let doc = doc.set_layer_frames(a, source(12, 32, 20)).unwrap();
    assert_eq!((doc.width(), doc.height()), (32, 20));
    assert_eq!(doc.frame_count(), 12);

    let doc = doc.set_layer_frames(c, source(3, 2, 2)).unwrap();
    assert_eq!(doc.layer(c).unwrap().frame_count(), 3);
}

#[test]
fn update_layer_must_keep_identity() {
    let (doc, [_, b, c]) = three_layers();
    assert!(doc.update_layer(b, |_| Layer::new(c)).is_err());
}

#[test]
fn non_finite_scale_is_rejected() {
    let (doc, [_, b, _]) = three_layers();
    assert!(doc.set_layer_scale(b, Vec2::new(f64::NAN, 1.0)).is_err());
    let doc = doc.set_layer_scale(b, Vec2::new(2.0, 0.5)).unwrap();
    assert_eq!(doc.layer(b).unwrap().scale(), Vec2::new(2.0, 0.5));
}

#[test]
fn ids_keep_counting_past_u32_range() {
    let doc = Document {
        layers: Vec::new(),
        next_layer_id: u64::from(u32::MAX),
    };
    let (doc, a) = doc.add_layer(None);
    let (doc, b) = doc.add_layer(None);
    let (_, c) = doc.add_layer(None);

    assert_eq!(a, LayerId(u64::from(u32::MAX)));
    assert_ne!(a, b);
    assert_ne!(b, c);
    assert_eq!(c, LayerId(u64::from(u32::MAX) + 2));
}
