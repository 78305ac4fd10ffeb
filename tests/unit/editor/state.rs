use std::sync::Arc;

use super::*;
use crate::assets::frames::{FrameSource, Raster};
use crate::foundation::core::Rgba8Premul;

fn source(frames: usize, duration: u32) -> Arc<FrameSource> {
    let frames = (0..frames)
        .map(|i| Frame {
            raster: Raster::filled(4, 4, Rgba8Premul::opaque(i as u8, 0, 0)),
            duration,
        })
        .collect();
    Arc::new(FrameSource::new(4, 4, frames))
}

fn state_with_frames(n: usize) -> EditorState {
    let (doc, _) = Document::empty().add_layer(Some(source(n, 10)));
    EditorState::new(doc)
}

#[test]
fn empty_state_defaults() {
    let s = EditorState::empty();
    assert!(!s.is_playing());
    assert_eq!(s.current_frame_index(), 0);
    assert_eq!(s.zoom(), 1.0);
    assert_eq!(s.draw_settings().stroke_size, 40.0);
    assert!(s.current_frame().is_none());
    assert!(s.active_layer().is_none());
}

#[test]
fn set_active_frame_normalizes_any_integer() {
    let s = state_with_frames(5);
    assert_eq!(s.set_active_frame(-1).current_frame_index(), 4);
    assert_eq!(s.set_active_frame(7).current_frame_index(), 2);
    assert_eq!(s.set_active_frame(0).current_frame_index(), 0);
    assert_eq!(s.set_active_frame(-5).current_frame_index(), 0);
    for i in -20..20 {
        assert!(s.set_active_frame(i).current_frame_index() < 5);
    }
}

#[test]
fn advance_wraps_to_zero() {
    let s = state_with_frames(5).set_active_frame(3);
    let s = s.advance_frame().advance_frame();
    assert_eq!(s.current_frame_index(), 0);
}

#[test]
fn set_active_frame_without_frames_stays_at_zero() {
    let s = EditorState::empty();
    assert_eq!(s.set_active_frame(9).current_frame_index(), 0);
    assert_eq!(s.advance_frame().current_frame_index(), 0);
}

#[test]
fn set_playing_is_idempotent() {
    let s = state_with_frames(3);
    assert_eq!(s.set_playing(false), s);

    let playing = s.set_playing(true);
    assert!(playing.is_playing());
    assert_eq!(playing.set_playing(true), playing);
    assert!(!playing.set_playing(false).is_playing());
}

#[test]
fn transitions_leave_the_original_untouched() {
    let s = state_with_frames(3);
    let _ = s.set_playing(true).advance_frame();
    assert!(!s.is_playing());
    assert_eq!(s.current_frame_index(), 0);
}

#[test]
fn current_frame_follows_base_layer_cursor() {
    let (doc, _) = Document::empty().add_layer(Some(source(4, 10)));
    let (doc, _) = doc.add_layer(Some(source(6, 3)));
    let s = EditorState::new(doc).set_active_frame(5);
    // Base has 4 frames: cursor 5 shows base frame 1.
    assert_eq!(
        s.current_frame().unwrap().raster.pixel(0, 0),
        Some([1, 0, 0, 255])
    );
    assert_eq!(s.current_frame().unwrap().duration, 10);
}

#[test]
fn update_document_keeps_cursor_in_range_and_drops_stale_selection() {
    let (doc, _) = Document::empty().add_layer(Some(source(2, 10)));
    let (doc, long) = doc.add_layer(Some(source(8, 10)));
    let s = EditorState::new(doc.clone())
        .set_active_frame(6)
        .update_active_layer(long)
        .unwrap();

    let shrunk = s.update_document(doc.remove_layer(long).unwrap());
    assert_eq!(shrunk.current_frame_index(), 0);
    assert!(shrunk.active_layer_id().is_none());
}

#[test]
fn zoom_must_be_positive_and_bounded() {
    let s = EditorState::empty();
    assert!(s.set_zoom(0.0).is_err());
    assert!(s.set_zoom(-2.0).is_err());
    assert!(s.set_zoom(f64::INFINITY).is_err());
    assert!(s.set_zoom(f64::NAN).is_err());
    assert!(s.set_zoom(MAX_ZOOM * 2.0).is_err());
    assert!(s.set_zoom(1e12).is_err());
    assert_eq!(s.set_zoom(MAX_ZOOM).unwrap().zoom(), MAX_ZOOM);
    assert_eq!(s.set_zoom(2.5).unwrap().zoom(), 2.5);
}

#[test]
fn toggle_mask_rendering_selects_and_flips_mode() {
    let (doc, _) = Document::empty().add_layer(Some(source(2, 10)));
    let (doc, top) = doc.add_layer(Some(source(2, 10)));
    let s = EditorState::new(doc);

    let on = s.toggle_mask_rendering(top).unwrap();
    assert_eq!(on.active_layer_id(), Some(top));
    assert_eq!(on.playback().render_mode, RenderMode::ActiveMask);
    let opts = on.render_options();
    assert!(opts.show_borders_for.contains(&top));
    assert_eq!(opts.mask_preview, Some(top));

    let off = on.toggle_mask_rendering(top).unwrap();
    assert_eq!(off.playback().render_mode, RenderMode::Normal);
    assert_eq!(off.render_options().mask_preview, None);

    assert!(s.toggle_mask_rendering(LayerId(42)).is_err());
}
