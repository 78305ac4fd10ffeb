use super::*;

fn dab(x: f64, y: f64, diameter: f64, tool: DrawingTool) -> BrushDab {
    BrushDab {
        center: Point::new(x, y),
        diameter,
        tool,
    }
}

#[test]
fn brush_reveals_a_disc_only() {
    let mut mask = Raster::transparent(9, 9);
    paint_dab(&mut mask, &dab(4.5, 4.5, 5.0, DrawingTool::Brush));

    assert_eq!(mask.pixel(4, 4), Some([255, 255, 255, 255]));
    assert_eq!(mask.pixel(3, 4), Some([255, 255, 255, 255]));
    assert_eq!(mask.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(mask.pixel(8, 8), Some([0, 0, 0, 0]));
}

#[test]
fn eraser_clears_coverage() {
    let mut mask = Raster::filled(4, 4, Rgba8Premul::opaque(255, 255, 255));
    paint_dab(&mut mask, &dab(0.5, 0.5, 3.0, DrawingTool::Eraser));

    assert_eq!(mask.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(mask.pixel(3, 3), Some([255, 255, 255, 255]));
}

#[test]
fn dabs_off_the_mask_are_clipped() {
    let mut mask = Raster::transparent(4, 4);
    paint_dab(&mut mask, &dab(-10.0, -10.0, 6.0, DrawingTool::Brush));
    paint_dab(&mut mask, &dab(40.0, 2.0, 6.0, DrawingTool::Brush));
    assert!(mask.as_bytes().iter().all(|&b| b == 0));

    paint_dab(&mut mask, &dab(0.5, 0.5, 2.0, DrawingTool::Brush));
    assert_eq!(mask.pixel(0, 0), Some([255, 255, 255, 255]));
}

#[test]
fn disc_edges_are_antialiased() {
    let mut mask = Raster::transparent(9, 9);
    paint_dab(&mut mask, &dab(4.5, 4.5, 4.0, DrawingTool::Brush));

    // The disc's left rim runs through the middle of column 2.
    let edge = mask.pixel(2, 4).map(|p| p[3]).unwrap_or(0);
    assert!(edge > 0 && edge < 255, "edge alpha {edge}");
}

#[test]
fn eraser_partially_removes_at_the_rim() {
    let mut mask = Raster::filled(9, 9, Rgba8Premul::opaque(255, 255, 255));
    paint_dab(&mut mask, &dab(4.5, 4.5, 4.0, DrawingTool::Eraser));

    assert_eq!(mask.pixel(4, 4), Some([0, 0, 0, 0]));
    let rim = mask.pixel(2, 4).map(|p| p[3]).unwrap_or(0);
    assert!(rim > 0 && rim < 255, "rim alpha {rim}");
    assert_eq!(mask.pixel(0, 0), Some([255, 255, 255, 255]));
}

#[test]
fn degenerate_diameters_paint_nothing() {
    let mut mask = Raster::transparent(4, 4);
    paint_dab(&mut mask, &dab(2.0, 2.0, 0.0, DrawingTool::Brush));
    paint_dab(&mut mask, &dab(2.0, 2.0, -3.0, DrawingTool::Brush));
    paint_dab(&mut mask, &dab(2.0, 2.0, f64::NAN, DrawingTool::Brush));
    assert!(mask.as_bytes().iter().all(|&b| b == 0));
}

#[test]
fn enormous_dab_covers_the_mask_quickly() {
    let mut mask = Raster::transparent(4, 4);
    let started = std::time::Instant::now();
    paint_dab(&mut mask, &dab(2.0, 2.0, f64::INFINITY, DrawingTool::Brush));
    paint_dab(&mut mask, &dab(-1e6, 2.0, 1e300, DrawingTool::Eraser));
    paint_dab(&mut mask, &dab(2.0, 2.0, 1e300, DrawingTool::Brush));
    assert!(started.elapsed() < std::time::Duration::from_secs(2));
    assert!(mask.as_bytes().iter().all(|&b| b == 255));
}
