use super::*;

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_dst_transparent_returns_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(over(dst, src), src);
}

#[test]
fn over_half_alpha_mixes_with_dst() {
    let out = over([0, 0, 200, 255], [128, 0, 0, 128]);
    assert_eq!(out[3], 255);
    assert_eq!(out[0], 128);
    assert_eq!(out[2], mul_div255_u8(200, 127));
}

#[test]
fn source_in_follows_destination_alpha() {
    let src = [200, 100, 50, 255];
    assert_eq!(source_in([9, 9, 9, 0], src), [0, 0, 0, 0]);
    assert_eq!(source_in([0, 0, 0, 255], src), src);

    let half = source_in([255, 255, 255, 128], src);
    assert_eq!(half[3], 128);
    assert_eq!(half[0], mul_div255_u8(200, 128));
}

#[test]
fn destination_out_removes_by_source_alpha() {
    let dst = [200, 100, 0, 200];
    assert_eq!(destination_out(dst, [0, 0, 0, 0]), dst);
    assert_eq!(destination_out(dst, [255, 255, 255, 255]), [0, 0, 0, 0]);
    assert_eq!(
        destination_out(dst, [128, 128, 128, 128]),
        dst.map(|c| mul_div255_u8(u16::from(c), 127))
    );
}
