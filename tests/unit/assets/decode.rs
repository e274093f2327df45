use std::io::Cursor;

use super::*;

#[test]
fn decode_image_png_dimensions_straight_alpha() {
    let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
    let img = image::RgbaImage::from_raw(1, 1, src_rgba.clone()).unwrap();

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let frame = decode_image(&buf).unwrap();
    assert_eq!(frame.width, 1);
    assert_eq!(frame.height, 1);
    assert_eq!(frame.rgba8.as_slice(), src_rgba.as_slice());
}

#[test]
fn encode_then_decode_preserves_pixels() {
    let frame = FrameImage::from_rgba8(2, 1, vec![1, 2, 3, 255, 9, 8, 7, 0]).unwrap();
    let png = encode_png(&frame).unwrap();
    assert_eq!(decode_image(&png).unwrap(), frame);
}

#[test]
fn decode_rejects_garbage() {
    assert!(matches!(
        decode_image(b"not a png"),
        Err(RunpaceError::Asset(_))
    ));
}
