use std::io::Cursor;

use anyhow::Context;

use crate::{RunpaceError, RunpaceResult, assets::frames::FrameImage};

/// Decode encoded image bytes (PNG) into straight-alpha RGBA8.
pub fn decode_image(bytes: &[u8]) -> RunpaceResult<FrameImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| RunpaceError::asset(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    FrameImage::from_rgba8(width, height, rgba.into_raw())
}

/// Encode a frame as PNG bytes.
pub fn encode_png(frame: &FrameImage) -> RunpaceResult<Vec<u8>> {
    let mut buf = Vec::new();
    image::write_buffer_with_format(
        &mut Cursor::new(&mut buf),
        frame.rgba8.as_slice(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .context("encode frame as png")?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
