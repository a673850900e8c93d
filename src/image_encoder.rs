use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::io::Cursor;
use std::path::Path;

use crate::errors::AppResult;

/// Encode a pixel buffer as JPEG at the given quality. This is transport
/// formatting only; preset and watermark processing happen upstream.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> AppResult<Vec<u8>> {
    // JPEG has no alpha channel, so force RGB first.
    let rgb = image.to_rgb8();

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)?;

    Ok(buffer.into_inner())
}

pub fn load_image(path: &Path) -> AppResult<DynamicImage> {
    Ok(image::open(path)?)
}
