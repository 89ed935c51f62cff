use image::ImageFormat;
use log::{error, warn};

use crate::rendering::common::types::TextureImage;

/// Turns the raw bytes of a texture entry into pixels. `None` when the data cannot be decoded, the
/// caller does not cache failures.
pub trait TextureDecoder: Send + Sync {
    fn decode(&self, path: &str, bytes: &[u8]) -> Option<TextureImage>;
}

/// Decodes DDS, TGA and PNG through the `image` crate. The format is sniffed from the data first,
/// TGA has no magic so the file extension is the fallback.
#[derive(Debug, Default)]
pub struct ImageTextureDecoder {}

impl TextureDecoder for ImageTextureDecoder {
    fn decode(&self, path: &str, bytes: &[u8]) -> Option<TextureImage> {
        profiling::scope!("ImageTextureDecoder::decode");
        let Some(format) = image::guess_format(bytes)
            .ok()
            .or_else(|| ImageFormat::from_path(path).ok())
        else {
            warn!("Could not determine the image format of {}", path);
            return None;
        };

        match image::load_from_memory_with_format(bytes, format) {
            Ok(image) => {
                let rgba = image.into_rgba8();
                Some(TextureImage {
                    width: rgba.width(),
                    height: rgba.height(),
                    data: rgba.into_raw(),
                })
            }
            Err(err) => {
                error!("Decoding of the texture {path} failed: {}", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{Rgba, RgbaImage};

    use super::*;

    #[test]
    fn decodes_png_to_rgba() -> Result<(), anyhow::Error> {
        let mut png = Vec::new();
        RgbaImage::from_pixel(2, 3, Rgba([10, 20, 30, 255])).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let texture = ImageTextureDecoder::default()
            .decode("texture/test.png", &png)
            .expect("valid png");
        assert_eq!((texture.width, texture.height), (2, 3));
        assert_eq!(&texture.data[..4], &[10, 20, 30, 255]);
        Ok(())
    }

    #[test]
    fn garbage_is_not_a_texture() {
        assert!(
            ImageTextureDecoder::default()
                .decode("texture/broken.dds", b"DDS garbage")
                .is_none()
        );
        assert!(
            ImageTextureDecoder::default()
                .decode("texture/unknown.bin", b"??")
                .is_none()
        );
    }
}
