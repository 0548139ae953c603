use std::path::Path;

use log::debug;

use crate::error::SceneError;

/// Raw pixel rows as decoded from an image file, bottom row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

impl DecodedImage {
    /// Solid-colour RGBA image, handy for fallbacks and fixtures.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(rgba_len(width, height))
            .collect();
        Self {
            pixels,
            width,
            height,
            channels: 4,
        }
    }

    /// Expands the pixels to tightly packed RGBA8.
    ///
    /// Returns `None` for layouts other than RGB and RGBA.
    pub fn to_rgba8(&self) -> Option<Vec<u8>> {
        match self.channels {
            4 => Some(self.pixels.clone()),
            3 => Some(
                self.pixels
                    .chunks_exact(3)
                    .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], u8::MAX])
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// Byte length of a tightly packed RGBA8 image, computed without `u32` overflow.
fn rgba_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

/// Reads image files into raw pixels.
pub trait ImageSource {
    fn load(&self, path: &Path) -> Result<DecodedImage, SceneError>;
}

/// Decodes images from disk with the `image` crate.
///
/// Images are flipped vertically so that texture V runs bottom-up like the
/// mesh UVs. The channel count of the file is preserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImageSource;

impl ImageSource for FileImageSource {
    fn load(&self, path: &Path) -> Result<DecodedImage, SceneError> {
        let image = image::open(path)
            .map_err(|source| SceneError::ImageDecode {
                path: path.to_path_buf(),
                source,
            })?
            .flipv();

        let channels = image.color().channel_count();
        let (width, height) = (image.width(), image.height());
        let pixels = match channels {
            1 => image.into_luma8().into_raw(),
            2 => image.into_luma_alpha8().into_raw(),
            3 => image.into_rgb8().into_raw(),
            _ => image.into_rgba8().into_raw(),
        };
        debug!(
            "decoded {} ({width}x{height}, {channels} channel(s))",
            path.display()
        );

        Ok(DecodedImage {
            pixels,
            width,
            height,
            channels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn solid_fills_every_pixel() {
        let image = DecodedImage::solid(3, 2, [10, 20, 30, 40]);
        assert_eq!(image.pixels.len(), 24);
        assert_eq!(&image.pixels[20..], [10, 20, 30, 40]);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn rgba_len_does_not_wrap_for_large_images() {
        assert_eq!(rgba_len(65_536, 16_384), 1usize << 32);
    }

    #[test]
    fn rgb_expands_to_opaque_rgba() {
        let image = DecodedImage {
            pixels: vec![1, 2, 3, 4, 5, 6],
            width: 2,
            height: 1,
            channels: 3,
        };
        assert_eq!(image.to_rgba8(), Some(vec![1, 2, 3, 255, 4, 5, 6, 255]));
    }

    #[test]
    fn grayscale_has_no_rgba_form() {
        let image = DecodedImage {
            pixels: vec![7, 8],
            width: 2,
            height: 1,
            channels: 1,
        };
        assert_eq!(image.to_rgba8(), None);
    }

    #[test]
    fn loads_flipped_rgb_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stripe.png");
        let mut fixture = RgbImage::new(1, 2);
        fixture.put_pixel(0, 0, Rgb([255, 0, 0]));
        fixture.put_pixel(0, 1, Rgb([0, 0, 255]));
        fixture.save(&path).unwrap();

        let decoded = FileImageSource.load(&path).unwrap();
        assert_eq!(decoded.channels, 3);
        assert_eq!((decoded.width, decoded.height), (1, 2));
        // The bottom (blue) row comes first after the flip.
        assert_eq!(decoded.pixels, vec![0, 0, 255, 255, 0, 0]);
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileImageSource
            .load(&dir.path().join("absent.jpg"))
            .unwrap_err();
        assert!(matches!(err, SceneError::ImageDecode { .. }));
    }
}
