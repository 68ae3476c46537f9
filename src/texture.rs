//! Texture sources and GPU textures.
//!
//! Scenes never open files themselves. They ask a [`TextureSource`] for the
//! decoded pixels of an opaque id and upload the result with
//! [`Texture::from_image`].

use std::path::PathBuf;

use crate::catalog;

/// Errors raised while obtaining pixels for a texture id.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// The source has nothing for this id, or the data is unusable.
    #[error("texture '{id}' could not be loaded: {reason}")]
    Load { id: String, reason: String },

    /// The file exists but is not a decodable image.
    #[error("texture '{id}' could not be decoded: {source}")]
    Decode {
        id: String,
        #[source]
        source: image::ImageError,
    },

    /// The image is larger than the device can sample.
    #[error("texture '{id}' is {width}x{height}, over the device limit of {max}")]
    TooLarge {
        id: String,
        width: u32,
        height: u32,
        max: u32,
    },
}

/// Decoded RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    /// Row-major, four bytes per pixel.
    pub rgba: Vec<u8>,
}

impl ImageData {
    /// Wraps `rgba`, checking it holds exactly `width * height` pixels.
    pub fn new(id: &str, width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, TextureError> {
        check_len(id, width, height, rgba.len())?;
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Checks the pixels fill the buffer and both sides fit in `max_dimension`.
    pub fn check_upload(&self, id: &str, max_dimension: u32) -> Result<(), TextureError> {
        check_len(id, self.width, self.height, self.rgba.len())?;
        if self.width > max_dimension || self.height > max_dimension {
            return Err(TextureError::TooLarge {
                id: id.to_string(),
                width: self.width,
                height: self.height,
                max: max_dimension,
            });
        }
        Ok(())
    }
}

fn check_len(id: &str, width: u32, height: u32, len: usize) -> Result<(), TextureError> {
    let expected = width as usize * height as usize * 4;
    if width == 0 || height == 0 || len != expected {
        return Err(TextureError::Load {
            id: id.to_string(),
            reason: format!("{width}x{height} image needs {expected} bytes, got {len}"),
        });
    }
    Ok(())
}

impl From<image::RgbaImage> for ImageData {
    fn from(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            rgba: img.into_raw(),
        }
    }
}

/// Supplies decoded pixels for texture ids.
pub trait TextureSource {
    fn load(&self, id: &str) -> Result<ImageData, TextureError>;
}

/// Loads `<root>/<id>.png`, `.jpg` or `.jpeg`, in that order.
#[derive(Clone, Debug)]
pub struct DirectoryTextures {
    root: PathBuf,
}

impl DirectoryTextures {
    const EXTENSIONS: [&'static str; 3] = ["png", "jpg", "jpeg"];

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

}

impl TextureSource for DirectoryTextures {
    fn load(&self, id: &str) -> Result<ImageData, TextureError> {
        let path = Self::EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("{id}.{ext}")))
            .find(|p| p.is_file())
            .ok_or_else(|| TextureError::Load {
                id: id.to_string(),
                reason: format!("no png or jpg file in {}", self.root.display()),
            })?;

        let img = image::open(&path).map_err(|source| TextureError::Decode {
            id: id.to_string(),
            source,
        })?;

        log::debug!("Loaded texture '{}' from {}", id, path.display());
        Ok(img.to_rgba8().into())
    }
}

/// Generates stand-in images so the scenes run without any asset files.
///
/// The background id yields a starfield; catalog ids yield latitude bands
/// in the body's colour. Anything else is an error.
#[derive(Clone, Copy, Debug)]
pub struct ProceduralTextures {
    pub size: u32,
    pub seed: u32,
}

impl Default for ProceduralTextures {
    fn default() -> Self {
        Self {
            size: 256,
            seed: 7,
        }
    }
}

impl ProceduralTextures {
    fn starfield(&self) -> image::RgbaImage {
        let seed = self.seed;
        image::RgbaImage::from_fn(self.size * 2, self.size, |x, y| {
            let h = hash(x, y, seed);
            if h % 97 == 0 {
                let v = 150 + (hash(x + 31, y + 17, seed) % 106) as u8;
                image::Rgba([v, v, v.saturating_add(20), 255])
            } else {
                let haze = (hash(x / 16, y / 16, seed + 3) % 18) as u8;
                image::Rgba([haze / 2, haze / 3, haze, 255])
            }
        })
    }

    fn banded(&self, color: [f32; 4]) -> image::RgbaImage {
        let seed = self.seed;
        let size = self.size;
        image::RgbaImage::from_fn(size * 2, size, |x, y| {
            // Bands run along latitude so they read correctly on the sphere.
            let band = (y * 12 / size) as f32;
            let shade = 0.75 + 0.25 * (band * 1.7).sin();
            let grain = (hash(x, y, seed) % 24) as f32 / 255.0 - 0.05;
            let channel = |c: f32| ((c * shade + grain).clamp(0.0, 1.0) * 255.0) as u8;
            image::Rgba([channel(color[0]), channel(color[1]), channel(color[2]), 255])
        })
    }
}

impl TextureSource for ProceduralTextures {
    fn load(&self, id: &str) -> Result<ImageData, TextureError> {
        if self.size == 0 {
            return Err(TextureError::Load {
                id: id.to_string(),
                reason: "procedural size is zero".into(),
            });
        }

        if id == catalog::BACKGROUND_TEXTURE_ID {
            return Ok(self.starfield().into());
        }

        catalog::by_texture_id(id)
            .map(|body| self.banded(body.color).into())
            .ok_or_else(|| TextureError::Load {
                id: id.to_string(),
                reason: "unknown texture id".into(),
            })
    }
}

fn hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_add(x.wrapping_mul(374761393));
    h = h.wrapping_add(y.wrapping_mul(668265263));
    h ^= h >> 13;
    h = h.wrapping_mul(1274126177);
    h ^= h >> 16;
    h
}

/// A sampled 2D texture on the GPU.
#[derive(Debug)]
pub struct Texture {
    texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Uploads `image` as an sRGB texture with linear, repeating sampling.
    ///
    /// Images the device cannot hold are rejected before anything is created.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &ImageData,
        label: &str,
    ) -> Result<Self, TextureError> {
        use wgpu::util::DeviceExt;

        image.check_upload(label, device.limits().max_texture_dimension_2d)?;

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &image.rgba,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(Self {
            texture,
            view,
            sampler,
            width: image.width,
            height: image.height,
        })
    }

    /// Frees the GPU memory now instead of waiting for drop.
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn image_data_rejects_wrong_length() {
        assert!(ImageData::new("x", 2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            ImageData::new("x", 2, 2, vec![0; 15]),
            Err(TextureError::Load { .. })
        ));
        assert!(ImageData::new("x", 0, 2, vec![]).is_err());
    }

    #[test]
    fn upload_check_rejects_images_over_the_limit() {
        let wide = ImageData::new("panorama", 9000, 1, vec![0; 9000 * 4]).unwrap();
        assert!(matches!(
            wide.check_upload("panorama", 8192),
            Err(TextureError::TooLarge {
                width: 9000,
                max: 8192,
                ..
            })
        ));
        assert!(wide.check_upload("panorama", 16384).is_ok());
    }

    #[test]
    fn upload_check_catches_a_short_buffer() {
        let short = ImageData {
            width: 4,
            height: 4,
            rgba: vec![0; 60],
        };
        assert!(matches!(
            short.check_upload("short", 8192),
            Err(TextureError::Load { .. })
        ));
    }

    #[test]
    fn oversized_upload_fails_without_touching_the_device() {
        let Some((device, queue)) = crate::gpu::test_device() else {
            return;
        };
        let side = device.limits().max_texture_dimension_2d + 1;
        let image = ImageData::new("wide", side, 1, vec![0; side as usize * 4]).unwrap();

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let result = Texture::from_image(&device, &queue, &image, "wide");
        let scope = pollster::block_on(device.pop_error_scope());

        assert!(matches!(result, Err(TextureError::TooLarge { .. })));
        assert!(scope.is_none());

        let small = ImageData::new("small", 2, 2, vec![255; 16]).unwrap();
        let texture = Texture::from_image(&device, &queue, &small, "small").unwrap();
        assert_eq!((texture.width, texture.height), (2, 2));
    }

    #[test]
    fn directory_loads_png_by_id() {
        let dir = TempDir::new().unwrap();
        image::RgbaImage::from_pixel(4, 2, image::Rgba([10, 20, 30, 255]))
            .save(dir.path().join("earth.png"))
            .unwrap();

        let source = DirectoryTextures::new(dir.path());
        let data = source.load("earth").unwrap();

        assert_eq!((data.width, data.height), (4, 2));
        assert_eq!(data.rgba.len(), 4 * 2 * 4);
        assert_eq!(&data.rgba[data.rgba.len() - 4..], [10, 20, 30, 255]);
    }

    #[test]
    fn directory_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = DirectoryTextures::new(dir.path()).load("mars").unwrap_err();
        assert!(matches!(err, TextureError::Load { id, .. } if id == "mars"));
    }

    #[test]
    fn directory_reports_undecodable_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("venus.png"), b"not an image").unwrap();
        let err = DirectoryTextures::new(dir.path()).load("venus").unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
    }

    #[test]
    fn procedural_covers_background_and_catalog() {
        let source = ProceduralTextures {
            size: 16,
            seed: 1,
        };

        let background = source.load(catalog::BACKGROUND_TEXTURE_ID).unwrap();
        assert_eq!((background.width, background.height), (32, 16));

        for body in &catalog::CATALOG {
            let data = source.load(body.texture_id).unwrap();
            assert_eq!(data.rgba.len(), 32 * 16 * 4, "{}", body.name);
            assert!(data.rgba.chunks(4).all(|p| p[3] == 255));
        }
    }

    #[test]
    fn procedural_rejects_unknown_ids() {
        let err = ProceduralTextures::default().load("pluto").unwrap_err();
        assert!(matches!(err, TextureError::Load { .. }));
    }

    #[test]
    fn procedural_output_is_deterministic() {
        let source = ProceduralTextures::default();
        assert_eq!(source.load("jupiter").unwrap(), source.load("jupiter").unwrap());
    }
}
