use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

use futures::future::{FutureExt, LocalBoxFuture};
use image::{ImageEncoder, ImageFormat, RgbaImage};
use uuid::Uuid;

use crate::error::{SnapshotError, SnapshotResult};

/// Immutable PNG image of the surface at one instant.
///
/// The encoded payload is shared, so cloning a snapshot never copies pixels.
/// The dimensions are kept next to the payload because the surface may have
/// been resized since the snapshot was taken.
#[derive(Clone)]
pub struct Snapshot {
    id: Uuid,
    width: u32,
    height: u32,
    png: Arc<[u8]>,
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("png", &format!("<{} bytes>", self.png.len()))
            .finish()
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Snapshot {}

impl Snapshot {
    /// Encode a raster into a new snapshot
    pub fn capture(raster: &RgbaImage) -> Result<Self, image::ImageError> {
        let (width, height) = raster.dimensions();
        // A zero-sized surface has nothing to encode; decode recreates it.
        let png = if width == 0 || height == 0 {
            Vec::new()
        } else {
            encode_png(raster)?
        };
        Ok(Self::from_encoded(width, height, png))
    }

    pub(crate) fn from_encoded(width: u32, height: u32, png: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            width,
            height,
            png: png.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The encoded PNG payload
    pub fn png(&self) -> &[u8] {
        &self.png
    }

    /// Decode the snapshot back into pixels.
    ///
    /// Nothing is decoded until the future is polled. A failed decode leaves the
    /// snapshot untouched, so decoding it again retries from the same bytes.
    pub fn decode(&self) -> LocalBoxFuture<'static, SnapshotResult<RgbaImage>> {
        let snapshot = self.clone();
        async move { snapshot.decode_now() }.boxed_local()
    }

    fn decode_now(&self) -> SnapshotResult<RgbaImage> {
        if self.width == 0 || self.height == 0 {
            return Ok(RgbaImage::new(self.width, self.height));
        }

        let raster = image::load_from_memory_with_format(&self.png, ImageFormat::Png)
            .map_err(|source| SnapshotError::Decode {
                id: self.id,
                source,
            })?
            .to_rgba8();

        if raster.dimensions() != self.dimensions() {
            return Err(SnapshotError::DimensionMismatch {
                id: self.id,
                expected: self.dimensions(),
                actual: raster.dimensions(),
            });
        }
        Ok(raster)
    }
}

/// Encode an RGBA raster as PNG bytes
pub fn encode_png(raster: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Cursor::new(Vec::new());
    image::codecs::png::PngEncoder::new(&mut bytes).write_image(
        raster.as_raw(),
        raster.width(),
        raster.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(bytes.into_inner())
}
