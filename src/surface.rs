use egui::{Pos2, Rect, pos2};
use image::{Rgba, RgbaImage};

use crate::brush::BrushState;
use crate::error::{SurfaceError, SurfaceResult};
use crate::snapshot::{Snapshot, encode_png};

const BLANK: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// The raster backing store strokes are painted into
pub struct DrawingSurface {
    raster: RgbaImage,
    /// Last point of the stroke in progress, if any
    stroke: Option<Pos2>,
    /// Bumped on every pixel change so views know when to re-upload
    revision: u64,
}

impl std::fmt::Debug for DrawingSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawingSurface")
            .field("size", &self.raster.dimensions())
            .field("stroke", &self.stroke)
            .field("revision", &self.revision)
            .finish()
    }
}

impl DrawingSurface {
    /// Create a blank, fully transparent surface
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            raster: RgbaImage::from_pixel(width, height, BLANK),
            stroke: None,
            revision: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    pub fn size(&self) -> (u32, u32) {
        self.raster.dimensions()
    }

    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_stroking(&self) -> bool {
        self.stroke.is_some()
    }

    /// Reallocate the store, keeping the old pixels anchored at the origin.
    ///
    /// Content that no longer fits is clipped, it is never scaled.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.size() == (width, height) {
            return;
        }
        log::info!(
            "Resizing surface {:?} -> {:?}",
            self.raster.dimensions(),
            (width, height)
        );
        let mut resized = RgbaImage::from_pixel(width, height, BLANK);
        image::imageops::replace(&mut resized, &self.raster, 0, 0);
        self.raster = resized;
        self.touch();
    }

    /// Start a new path at `point`. Nothing is painted until the path is extended.
    pub fn begin_stroke(&mut self, point: Pos2) {
        if self.stroke.is_some() {
            log::warn!("Stroke started while another was in progress");
        }
        self.stroke = Some(point);
    }

    /// Paint a segment from the last point to `point` with a round pen tip
    pub fn extend_stroke(&mut self, point: Pos2, brush: &BrushState) {
        let Some(last) = self.stroke.replace(point) else {
            return;
        };
        let color = brush.color();
        self.paint_segment(last, point, brush.radius(), Rgba([color.r(), color.g(), color.b(), 255]));
    }

    /// Close the current path. Returns false if no stroke was in progress.
    pub fn end_stroke(&mut self) -> bool {
        self.stroke.take().is_some()
    }

    /// Erase every pixel back to transparent
    pub fn clear(&mut self) {
        self.stroke = None;
        self.raster.pixels_mut().for_each(|pixel| *pixel = BLANK);
        self.touch();
    }

    /// Encode the current raster as PNG bytes
    pub fn export_image(&self) -> SurfaceResult<Vec<u8>> {
        let (width, height) = self.size();
        if width == 0 || height == 0 {
            return Err(SurfaceError::Export { width, height });
        }
        Ok(encode_png(&self.raster)?)
    }

    /// Encode the current raster into a snapshot
    pub fn capture(&self) -> SurfaceResult<Snapshot> {
        Ok(Snapshot::capture(&self.raster)?)
    }

    /// Replace the pixels with a decoded snapshot.
    ///
    /// The snapshot is placed at the origin of a blank store of the current
    /// size: larger snapshots are clipped, smaller ones leave the rest blank.
    pub fn restore(&mut self, raster: &RgbaImage) {
        let mut restored = RgbaImage::from_pixel(self.width(), self.height(), BLANK);
        image::imageops::replace(&mut restored, raster, 0, 0);
        self.raster = restored;
        self.touch();
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn paint_segment(&mut self, from: Pos2, to: Pos2, radius: f32, color: Rgba<u8>) {
        let (width, height) = self.size();
        if width == 0 || height == 0 {
            return;
        }

        let bounds = Rect::from_two_pos(from, to).expand(radius);
        let surface = Rect::from_min_max(Pos2::ZERO, pos2(width as f32, height as f32));
        let clipped = bounds.intersect(surface);
        if !clipped.is_positive() {
            return;
        }

        let x0 = clipped.min.x.floor().max(0.0) as u32;
        let y0 = clipped.min.y.floor().max(0.0) as u32;
        let x1 = (clipped.max.x.ceil() as u32).min(width);
        let y1 = (clipped.max.y.ceil() as u32).min(height);

        let mut painted = false;
        for y in y0..y1 {
            for x in x0..x1 {
                let center = pos2(x as f32 + 0.5, y as f32 + 0.5);
                if distance_to_segment(center, from, to) <= radius {
                    self.raster.put_pixel(x, y, color);
                    painted = true;
                }
            }
        }
        if painted {
            self.touch();
        }
    }
}

fn distance_to_segment(point: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let length_sq = ab.length_sq();
    if length_sq == 0.0 {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / length_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}
