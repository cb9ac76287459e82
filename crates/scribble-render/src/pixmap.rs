//! RGBA raster surface.

use crate::RendererError;
use crate::color::resolve_rgba8;
use kurbo::{Line, ParamCurveNearest, Point};
use scribble_core::DrawSurface;
use std::path::Path as FsPath;

/// An in-memory RGBA8 image that strokes round-capped polylines.
#[derive(Debug, Clone, PartialEq)]
pub struct PixmapSurface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixmapSurface {
    /// Create a transparent surface.
    pub fn new(width: u32, height: u32) -> Result<Self, RendererError> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(4))
            .filter(|&len| len > 0)
            .ok_or(RendererError::InvalidSize { width, height })?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    /// A copy of this surface with `top` composited over it (source-over).
    pub fn composited(&self, top: &PixmapSurface) -> Result<PixmapSurface, RendererError> {
        if (self.width, self.height) != (top.width, top.height) {
            return Err(RendererError::SizeMismatch {
                expected: (self.width, self.height),
                actual: (top.width, top.height),
            });
        }
        let mut out = self.clone();
        for (dst, src) in out.data.chunks_exact_mut(4).zip(top.data.chunks_exact(4)) {
            let alpha = u32::from(src[3]);
            for i in 0..4 {
                let s = u32::from(src[i]);
                let d = u32::from(dst[i]);
                let blended = if i == 3 {
                    alpha + d * (255 - alpha) / 255
                } else {
                    (s * alpha + d * (255 - alpha)) / 255
                };
                dst[i] = blended.min(255) as u8;
            }
        }
        Ok(out)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Pixel at `(x, y)`, if inside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Encode the surface as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, RendererError> {
        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| RendererError::Encode(e.to_string()))?;
            writer
                .write_image_data(&self.data)
                .map_err(|e| RendererError::Encode(e.to_string()))?;
        }
        Ok(png_data)
    }

    /// Write the surface to a PNG file.
    pub fn save_png(&self, path: &FsPath) -> Result<(), RendererError> {
        let png_data = self.encode_png()?;
        std::fs::write(path, png_data)
            .map_err(|e| RendererError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Paint every pixel whose center lies within `radius` of the segment.
    fn stamp_segment(&mut self, segment: Line, radius: f64, rgba: [u8; 4]) {
        let min_x = (segment.p0.x.min(segment.p1.x) - radius).floor().max(0.0);
        let min_y = (segment.p0.y.min(segment.p1.y) - radius).floor().max(0.0);
        let max_x = (segment.p0.x.max(segment.p1.x) + radius).ceil();
        let max_y = (segment.p0.y.max(segment.p1.y) + radius).ceil();
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }
        let max_x = (max_x as u32).min(self.width - 1);
        let max_y = (max_y as u32).min(self.height - 1);
        let radius_sq = radius * radius;
        let degenerate = segment.p0 == segment.p1;

        for y in min_y as u32..=max_y {
            for x in min_x as u32..=max_x {
                let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let dist_sq = if degenerate {
                    (center - segment.p0).hypot2()
                } else {
                    segment.nearest(center, 1e-6).distance_sq
                };
                if dist_sq <= radius_sq {
                    let i = self.offset(x, y);
                    self.data[i..i + 4].copy_from_slice(&rgba);
                }
            }
        }
    }
}

impl DrawSurface for PixmapSurface {
    fn clear(&mut self, background: &str) {
        let rgba = resolve_rgba8(background);
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    fn stroke_polyline(&mut self, points: &[Point], color: &str, width: f64) {
        let Some(&first) = points.first() else {
            return;
        };
        let rgba = resolve_rgba8(color);
        // Thinner than a pixel still paints the pixel it sits on.
        let radius = (width / 2.0).max(0.5);

        if points.len() == 1 {
            self.stamp_segment(Line::new(first, first), radius, rgba);
            return;
        }
        for pair in points.windows(2) {
            self.stamp_segment(Line::new(pair[0], pair[1]), radius, rgba);
        }
    }
}
