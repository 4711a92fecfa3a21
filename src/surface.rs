use egui::{Color32, Pos2};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// How a stroke combines with the pixels already on the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Composite {
    /// Paint the color over the destination
    SourceOver(Color32),
    /// Remove destination alpha where the stroke covers it
    DestinationOut,
}

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// The backing pixel buffer of the board
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// Opaque white buffer, each dimension at least one pixel
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width.max(1), height.max(1), WHITE),
        }
    }

    /// Backing size for a layout box scaled by the device pixel ratio
    pub fn backing_size(box_width: f32, box_height: f32, device_pixel_ratio: f32) -> (u32, u32) {
        let scale = |v: f32| (v * device_pixel_ratio).max(1.0) as u32;
        (scale(box_width), scale(box_height))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixels.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Resize the backing buffer, redrawing the old content scaled into the
    /// new dimensions. Lossy: repeated resizes drift from the original.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == self.size() {
            return;
        }
        let previous = std::mem::replace(&mut self.pixels, RgbaImage::from_pixel(width, height, WHITE));
        self.draw_image_scaled(&previous);
    }

    pub fn fill(&mut self, color: Color32) {
        let rgba = Rgba(color.to_srgba_unmultiplied());
        for pixel in self.pixels.pixels_mut() {
            *pixel = rgba;
        }
    }

    /// Replace the content with `frame`, scaled if the size changed since it
    /// was captured
    pub fn restore(&mut self, frame: &RgbaImage) {
        if frame.dimensions() == self.size() {
            self.pixels.clone_from(frame);
        } else {
            self.pixels = imageops::resize(frame, self.width(), self.height(), FilterType::Triangle);
        }
    }

    /// Source-over draw of `image` stretched to the whole surface
    pub fn draw_image_scaled(&mut self, image: &RgbaImage) {
        if image.dimensions() == self.size() {
            imageops::overlay(&mut self.pixels, image, 0, 0);
        } else {
            let scaled = imageops::resize(image, self.width(), self.height(), FilterType::Triangle);
            imageops::overlay(&mut self.pixels, &scaled, 0, 0);
        }
    }

    /// Draw a round-capped segment from `a` to `b`. A zero-length segment
    /// leaves a dot.
    pub fn stroke_segment(&mut self, a: Pos2, b: Pos2, width: f32, composite: Composite) {
        let radius = (width * 0.5).max(0.5);
        let min_x = (a.x.min(b.x) - radius - 1.0).floor().max(0.0) as u32;
        let min_y = (a.y.min(b.y) - radius - 1.0).floor().max(0.0) as u32;
        let max_x = ((a.x.max(b.x) + radius + 1.0).ceil().max(0.0) as u32).min(self.width());
        let max_y = ((a.y.max(b.y) + radius + 1.0).ceil().max(0.0) as u32).min(self.height());

        for y in min_y..max_y {
            for x in min_x..max_x {
                let center = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = (radius + 0.5 - distance_to_segment(center, a, b)).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let pixel = self.pixels.get_pixel_mut(x, y);
                match composite {
                    Composite::SourceOver(color) => blend_source_over(pixel, color, coverage),
                    Composite::DestinationOut => blend_destination_out(pixel, coverage),
                }
            }
        }
    }
}

fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

fn blend_source_over(dst: &mut Rgba<u8>, color: Color32, coverage: f32) {
    let [sr, sg, sb, sa] = color.to_srgba_unmultiplied();
    let src_a = (sa as f32 / 255.0) * coverage;
    let dst_a = dst.0[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        dst.0 = [0, 0, 0, 0];
        return;
    }
    let mix = |s: u8, d: u8| {
        let v = (s as f32 * src_a + d as f32 * dst_a * (1.0 - src_a)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    dst.0 = [
        mix(sr, dst.0[0]),
        mix(sg, dst.0[1]),
        mix(sb, dst.0[2]),
        (out_a * 255.0).round() as u8,
    ];
}

fn blend_destination_out(dst: &mut Rgba<u8>, coverage: f32) {
    let alpha = dst.0[3] as f32 * (1.0 - coverage);
    dst.0[3] = alpha.round().clamp(0.0, 255.0) as u8;
}
