//! Raster drawing surface for charts

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use std::path::Path;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const GRID: Rgb<u8> = Rgb([225, 225, 225]);
pub const MISSING: Rgb<u8> = Rgb([190, 190, 190]);

pub const STEELBLUE: Rgb<u8> = Rgb([70, 130, 180]);
pub const DARKORANGE: Rgb<u8> = Rgb([255, 140, 0]);
pub const SEAGREEN: Rgb<u8> = Rgb([46, 139, 87]);

/// Line colours cycled across series
pub const SERIES: [Rgb<u8>; 6] = [
    Rgb([31, 119, 180]),
    Rgb([255, 127, 14]),
    Rgb([44, 160, 44]),
    Rgb([214, 39, 40]),
    Rgb([148, 103, 189]),
    Rgb([140, 86, 75]),
];

const MARGIN_LEFT: u32 = 50;
const MARGIN_RIGHT: u32 = 20;
const MARGIN_TOP: u32 = 20;
const MARGIN_BOTTOM: u32 = 40;
const GRID_LINES: u32 = 5;

/// Image with a framed plot area
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, WHITE),
        }
    }

    /// Plot area as (left, top, width, height) in pixels
    pub fn plot_area(&self) -> (f32, f32, f32, f32) {
        let w = self.image.width().saturating_sub(MARGIN_LEFT + MARGIN_RIGHT).max(1);
        let h = self.image.height().saturating_sub(MARGIN_TOP + MARGIN_BOTTOM).max(1);
        (MARGIN_LEFT as f32, MARGIN_TOP as f32, w as f32, h as f32)
    }

    /// Map a value in `[0, max]` to a pixel row inside the plot area
    pub fn y_for(&self, value: f64, max: f64) -> f32 {
        let (_, top, _, height) = self.plot_area();
        let ratio = if max > 0.0 { (value / max).clamp(0.0, 1.0) } else { 0.0 };
        top + height * (1.0 - ratio as f32)
    }

    /// Horizontal grid lines plus the left and bottom axes
    pub fn draw_axes(&mut self) {
        let (left, top, width, height) = self.plot_area();
        let bottom = top + height;
        for i in 1..=GRID_LINES {
            let y = bottom - height * i as f32 / GRID_LINES as f32;
            draw_line_segment_mut(&mut self.image, (left, y), (left + width, y), GRID);
        }
        draw_line_segment_mut(&mut self.image, (left, top), (left, bottom), BLACK);
        draw_line_segment_mut(&mut self.image, (left, bottom), (left + width, bottom), BLACK);
    }

    /// Filled rectangle from float coordinates; degenerate sizes draw one pixel
    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb<u8>) {
        let rect = Rect::at(x.round() as i32, y.round() as i32)
            .of_size(width.round().max(1.0) as u32, height.round().max(1.0) as u32);
        draw_filled_rect_mut(&mut self.image, rect, color);
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Rgb<u8>) {
        draw_line_segment_mut(&mut self.image, from, to, color);
    }

    pub fn marker(&mut self, at: (f32, f32), color: Rgb<u8>) {
        draw_filled_circle_mut(&mut self.image, (at.0.round() as i32, at.1.round() as i32), 3, color);
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.image
            .save(path)
            .with_context(|| format!("Failed to write chart {:?}", path))
    }
}

/// Linear blue to red colour ramp for `t` in `[0, 1]`
pub fn heat_color(t: f64) -> Rgb<u8> {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let low = [49.0, 54.0, 149.0];
    let high = [215.0, 48.0, 39.0];
    let mix = |i: usize| (low[i] + (high[i] - low[i]) * t).round() as u8;
    Rgb([mix(0), mix(1), mix(2)])
}
