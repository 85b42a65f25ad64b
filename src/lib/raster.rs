//! Raster export: draws a [`CertificateLayout`] into a pixmap and encodes it as PNG or JPEG.
//!
//! Shapes go through tiny-skia with a uniform scale transform, so the layout's point
//! coordinates map onto device pixels at the configured scale. Glyphs are rasterized with
//! rusttype and blended straight into the pixmap.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use log::debug;
use rusttype::point;
use tiny_skia::{
    FillRule, IntSize, Paint as SkPaint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

use crate::assets::Logo;
use crate::fonts::{em_scale, FontBook};
use crate::scene::{Align, CertificateLayout, DrawCommand, Paint, Point, Rect, TextRun};
use crate::theme::Rgb;
use crate::CertError;

/// Settings for one raster export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// Device pixels per layout point.
    pub scale: f32,
    pub jpeg_quality: u8,
}

impl Default for RasterOptions {
    fn default() -> Self {
        RasterOptions {
            scale: 2.0,
            jpeg_quality: 95,
        }
    }
}

fn sk_paint(color: Rgb) -> SkPaint<'static> {
    let mut paint = SkPaint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, 255);
    paint.anti_alias = true;
    paint
}

fn sk_rect(rect: &Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height)
}

fn rounded_rect_path(rect: &Rect, radius: f32) -> Option<tiny_skia::Path> {
    let r = radius.min(rect.width / 2.0).min(rect.height / 2.0);
    let (l, t) = (rect.x, rect.y);
    let (rt, b) = (rect.x + rect.width, rect.bottom());
    let mut pb = PathBuilder::new();
    pb.move_to(l + r, t);
    pb.line_to(rt - r, t);
    pb.quad_to(rt, t, rt, t + r);
    pb.line_to(rt, b - r);
    pb.quad_to(rt, b, rt - r, b);
    pb.line_to(l + r, b);
    pb.quad_to(l, b, l, b - r);
    pb.line_to(l, t + r);
    pb.quad_to(l, t, l + r, t);
    pb.close();
    pb.finish()
}

fn polygon_path(points: &[Point]) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    pb.close();
    pb.finish()
}

/// Draws layouts into pixmaps.
pub struct RasterRenderer<'a> {
    fonts: &'a FontBook,
    logo: Option<&'a Logo>,
    options: RasterOptions,
}

impl<'a> RasterRenderer<'a> {
    pub fn new(fonts: &'a FontBook, logo: Option<&'a Logo>, options: RasterOptions) -> Self {
        RasterRenderer {
            fonts,
            logo,
            options,
        }
    }

    /// Pixel size of the output for `layout`.
    pub fn pixel_size(&self, layout: &CertificateLayout) -> (u32, u32) {
        (
            (layout.width * self.options.scale).round() as u32,
            (layout.height * self.options.scale).round() as u32,
        )
    }

    pub fn render(&self, layout: &CertificateLayout) -> Result<Pixmap, CertError> {
        let (width, height) = self.pixel_size(layout);
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            CertError::render_error(format!("cannot allocate a {}x{} image", width, height))
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);

        let transform = Transform::from_scale(self.options.scale, self.options.scale);

        for command in &layout.commands {
            match command {
                DrawCommand::Rect { rect, paint } => {
                    if let Some(rect) = sk_rect(rect) {
                        self.paint_path(&mut pixmap, &PathBuilder::from_rect(rect), paint, transform);
                    }
                }
                DrawCommand::RoundedRect {
                    rect,
                    radius,
                    paint,
                } => {
                    if let Some(path) = rounded_rect_path(rect, *radius) {
                        self.paint_path(&mut pixmap, &path, paint, transform);
                    }
                }
                DrawCommand::Circle {
                    center,
                    radius,
                    paint,
                } => {
                    if let Some(path) = PathBuilder::from_circle(center.x, center.y, *radius) {
                        self.paint_path(&mut pixmap, &path, paint, transform);
                    }
                }
                DrawCommand::Polygon { points, paint } => {
                    if let Some(path) = polygon_path(points) {
                        self.paint_path(&mut pixmap, &path, paint, transform);
                    }
                }
                DrawCommand::Line {
                    from,
                    to,
                    color,
                    width,
                } => {
                    let mut pb = PathBuilder::new();
                    pb.move_to(from.x, from.y);
                    pb.line_to(to.x, to.y);
                    if let Some(path) = pb.finish() {
                        let stroke = Stroke {
                            width: *width,
                            ..Stroke::default()
                        };
                        pixmap.stroke_path(&path, &sk_paint(*color), &stroke, transform, None);
                    }
                }
                DrawCommand::Text(run) => self.draw_text(&mut pixmap, run)?,
                DrawCommand::Logo { rect } => self.draw_logo(&mut pixmap, rect)?,
            }
        }
        Ok(pixmap)
    }

    fn paint_path(&self, pixmap: &mut Pixmap, path: &tiny_skia::Path, paint: &Paint, transform: Transform) {
        match paint {
            Paint::Fill(color) => {
                pixmap.fill_path(path, &sk_paint(*color), FillRule::Winding, transform, None);
            }
            Paint::Stroke { color, width } => {
                let stroke = Stroke {
                    width: *width,
                    ..Stroke::default()
                };
                pixmap.stroke_path(path, &sk_paint(*color), &stroke, transform, None);
            }
        }
    }

    fn draw_logo(&self, pixmap: &mut Pixmap, rect: &Rect) -> Result<(), CertError> {
        let Some(logo) = self.logo else {
            return Ok(());
        };
        let (w, h) = logo.dimensions();
        // tiny-skia wants premultiplied RGBA.
        let mut data = logo.image().as_raw().clone();
        for px in data.chunks_exact_mut(4) {
            let a = px[3] as u16;
            for c in &mut px[..3] {
                *c = ((*c as u16 * a + 127) / 255) as u8;
            }
        }
        let size = IntSize::from_wh(w, h)
            .ok_or_else(|| CertError::render_error("logo has no pixels"))?;
        let source = Pixmap::from_vec(data, size)
            .ok_or_else(|| CertError::render_error("logo pixel buffer has the wrong size"))?;

        let s = self.options.scale;
        let transform = Transform::from_row(
            rect.width * s / w as f32,
            0.0,
            0.0,
            rect.height * s / h as f32,
            rect.x * s,
            rect.y * s,
        );
        pixmap.draw_pixmap(0, 0, source.as_ref(), &PixmapPaint::default(), transform, None);
        Ok(())
    }

    fn draw_text(&self, pixmap: &mut Pixmap, run: &TextRun) -> Result<(), CertError> {
        let font = self.fonts.font_for(run.face).ok_or_else(|| CertError::FontError {
            font_name: format!("{:?}", run.face),
            message: "no raster face could be loaded".to_string(),
            suggestion: "Install a TrueType font or add one under [fonts] custom_paths".to_string(),
        })?;
        let s = self.options.scale;
        let scale = em_scale(font, run.size * s);
        let glyphs: Vec<_> = font.layout(&run.text, scale, point(0.0, 0.0)).collect();
        let width = glyphs
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0);
        let origin_x = match run.align {
            Align::Left => run.x * s,
            Align::Center => run.x * s - width / 2.0,
            Align::Right => run.x * s - width,
        };
        let origin_y = run.y * s;

        let (pw, ph) = (pixmap.width() as i32, pixmap.height() as i32);
        let stride = pixmap.width() as usize;
        let data = pixmap.data_mut();
        let color = [run.color.r as f32, run.color.g as f32, run.color.b as f32];
        for glyph in glyphs {
            let pen_x = glyph.position().x;
            let glyph = glyph
                .into_unpositioned()
                .positioned(point(origin_x + pen_x, origin_y));
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let x = bb.min.x + gx as i32;
                let y = bb.min.y + gy as i32;
                if x < 0 || y < 0 || x >= pw || y >= ph || coverage <= 0.0 {
                    return;
                }
                let i = (y as usize * stride + x as usize) * 4;
                let c = coverage.min(1.0);
                for k in 0..3 {
                    data[i + k] = (color[k] * c + data[i + k] as f32 * (1.0 - c)).round() as u8;
                }
                data[i + 3] = (255.0 * c + data[i + 3] as f32 * (1.0 - c)).round() as u8;
            });
        }
        Ok(())
    }
}

/// Encodes an opaque pixmap as PNG.
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, CertError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(pixmap.data(), pixmap.width(), pixmap.height(), ExtendedColorType::Rgba8)
        .map_err(|e| CertError::export_error(format!("PNG encoding failed: {}", e)))?;
    debug!("Encoded PNG: {} bytes", buf.len());
    Ok(buf)
}

/// Encodes an opaque pixmap as baseline JPEG at `quality` percent.
pub fn encode_jpeg(pixmap: &Pixmap, quality: u8) -> Result<Vec<u8>, CertError> {
    // The page background is opaque, so premultiplied and straight RGB agree.
    let rgb: Vec<u8> = pixmap
        .data()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
        .write_image(&rgb, pixmap.width(), pixmap.height(), ExtendedColorType::Rgb8)
        .map_err(|e| CertError::export_error(format!("JPEG encoding failed: {}", e)))?;
    debug!("Encoded JPEG: {} bytes", buf.len());
    Ok(buf)
}
