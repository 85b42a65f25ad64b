//! Vector export of a [`CertificateLayout`] with printpdf.
//!
//! The PDF is rebuilt from the same draw list the raster exporter paints, using primitive
//! drawing operations instead of an embedded bitmap. That keeps the file small and the
//! text selectable. All text uses the PDF base-14 fonts, except the signature, which uses
//! the embedded script face when one was loaded.
//!
//! Layout coordinates have their origin at the top-left corner; PDF user space starts at
//! the bottom-left, so every y coordinate is flipped against the page height here.

use log::{debug, warn};
use printpdf::{
    BuiltinFont, Color, FontId, Line as PdfLine, LinePoint, Mm, Op, PaintMode, ParsedFont,
    PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point as PdfPoint, Polygon as PdfPolygon,
    PolygonRing, Pt, RawImage, Rgb as PdfRgb, TextItem, WindingOrder, XObjectTransform,
};
use std::f32::consts::PI;

use crate::assets::Logo;
use crate::fonts::FontBook;
use crate::metrics::text_width;
use crate::scene::{Align, CertificateLayout, DrawCommand, FontFace, Paint, Point, Rect, TextRun};
use crate::theme::Rgb;
use crate::CertError;

const CIRCLE_SEGMENTS: usize = 48;
const CORNER_SEGMENTS: usize = 6;

/// Maps a layout face onto a base-14 font. The script face falls back to Times bold italic.
pub fn builtin_font(face: FontFace) -> BuiltinFont {
    match face {
        FontFace::Helvetica => BuiltinFont::Helvetica,
        FontFace::HelveticaBold => BuiltinFont::HelveticaBold,
        FontFace::TimesRoman => BuiltinFont::TimesRoman,
        FontFace::TimesBold => BuiltinFont::TimesBold,
        FontFace::TimesItalic => BuiltinFont::TimesItalic,
        FontFace::TimesBoldItalic | FontFace::Script => BuiltinFont::TimesBoldItalic,
        FontFace::Courier => BuiltinFont::Courier,
    }
}

fn pdf_color(color: Rgb) -> Color {
    let (r, g, b) = color.to_unit();
    Color::Rgb(PdfRgb {
        r,
        g,
        b,
        icc_profile: None,
    })
}

fn pt_to_mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

/// Approximates a circle with a closed polygon.
fn circle_points(center: Point, radius: f32) -> Vec<Point> {
    (0..CIRCLE_SEGMENTS)
        .map(|i| {
            let angle = i as f32 * 2.0 * PI / CIRCLE_SEGMENTS as f32;
            Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

/// Outline of a rounded rectangle, clockwise from the top-left corner arc.
fn rounded_rect_points(rect: &Rect, radius: f32) -> Vec<Point> {
    let r = radius.min(rect.width / 2.0).min(rect.height / 2.0);
    let corners = [
        (Point::new(rect.x + r, rect.y + r), PI),
        (Point::new(rect.x + rect.width - r, rect.y + r), 1.5 * PI),
        (Point::new(rect.x + rect.width - r, rect.bottom() - r), 0.0),
        (Point::new(rect.x + r, rect.bottom() - r), 0.5 * PI),
    ];
    let mut points = Vec::with_capacity(4 * (CORNER_SEGMENTS + 1));
    for (center, start) in corners {
        for i in 0..=CORNER_SEGMENTS {
            let angle = start + (i as f32 / CORNER_SEGMENTS as f32) * 0.5 * PI;
            points.push(Point::new(center.x + r * angle.cos(), center.y + r * angle.sin()));
        }
    }
    points
}

fn rect_points(rect: &Rect) -> Vec<Point> {
    vec![
        Point::new(rect.x, rect.y),
        Point::new(rect.x + rect.width, rect.y),
        Point::new(rect.x + rect.width, rect.bottom()),
        Point::new(rect.x, rect.bottom()),
    ]
}

/// Builds PDF documents from layouts.
pub struct PdfRenderer<'a> {
    fonts: &'a FontBook,
    logo: Option<&'a Logo>,
}

impl<'a> PdfRenderer<'a> {
    pub fn new(fonts: &'a FontBook, logo: Option<&'a Logo>) -> Self {
        PdfRenderer { fonts, logo }
    }

    /// Renders `layout` into a single-page PDF and returns the file contents.
    ///
    /// The script font and the logo are embedded when they were loaded; if printpdf
    /// rejects either one, the signature is set in Times bold italic and the logo is
    /// left out. Neither case is an error.
    ///
    /// # Arguments
    /// * `layout` - The laid-out certificate
    /// * `title` - Document title stored in the PDF metadata
    pub fn render(&self, layout: &CertificateLayout, title: &str) -> Result<Vec<u8>, CertError> {
        let mut doc = PdfDocument::new(title);
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();

        let script_font = self.fonts.script_font_bytes().and_then(|bytes| {
            let parsed = ParsedFont::from_bytes(bytes, 0, &mut warnings);
            if parsed.is_none() {
                warn!("printpdf could not parse the signature font; using Times bold italic");
            }
            parsed.map(|font| doc.add_font(&font))
        });

        let logo = match self.logo {
            Some(logo) => match RawImage::decode_from_bytes(logo.bytes(), &mut warnings) {
                Ok(image) => {
                    let size = (image.width as f32, image.height as f32);
                    Some((doc.add_image(&image), size))
                }
                Err(e) => {
                    warn!("Could not embed the logo in the PDF: {}", e);
                    None
                }
            },
            None => None,
        };

        let mut writer = OpWriter {
            ops: Vec::new(),
            page_height: layout.height,
            fonts: self.fonts,
            script_font,
        };
        for command in &layout.commands {
            match command {
                DrawCommand::Rect { rect, paint } => writer.shape(rect_points(rect), paint),
                DrawCommand::RoundedRect {
                    rect,
                    radius,
                    paint,
                } => writer.shape(rounded_rect_points(rect, *radius), paint),
                DrawCommand::Circle {
                    center,
                    radius,
                    paint,
                } => writer.shape(circle_points(*center, *radius), paint),
                DrawCommand::Polygon { points, paint } => writer.shape(points.clone(), paint),
                DrawCommand::Line {
                    from,
                    to,
                    color,
                    width,
                } => writer.line(*from, *to, *color, *width),
                DrawCommand::Text(run) => writer.text(run),
                DrawCommand::Logo { rect } => {
                    if let Some((id, (w, h))) = &logo {
                        writer.ops.push(Op::UseXobject {
                            id: id.clone(),
                            transform: XObjectTransform {
                                translate_x: Some(Pt(rect.x)),
                                translate_y: Some(Pt(layout.height - rect.bottom())),
                                scale_x: Some(rect.width / w),
                                scale_y: Some(rect.height / h),
                                dpi: Some(72.0),
                                ..Default::default()
                            },
                        });
                    }
                }
            }
        }

        let page = PdfPage::new(pt_to_mm(layout.width), pt_to_mm(layout.height), writer.ops);
        let bytes = doc
            .with_pages(vec![page])
            .save(&PdfSaveOptions::default(), &mut warnings);
        for warning in &warnings {
            debug!("printpdf: {:?}", warning);
        }
        if bytes.is_empty() {
            return Err(CertError::export_error("printpdf produced an empty document"));
        }
        debug!("Rendered PDF: {} bytes", bytes.len());
        Ok(bytes)
    }
}

/// Collects page operations, converting top-left coordinates to PDF user space.
struct OpWriter<'a> {
    ops: Vec<Op>,
    page_height: f32,
    fonts: &'a FontBook,
    script_font: Option<FontId>,
}

impl OpWriter<'_> {
    fn point(&self, p: Point) -> PdfPoint {
        PdfPoint {
            x: Pt(p.x),
            y: Pt(self.page_height - p.y),
        }
    }

    fn line_points(&self, points: &[Point]) -> Vec<LinePoint> {
        points
            .iter()
            .map(|p| LinePoint {
                p: self.point(*p),
                bezier: false,
            })
            .collect()
    }

    fn shape(&mut self, points: Vec<Point>, paint: &Paint) {
        if points.len() < 2 {
            return;
        }
        let mode = match paint {
            Paint::Fill(color) => {
                self.ops.push(Op::SetFillColor {
                    col: pdf_color(*color),
                });
                PaintMode::Fill
            }
            Paint::Stroke { color, width } => {
                self.ops.push(Op::SetOutlineColor {
                    col: pdf_color(*color),
                });
                self.ops.push(Op::SetOutlineThickness { pt: Pt(*width) });
                PaintMode::Stroke
            }
        };
        let polygon = PdfPolygon {
            rings: vec![PolygonRing {
                points: self.line_points(&points),
            }],
            mode,
            winding_order: WindingOrder::NonZero,
        };
        self.ops.push(Op::DrawPolygon { polygon });
    }

    fn line(&mut self, from: Point, to: Point, color: Rgb, width: f32) {
        self.ops.push(Op::SetOutlineColor {
            col: pdf_color(color),
        });
        self.ops.push(Op::SetOutlineThickness { pt: Pt(width) });
        self.ops.push(Op::DrawLine {
            line: PdfLine {
                points: self.line_points(&[from, to]),
                is_closed: false,
            },
        });
    }

    fn text(&mut self, run: &TextRun) {
        let embedded = match run.face {
            FontFace::Script => self.script_font.clone(),
            _ => None,
        };
        let width = match &embedded {
            Some(_) => self
                .fonts
                .measure(FontFace::Script, run.size, &run.text)
                .unwrap_or_else(|| text_width(run.face, run.size, &run.text)),
            None => text_width(run.face, run.size, &run.text),
        };
        let x = match run.align {
            Align::Left => run.x,
            Align::Center => run.x - width / 2.0,
            Align::Right => run.x - width,
        };
        let pos = self.point(Point::new(x, run.y));

        self.ops.push(Op::SetFillColor {
            col: pdf_color(run.color),
        });
        self.ops.push(Op::StartTextSection);
        self.ops.push(Op::SetTextCursor { pos });
        let items = vec![TextItem::Text(run.text.clone())];
        match embedded {
            Some(font) => {
                self.ops.push(Op::SetFontSize {
                    size: Pt(run.size),
                    font: font.clone(),
                });
                self.ops.push(Op::WriteText { items, font });
            }
            None => {
                self.ops.push(Op::SetFontSizeBuiltinFont {
                    size: Pt(run.size),
                    font: builtin_font(run.face),
                });
                self.ops.push(Op::WriteTextBuiltinFont {
                    items,
                    font: builtin_font(run.face),
                });
            }
        }
        self.ops.push(Op::EndTextSection);
    }
}
