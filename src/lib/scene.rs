//! The shared layout description consumed by both exporters.
//!
//! Coordinates are PDF points with the origin at the top-left corner of the page and
//! the y axis pointing down. Text positions name the baseline of the run.

use crate::theme::Rgb;

/// Font faces the certificate uses. All but [`FontFace::Script`] map onto a PDF base-14
/// font; the script face is the embedded signature font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Helvetica,
    HelveticaBold,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    Script,
}

/// Horizontal anchor of a text run relative to its `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// How a closed shape is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Fill(Rgb),
    Stroke { color: Rgb, width: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub align: Align,
    pub face: FontFace,
    pub size: f32,
    pub color: Rgb,
}

/// One primitive drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        rect: Rect,
        paint: Paint,
    },
    RoundedRect {
        rect: Rect,
        radius: f32,
        paint: Paint,
    },
    Circle {
        center: Point,
        radius: f32,
        paint: Paint,
    },
    Polygon {
        points: Vec<Point>,
        paint: Paint,
    },
    Line {
        from: Point,
        to: Point,
        color: Rgb,
        width: f32,
    },
    Text(TextRun),
    /// The organisation logo, scaled into `rect`.
    Logo {
        rect: Rect,
    },
}

/// Page size plus the ordered draw list. Later commands paint over earlier ones.
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateLayout {
    pub width: f32,
    pub height: f32,
    pub commands: Vec<DrawCommand>,
}

impl CertificateLayout {
    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text(run) => Some(run),
            _ => None,
        })
    }

    /// Finds the first text run whose content equals `text`.
    pub fn find_text(&self, text: &str) -> Option<&TextRun> {
        self.text_runs().find(|run| run.text == text)
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.text_runs().any(|run| run.text.contains(needle))
    }

    pub fn faces(&self) -> impl Iterator<Item = FontFace> + '_ {
        self.text_runs().map(|run| run.face)
    }
}
