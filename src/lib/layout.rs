//! The layout engine.
//!
//! [`layout`] turns a [`CertificateRequest`] into a [`CertificateLayout`]: a landscape page
//! 842 points wide whose height grows with the content, and the ordered draw list for the
//! frame, the header, the kind-specific details block, the footer and the contact bar.
//!
//! The vertical rhythm is a cursor that starts 70 points from the top and advances by a
//! fixed increment after every block. Optional blocks that are empty are skipped without
//! advancing the cursor, so nothing below them leaves a gap.

use crate::config::Organization;
use crate::metrics::{text_width, wrap_text};
use crate::request::{CertificateDetails, CertificateRequest, DateRange};
use crate::scene::{
    Align, CertificateLayout, DrawCommand, FontFace, Paint, Point, Rect, TextRun,
};
use crate::theme::{DesignTheme, Rgb, BODY_TEXT, MUTED_TEXT};

pub const PAGE_WIDTH: f32 = 842.0;
pub const MARGIN: f32 = 50.0;
pub const MIN_PAGE_HEIGHT: f32 = 540.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - MARGIN * 2.0;
const CENTER_X: f32 = PAGE_WIDTH / 2.0;

const DESCRIPTION_WIDTH: f32 = CONTENT_WIDTH - 100.0;
const DESCRIPTION_SIZE: f32 = 11.0;
const LOGO_SIZE: f32 = 70.0;

const LABEL_X: f32 = CENTER_X - 80.0;
const VALUE_X: f32 = CENTER_X + 20.0;
const DETAIL_SIZE: f32 = 12.0;
const PROJECT_WIDTH: f32 = PAGE_WIDTH - MARGIN - 10.0 - VALUE_X;
const RESPONSIBILITY_X: f32 = CENTER_X - 60.0;
const RESPONSIBILITY_SIZE: f32 = 10.0;
const RESPONSIBILITY_WIDTH: f32 = PAGE_WIDTH - MARGIN - 10.0 - RESPONSIBILITY_X;

const BOX_WIDTH: f32 = 160.0;
const BOX_HEIGHT: f32 = 65.0;
const SEAL_RADIUS: f32 = 28.0;
const CONTACT_SPACING: f32 = 180.0;

/// What the layout needs to know besides the request itself.
#[derive(Debug, Clone, Copy)]
pub struct LayoutContext<'a> {
    pub organization: &'a Organization,
    /// A decodable logo is available to the exporter.
    pub has_logo: bool,
    /// The signature can be set in the script face.
    pub has_script_font: bool,
}

impl<'a> LayoutContext<'a> {
    /// A context with neither a logo nor a script font.
    pub fn new(organization: &'a Organization) -> Self {
        LayoutContext {
            organization,
            has_logo: false,
            has_script_font: false,
        }
    }
}

/// Description lines as they are laid out.
pub fn description_lines(request: &CertificateRequest, organization: &Organization) -> Vec<String> {
    wrap_text(
        &request.description(&organization.display_name),
        FontFace::Helvetica,
        DESCRIPTION_SIZE,
        DESCRIPTION_WIDTH,
    )
}

fn project_lines(project: &str) -> Vec<String> {
    wrap_text(project, FontFace::Helvetica, DETAIL_SIZE, PROJECT_WIDTH)
}

/// One wrapped output line per non-blank input line.
fn responsibility_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .flat_map(|line| {
            wrap_text(
                line.trim(),
                FontFace::Helvetica,
                RESPONSIBILITY_SIZE,
                RESPONSIBILITY_WIDTH,
            )
        })
        .collect()
}

/// The up-front page height estimate, before the content-bottom correction.
pub fn estimated_height(request: &CertificateRequest, organization: &Organization) -> f32 {
    let description = (description_lines(request, organization).len() as f32 * 16.0 + 20.0).max(80.0);
    let block = match request.details() {
        CertificateDetails::Course { courses } => courses.len() as f32 * 28.0,
        CertificateDetails::Internship { project, .. } => {
            56.0 + project
                .as_deref()
                .map(|p| 28.0 + (project_lines(p).len().max(1) - 1) as f32 * 16.0)
                .unwrap_or(0.0)
        }
        CertificateDetails::Experience {
            responsibilities, ..
        } => {
            84.0 + responsibilities
                .as_deref()
                .map(|r| 28.0 + responsibility_lines(r).len() as f32 * 16.0)
                .unwrap_or(0.0)
        }
    };
    100.0 + 40.0 + 60.0 + 30.0 + 50.0 + description + 30.0 + block + 140.0 + 70.0
}

/// Accumulates draw commands in paint order.
#[derive(Default)]
struct Canvas {
    commands: Vec<DrawCommand>,
}

impl Canvas {
    fn text(&mut self, text: impl Into<String>, x: f32, y: f32, align: Align, face: FontFace, size: f32, color: Rgb) {
        let text = text.into();
        if text.trim().is_empty() {
            return;
        }
        self.commands.push(DrawCommand::Text(TextRun {
            text,
            x,
            y,
            align,
            face,
            size,
            color,
        }));
    }

    fn centered(&mut self, text: impl Into<String>, y: f32, face: FontFace, size: f32, color: Rgb) {
        self.text(text, CENTER_X, y, Align::Center, face, size, color);
    }

    fn line(&mut self, from: Point, to: Point, color: Rgb, width: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn rect(&mut self, rect: Rect, paint: Paint) {
        self.commands.push(DrawCommand::Rect { rect, paint });
    }

    fn circle(&mut self, center: Point, radius: f32, paint: Paint) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            paint,
        });
    }

    fn triangle(&mut self, a: Point, b: Point, c: Point, color: Rgb) {
        self.commands.push(DrawCommand::Polygon {
            points: vec![a, b, c],
            paint: Paint::Fill(color),
        });
    }

    /// A bold label and a muted value on one details row.
    fn detail_row(&mut self, label: &str, value: &str, y: f32, theme: &DesignTheme) {
        self.text(label, LABEL_X, y, Align::Left, FontFace::HelveticaBold, DETAIL_SIZE, theme.title);
        self.text(value, VALUE_X, y, Align::Left, FontFace::Helvetica, DETAIL_SIZE, MUTED_TEXT);
    }
}

/// Lays out the whole certificate.
pub fn layout(request: &CertificateRequest, ctx: &LayoutContext) -> CertificateLayout {
    let theme = request.design().theme();
    let org = ctx.organization;
    let mut content = Canvas::default();

    if let Some(id) = request.certificate_id() {
        content.text(
            format!("Certificate ID: {}", id),
            PAGE_WIDTH - MARGIN - 10.0,
            50.0,
            Align::Right,
            FontFace::Courier,
            9.0,
            MUTED_TEXT,
        );
    }

    let mut y = MARGIN + 20.0;

    if ctx.has_logo {
        content.commands.push(DrawCommand::Logo {
            rect: Rect::new(CENTER_X - LOGO_SIZE / 2.0, y, LOGO_SIZE, LOGO_SIZE),
        });
        y += LOGO_SIZE + 25.0;
    } else {
        y += 20.0;
    }

    content.centered(&org.name, y, FontFace::HelveticaBold, 16.0, theme.accent);
    y += 45.0;

    content.centered(
        request.kind().title().to_uppercase(),
        y,
        FontFace::TimesBold,
        32.0,
        theme.title,
    );
    y += 45.0;

    content.centered("THIS IS TO CERTIFY THAT", y, FontFace::Helvetica, 12.0, theme.text);
    y += 35.0;

    let name = request.recipient();
    content.centered(name, y, FontFace::TimesBold, 28.0, theme.title);
    let name_width = text_width(FontFace::TimesBold, 28.0, name);
    content.line(
        Point::new(CENTER_X - name_width / 2.0, y + 5.0),
        Point::new(CENTER_X + name_width / 2.0, y + 5.0),
        theme.accent,
        2.0,
    );
    y += 40.0;

    for line in description_lines(request, org) {
        content.centered(line, y, FontFace::Helvetica, DESCRIPTION_SIZE, BODY_TEXT);
        y += 16.0;
    }
    y += 20.0;

    content.centered(
        request.kind().section_title(),
        y,
        FontFace::HelveticaBold,
        10.0,
        MUTED_TEXT,
    );
    y += 25.0;

    y = layout_details(&mut content, request.details(), y, theme);
    y += 40.0;

    let contact_bottom = layout_footer(&mut content, request, ctx, y, theme);

    let height = (estimated_height(request, org) + MARGIN * 2.0)
        .max(MIN_PAGE_HEIGHT)
        .max(contact_bottom + MARGIN)
        .ceil();

    let mut commands = frame(height, theme);
    commands.extend(content.commands);
    CertificateLayout {
        width: PAGE_WIDTH,
        height,
        commands,
    }
}

fn dates_row(canvas: &mut Canvas, label: &str, period: &DateRange, y: &mut f32, theme: &DesignTheme) {
    if period.is_empty() {
        return;
    }
    canvas.detail_row(label, &period.display(), *y, theme);
    *y += 24.0;
}

/// Draws the kind-specific block starting at `y` and returns the cursor below it.
fn layout_details(canvas: &mut Canvas, details: &CertificateDetails, mut y: f32, theme: &DesignTheme) -> f32 {
    match details {
        CertificateDetails::Course { courses } => {
            for course in courses {
                canvas.centered(course.name.trim(), y, FontFace::HelveticaBold, 13.0, theme.title);
                canvas.centered(
                    format!("({})", course.period()),
                    y + 14.0,
                    FontFace::Helvetica,
                    10.0,
                    MUTED_TEXT,
                );
                y += 32.0;
            }
        }
        CertificateDetails::Internship {
            department,
            period,
            project,
        } => {
            canvas.detail_row("Department:", department, y, theme);
            y += 24.0;
            dates_row(canvas, "Duration:", period, &mut y, theme);
            if let Some(project) = project {
                let lines = project_lines(project);
                canvas.text("Project:", LABEL_X, y, Align::Left, FontFace::HelveticaBold, DETAIL_SIZE, theme.title);
                for (i, line) in lines.iter().enumerate() {
                    if i > 0 {
                        y += 16.0;
                    }
                    canvas.text(line.as_str(), VALUE_X, y, Align::Left, FontFace::Helvetica, DETAIL_SIZE, MUTED_TEXT);
                }
                y += 24.0;
            }
        }
        CertificateDetails::Experience {
            designation,
            department,
            period,
            responsibilities,
        } => {
            canvas.detail_row("Designation:", designation, y, theme);
            y += 24.0;
            if let Some(department) = department {
                canvas.detail_row("Department:", department, y, theme);
                y += 24.0;
            }
            dates_row(canvas, "Tenure:", period, &mut y, theme);
            if let Some(text) = responsibilities {
                canvas.text(
                    "Responsibilities:",
                    LABEL_X,
                    y,
                    Align::Left,
                    FontFace::HelveticaBold,
                    DETAIL_SIZE,
                    theme.title,
                );
                y += 18.0;
                for line in responsibility_lines(text) {
                    canvas.text(
                        line,
                        RESPONSIBILITY_X,
                        y,
                        Align::Left,
                        FontFace::Helvetica,
                        RESPONSIBILITY_SIZE,
                        MUTED_TEXT,
                    );
                    y += 14.0;
                }
            }
        }
    }
    y
}

/// Draws the divider, date box, seal, signature box and contact bar below `footer_y`.
/// Returns the baseline of the last line drawn.
fn layout_footer(
    canvas: &mut Canvas,
    request: &CertificateRequest,
    ctx: &LayoutContext,
    footer_y: f32,
    theme: &DesignTheme,
) -> f32 {
    let org = ctx.organization;
    let left_x = MARGIN + 100.0;
    let right_x = PAGE_WIDTH - MARGIN - 100.0;

    let divider_y = footer_y - 20.0;
    canvas.line(Point::new(CENTER_X - 200.0, divider_y), Point::new(CENTER_X - 30.0, divider_y), theme.border, 0.5);
    canvas.line(Point::new(CENTER_X + 30.0, divider_y), Point::new(CENTER_X + 200.0, divider_y), theme.border, 0.5);
    let left = Point::new(CENTER_X - 8.0, divider_y);
    let right = Point::new(CENTER_X + 8.0, divider_y);
    canvas.triangle(Point::new(CENTER_X, footer_y - 28.0), left, right, theme.border);
    canvas.triangle(Point::new(CENTER_X, footer_y - 12.0), left, right, theme.border);

    let box_paint = Paint::Stroke {
        color: theme.inner_border,
        width: 1.0,
    };

    // Issue date
    canvas.commands.push(DrawCommand::RoundedRect {
        rect: Rect::new(left_x - BOX_WIDTH / 2.0, footer_y, BOX_WIDTH, BOX_HEIGHT),
        radius: 5.0,
        paint: box_paint,
    });
    canvas.text("ISSUE DATE", left_x, footer_y + 15.0, Align::Center, FontFace::HelveticaBold, 8.0, MUTED_TEXT);
    canvas.line(
        Point::new(left_x - 40.0, footer_y + 22.0),
        Point::new(left_x + 40.0, footer_y + 22.0),
        theme.border,
        0.5,
    );
    canvas.text(request.issue_date(), left_x, footer_y + 42.0, Align::Center, FontFace::TimesRoman, 12.0, theme.text);

    // Signature
    canvas.commands.push(DrawCommand::RoundedRect {
        rect: Rect::new(right_x - BOX_WIDTH / 2.0, footer_y, BOX_WIDTH, BOX_HEIGHT),
        radius: 5.0,
        paint: box_paint,
    });
    let (name_face, name_size, title_face, title_size) = if ctx.has_script_font {
        (FontFace::Script, 26.0, FontFace::Script, 12.0)
    } else {
        (FontFace::TimesBoldItalic, 24.0, FontFace::TimesItalic, 11.0)
    };
    canvas.text(&org.signatory, right_x, footer_y + 30.0, Align::Center, name_face, name_size, theme.title);
    canvas.text(&org.signatory_title, right_x, footer_y + 48.0, Align::Center, title_face, title_size, theme.title);
    canvas.text(
        "AUTHORIZED SIGNATURE",
        right_x,
        footer_y + BOX_HEIGHT + 12.0,
        Align::Center,
        FontFace::HelveticaBold,
        8.0,
        MUTED_TEXT,
    );

    // Seal
    let seal = Point::new(CENTER_X, footer_y + 30.0);
    canvas.circle(seal, SEAL_RADIUS, Paint::Stroke { color: theme.border, width: 2.0 });
    canvas.circle(seal, SEAL_RADIUS - 4.0, Paint::Stroke { color: theme.border, width: 1.0 });
    canvas.circle(seal, 8.0, Paint::Fill(theme.border));
    for i in 0..8 {
        let angle = (i as f32 * 45.0).to_radians();
        let (sin, cos) = angle.sin_cos();
        canvas.line(
            Point::new(seal.x + cos * 12.0, seal.y + sin * 12.0),
            Point::new(seal.x + cos * 20.0, seal.y + sin * 20.0),
            theme.border,
            2.0,
        );
    }
    canvas.text("VERIFIED", seal.x, seal.y + SEAL_RADIUS + 10.0, Align::Center, FontFace::HelveticaBold, 6.0, theme.border);

    // Contact bar
    let contact_y = footer_y + BOX_HEIGHT + 35.0;
    let bar_start = MARGIN + 40.0;
    let bar_end = PAGE_WIDTH - MARGIN - 40.0;
    canvas.line(Point::new(bar_start, contact_y), Point::new(bar_end, contact_y), theme.border, 1.0);
    let dot_spacing = (bar_end - bar_start) / 4.0;
    for i in 1..4 {
        canvas.circle(
            Point::new(bar_start + dot_spacing * i as f32, contact_y),
            2.0,
            Paint::Fill(theme.border),
        );
    }

    let row_y = contact_y + 18.0;
    canvas.text(&org.email, CENTER_X - CONTACT_SPACING, row_y, Align::Center, FontFace::Helvetica, 9.0, BODY_TEXT);
    canvas.text(&org.phone, CENTER_X, row_y, Align::Center, FontFace::Helvetica, 9.0, BODY_TEXT);
    canvas.text(&org.website, CENTER_X + CONTACT_SPACING, row_y, Align::Center, FontFace::Helvetica, 9.0, BODY_TEXT);
    let separator_offset = CONTACT_SPACING / 2.0 + 20.0;
    for x in [CENTER_X - separator_offset, CENTER_X + separator_offset] {
        canvas.circle(Point::new(x, contact_y + 15.0), 1.5, Paint::Fill(theme.border));
    }

    let address_y = contact_y + 32.0;
    canvas.centered(&org.address, address_y, FontFace::Helvetica, 8.0, MUTED_TEXT);
    address_y
}

/// Background, double border, inner border and corner ornaments for a page of `height`.
fn frame(height: f32, theme: &DesignTheme) -> Vec<DrawCommand> {
    let w = PAGE_WIDTH;
    let h = height;
    let mut canvas = Canvas::default();
    canvas.rect(Rect::new(0.0, 0.0, w, h), Paint::Fill(theme.page_background));
    canvas.rect(
        Rect::new(12.0, 12.0, w - 24.0, h - 24.0),
        Paint::Stroke { color: theme.border, width: 4.0 },
    );
    canvas.rect(
        Rect::new(18.0, 18.0, w - 36.0, h - 36.0),
        Paint::Stroke { color: theme.border, width: 1.0 },
    );
    canvas.rect(
        Rect::new(30.0, 30.0, w - 60.0, h - 60.0),
        Paint::Stroke { color: theme.inner_border, width: 1.5 },
    );

    let c = 25.0;
    let (l, r, t, b) = (30.0, w - 30.0, 30.0, h - 30.0);
    canvas.triangle(Point::new(l, t), Point::new(l + c, t), Point::new(l, t + c), theme.corner);
    canvas.triangle(Point::new(r, t), Point::new(r - c, t), Point::new(r, t + c), theme.corner);
    canvas.triangle(Point::new(l, b), Point::new(l + c, b), Point::new(l, b - c), theme.corner);
    canvas.triangle(Point::new(r, b), Point::new(r - c, b), Point::new(r, b - c), theme.corner);
    canvas.commands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::CourseEntry;
    use crate::theme::DesignStyle;

    fn course_request(n: usize) -> CertificateRequest {
        let courses = (0..n)
            .map(|i| CourseEntry::new(format!("Course {}", i + 1), "01/01/2024", "31/12/2024"))
            .collect();
        CertificateRequest::new("Bharti Kumari", CertificateDetails::Course { courses })
            .unwrap()
            .with_issue_date("October 19, 2026")
    }

    fn experience_request(responsibilities: Option<&str>, department: Option<&str>) -> CertificateRequest {
        CertificateRequest::new(
            "Ravi Verma",
            CertificateDetails::Experience {
                designation: "Software Engineer".into(),
                department: department.map(str::to_string),
                period: DateRange::new("01/01/2023", "31/12/2024"),
                responsibilities: responsibilities.map(str::to_string),
            },
        )
        .unwrap()
    }

    fn lay(request: &CertificateRequest) -> CertificateLayout {
        let org = Organization::default();
        layout(request, &LayoutContext::new(&org))
    }

    #[test]
    fn test_minimum_page_height() {
        let layout = lay(&course_request(1));
        assert_eq!(layout.width, PAGE_WIDTH);
        assert!(layout.height >= MIN_PAGE_HEIGHT);
    }

    #[test]
    fn test_height_grows_with_courses() {
        let mut previous = 0.0;
        for n in 1..=8 {
            let height = lay(&course_request(n)).height;
            assert!(height >= previous, "{} courses: {} < {}", n, height, previous);
            previous = height;
        }
        assert!(lay(&course_request(8)).height > lay(&course_request(1)).height);
    }

    #[test]
    fn test_height_grows_with_responsibilities() {
        let mut text = String::new();
        let mut previous = lay(&experience_request(None, None)).height;
        for i in 0..10 {
            text.push_str(&format!("Maintained service number {}\n", i));
            let height = lay(&experience_request(Some(&text), None)).height;
            assert!(height >= previous);
            previous = height;
        }
        assert!(previous > lay(&experience_request(None, None)).height);
    }

    #[test]
    fn test_content_fits_on_page() {
        let layout = lay(&course_request(12));
        let address = layout
            .find_text(&Organization::default().address)
            .expect("address drawn");
        assert!(address.y + MARGIN <= layout.height);
    }

    #[test]
    fn test_header_texts() {
        let layout = lay(&course_request(2));
        assert!(layout.find_text("CERTIFICATE OF COMPLETION").is_some());
        assert!(layout.find_text("THIS IS TO CERTIFY THAT").is_some());
        assert!(layout.find_text("COURSES COMPLETED").is_some());
        assert!(layout.find_text("(01/01/2024 – 31/12/2024)").is_some());
        assert!(layout.find_text("October 19, 2026").is_some());
        let name = layout.find_text("Bharti Kumari").unwrap();
        assert_eq!(name.face, FontFace::TimesBold);
        assert_eq!(name.align, Align::Center);
    }

    #[test]
    fn test_name_underline_spans_name() {
        let request = course_request(1);
        let layout = lay(&request);
        let name = layout.find_text("Bharti Kumari").unwrap();
        let expected = text_width(FontFace::TimesBold, 28.0, "Bharti Kumari");
        let underline = layout.commands.iter().find_map(|c| match c {
            DrawCommand::Line { from, to, width, .. }
                if *width == 2.0 && from.y == name.y + 5.0 =>
            {
                Some(to.x - from.x)
            }
            _ => None,
        });
        assert!((underline.unwrap() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_certificate_id_is_optional() {
        assert!(!lay(&course_request(1)).contains_text("Certificate ID"));
        let with_id = lay(&course_request(1).with_certificate_id(Some("TP-2025-001")));
        let run = with_id.find_text("Certificate ID: TP-2025-001").unwrap();
        assert_eq!(run.face, FontFace::Courier);
        assert_eq!(run.align, Align::Right);
    }

    #[test]
    fn test_empty_optionals_are_omitted() {
        let bare = lay(&experience_request(None, None));
        assert!(bare.find_text("Department:").is_none());
        assert!(bare.find_text("Responsibilities:").is_none());

        let full = lay(&experience_request(Some("Code review"), Some("Engineering")));
        assert!(full.find_text("Department:").is_some());
        assert!(full.find_text("Code review").is_some());

        // Without a department the tenure row moves up into its slot.
        let bare_tenure = bare.find_text("Tenure:").unwrap().y;
        let full_tenure = full.find_text("Tenure:").unwrap().y;
        assert_eq!(full_tenure - bare_tenure, 24.0);
    }

    #[test]
    fn test_internship_without_dates_skips_duration() {
        let request = CertificateRequest::new(
            "Asha",
            CertificateDetails::Internship {
                department: "Web Development".into(),
                period: DateRange::default(),
                project: Some("Student portal".into()),
            },
        )
        .unwrap();
        let layout = lay(&request);
        assert!(layout.find_text("Duration:").is_none());
        let department = layout.find_text("Department:").unwrap().y;
        let project = layout.find_text("Project:").unwrap().y;
        assert_eq!(project - department, 24.0);
        assert!(layout.find_text("Student portal").is_some());
    }

    #[test]
    fn test_long_project_wraps() {
        let project = "Built an end-to-end admissions portal with online payments, \
                       document verification, automated email notifications and an \
                       analytics dashboard for the management team";
        let request = CertificateRequest::new(
            "Asha",
            CertificateDetails::Internship {
                department: "Web Development".into(),
                period: DateRange::new("01/02/2025", "30/04/2025"),
                project: Some(project.into()),
            },
        )
        .unwrap();
        let layout = lay(&request);
        let lines: Vec<_> = layout
            .text_runs()
            .filter(|r| r.x == VALUE_X && r.y >= layout.find_text("Project:").unwrap().y)
            .collect();
        assert!(lines.len() > 1);
        for run in lines {
            assert!(run.x + text_width(run.face, run.size, &run.text) <= PAGE_WIDTH - MARGIN);
        }
    }

    #[test]
    fn test_logo_and_script_font_switches() {
        let org = Organization::default();
        let request = course_request(1);
        let plain = layout(&request, &LayoutContext::new(&org));
        assert!(!plain.commands.iter().any(|c| matches!(c, DrawCommand::Logo { .. })));
        assert_eq!(plain.find_text("Sanjeev Kumar").unwrap().face, FontFace::TimesBoldItalic);

        let rich = layout(
            &request,
            &LayoutContext {
                organization: &org,
                has_logo: true,
                has_script_font: true,
            },
        );
        assert!(rich.commands.iter().any(|c| matches!(c, DrawCommand::Logo { .. })));
        let signatory = rich.find_text("Sanjeev Kumar").unwrap();
        assert_eq!(signatory.face, FontFace::Script);
        assert_eq!(signatory.size, 26.0);
        // The logo pushes everything below it down by 75 points.
        let plain_title = plain.find_text("CERTIFICATE OF COMPLETION").unwrap().y;
        let rich_title = rich.find_text("CERTIFICATE OF COMPLETION").unwrap().y;
        assert_eq!(rich_title - plain_title, 75.0);
    }

    #[test]
    fn test_frame_comes_first_and_uses_theme() {
        let request = course_request(1).with_design(DesignStyle::Modern);
        let layout = lay(&request);
        let theme = DesignStyle::Modern.theme();
        match &layout.commands[0] {
            DrawCommand::Rect { rect, paint } => {
                assert_eq!(rect.height, layout.height);
                assert_eq!(*paint, Paint::Fill(theme.page_background));
            }
            other => panic!("expected background, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_description_replaces_default() {
        let request = course_request(1).with_description(Some("for outstanding work"));
        let layout = lay(&request);
        assert!(layout.find_text("for outstanding work").is_some());
        assert!(!layout.contains_text("has successfully completed"));
    }
}
