//! Pre-flight checks run before a certificate is exported.
//!
//! Nothing here blocks an export. Every check produces a human-readable warning that
//! the CLI prints in verbose mode or with `--dry-run`.

use crate::export::Exporter;
use crate::layout::CONTENT_WIDTH;
use crate::metrics::text_width;
use crate::request::{CertificateDetails, CertificateRequest};
use crate::scene::FontFace;

/// Free text longer than this makes the page noticeably taller than a landscape A4.
const LONG_TEXT_CHARS: usize = 600;

/// Characters in the 0x80..=0x9F block of WinAnsiEncoding.
const WIN_ANSI_EXTRAS: &[char] = &[
    '€', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', 'Ž', '‘', '’', '“', '”', '•',
    '–', '—', '˜', '™', 'š', '›', 'œ', 'ž', 'Ÿ',
];

/// Whether the PDF base-14 fonts can show `ch`.
pub fn is_base_font_char(ch: char) -> bool {
    matches!(ch, ' '..='~' | '\u{A0}'..='\u{FF}' | '\n' | '\r' | '\t')
        || WIN_ANSI_EXTRAS.contains(&ch)
}

fn text_fields(request: &CertificateRequest) -> Vec<(&'static str, &str)> {
    let mut fields = vec![("recipient name", request.recipient())];
    match request.details() {
        CertificateDetails::Course { courses } => {
            for course in courses {
                fields.push(("course name", course.name.as_str()));
                fields.push(("course date", course.start_date.as_str()));
                fields.push(("course date", course.end_date.as_str()));
            }
        }
        CertificateDetails::Internship {
            department,
            period,
            project,
        } => {
            fields.push(("department", department.as_str()));
            fields.push(("start date", period.start.as_str()));
            fields.push(("end date", period.end.as_str()));
            if let Some(project) = project {
                fields.push(("project", project.as_str()));
            }
        }
        CertificateDetails::Experience {
            designation,
            department,
            period,
            responsibilities,
        } => {
            fields.push(("designation", designation.as_str()));
            if let Some(department) = department {
                fields.push(("department", department.as_str()));
            }
            fields.push(("start date", period.start.as_str()));
            fields.push(("end date", period.end.as_str()));
            if let Some(text) = responsibilities {
                fields.push(("responsibilities", text.as_str()));
            }
        }
    }
    if let Some(id) = request.certificate_id() {
        fields.push(("certificate ID", id));
    }
    if let Some(description) = request.custom_description() {
        fields.push(("description", description));
    }
    fields
}

/// Checks `request` against what `exporter` can draw and returns a list of warnings.
///
/// # Returns
/// * Empty when the certificate should render exactly as designed
/// * Otherwise one message per issue, in field order
pub fn validate_request(request: &CertificateRequest, exporter: &Exporter) -> Vec<String> {
    let mut warnings = Vec::new();

    for (field, text) in text_fields(request) {
        let mut unsupported: Vec<char> = text.chars().filter(|c| !is_base_font_char(*c)).collect();
        unsupported.dedup();
        if !unsupported.is_empty() {
            let list: String = unsupported
                .iter()
                .take(8)
                .map(|c| format!("'{}' (U+{:04X})", c, *c as u32))
                .collect::<Vec<_>>()
                .join(", ");
            warnings.push(format!(
                "The {} contains characters the PDF base fonts cannot show: {}",
                field, list
            ));
        }
        if text.chars().count() > LONG_TEXT_CHARS {
            warnings.push(format!(
                "The {} is {} characters long; the certificate will grow past a single landscape page",
                field,
                text.chars().count()
            ));
        }
    }

    if text_width(FontFace::TimesBold, 28.0, request.recipient()) > CONTENT_WIDTH {
        warnings.push("The recipient name is wider than the page and will be clipped".to_string());
    }

    if !exporter.has_logo() {
        warnings.push(
            "No logo image is available; the header will show the organisation name only"
                .to_string(),
        );
    }
    if !exporter.has_script_font() {
        warnings.push(
            "No signature font is available; the signature falls back to Times Bold Italic"
                .to_string(),
        );
    }
    if exporter.uses_bundled_faces() {
        warnings.push(
            "Some system fonts are missing; PNG and JPEG text uses the bundled PDF base faces"
                .to_string(),
        );
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CertgenConfig;
    use crate::fonts::FontBook;
    use crate::request::{CourseEntry, DateRange};

    fn exporter() -> Exporter {
        Exporter::with_assets(&CertgenConfig::default(), None, FontBook::bundled())
    }

    fn course(name: &str) -> CertificateRequest {
        CertificateRequest::new(
            name,
            CertificateDetails::Course {
                courses: vec![CourseEntry::new("ADCA", "01/01/2024", "30/06/2024")],
            },
        )
        .unwrap()
    }

    #[test]
    fn test_base_font_chars() {
        assert!(is_base_font_char('A'));
        assert!(is_base_font_char('é'));
        assert!(is_base_font_char('€'));
        assert!(is_base_font_char('—'));
        assert!(!is_base_font_char('ł'));
        assert!(!is_base_font_char('क'));
    }

    #[test]
    fn test_missing_assets_are_reported() {
        let warnings = validate_request(&course("Priya Chauhan"), &exporter());
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("logo"));
        assert!(warnings[1].contains("signature font"));
        assert!(warnings[2].contains("bundled PDF base faces"));
    }

    #[test]
    fn test_unsupported_characters_are_listed() {
        let warnings = validate_request(&course("भारती कुमारी"), &exporter());
        assert!(warnings
            .iter()
            .any(|w| w.contains("recipient name") && w.contains("U+092D")));
    }

    #[test]
    fn test_long_responsibilities_warn() {
        let request = CertificateRequest::new(
            "Ravi Verma",
            CertificateDetails::Experience {
                designation: "Engineer".into(),
                department: None,
                period: DateRange::new("01/01/2023", "31/12/2024"),
                responsibilities: Some("Maintained the build pipeline. ".repeat(40)),
            },
        )
        .unwrap();
        let warnings = validate_request(&request, &exporter());
        assert!(warnings.iter().any(|w| w.contains("responsibilities is")));
    }

    #[test]
    fn test_very_long_name_warns_about_width() {
        let name = "Wolfeschlegelsteinhausenbergerdorff ".repeat(3);
        let warnings = validate_request(&course(&name), &exporter());
        assert!(warnings.iter().any(|w| w.contains("wider than the page")));
    }
}
