use certgen::config::CertgenConfig;
use certgen::export::{ExportFormat, Exporter};
use certgen::fonts::FontBook;
use certgen::request::{CertificateDetails, CertificateRequest, CourseEntry, DateRange};
use lopdf::content::Content;
use lopdf::{Document, Object};

fn exporter() -> Exporter {
    Exporter::with_assets(&CertgenConfig::default(), None, FontBook::bundled())
}

/// Builtin-font strings are WinAnsi bytes; the ASCII range maps one to one.
fn decode_winansi(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '\u{FFFD}' })
        .collect()
}

/// Concatenates every `Tj`/`TJ` operand on every page, one line per text operator.
fn extract_text(pdf: &[u8]) -> Result<String, Box<dyn std::error::Error>> {
    let doc = Document::load_mem(pdf)?;
    let mut text = String::new();
    for (_page_num, &page_id) in doc.get_pages().iter() {
        let contents = doc.get_page_content(page_id)?;
        let content = Content::decode(&contents)?;
        for operation in &content.operations {
            match operation.operator.as_ref() {
                "Tj" | "'" | "\"" => {
                    for obj in &operation.operands {
                        if let Object::String(ref bytes, _) = obj {
                            text.push_str(&decode_winansi(bytes));
                        }
                    }
                    text.push('\n');
                }
                "TJ" => {
                    for obj in &operation.operands {
                        if let Object::Array(ref elems) = obj {
                            for elem in elems {
                                if let Object::String(ref bytes, _) = elem {
                                    text.push_str(&decode_winansi(bytes));
                                }
                            }
                        }
                    }
                    text.push('\n');
                }
                _ => {}
            }
        }
    }
    Ok(text)
}

#[test]
fn test_course_pdf_contains_name_courses_and_dates() {
    let request = CertificateRequest::new(
        "Bharti Kumari",
        CertificateDetails::Course {
            courses: vec![
                CourseEntry::new("ADCA", "12/06/2024", "31/12/2024"),
                CourseEntry::new("Digital Marketing", "01/01/2025", "till now"),
            ],
        },
    )
    .unwrap()
    .with_certificate_id(Some("TP-2025-001"))
    .with_issue_date("March 3, 2025");

    let pdf = exporter().render(&request, ExportFormat::Pdf).unwrap();
    assert!(pdf.starts_with(b"%PDF"));

    let text = extract_text(&pdf).unwrap();
    for date in request.dates() {
        assert!(text.contains(date), "missing date {:?} in:\n{}", date, text);
    }
    for expected in [
        "Bharti Kumari",
        "ADCA",
        "Digital Marketing",
        "Certificate ID: TP-2025-001",
        "March 3, 2025",
        "CERTIFICATE OF COMPLETION",
    ] {
        assert!(text.contains(expected), "missing {:?} in:\n{}", expected, text);
    }
}

#[test]
fn test_experience_pdf_omits_empty_optional_rows() {
    let request = CertificateRequest::new(
        "Ravi Verma",
        CertificateDetails::Experience {
            designation: "Software Engineer".into(),
            department: None,
            period: DateRange::new("01/01/2023", "31/12/2024"),
            responsibilities: None,
        },
    )
    .unwrap();

    let text = extract_text(&exporter().render(&request, ExportFormat::Pdf).unwrap()).unwrap();
    assert!(text.contains("Software Engineer"));
    assert!(text.contains("Tenure:"));
    assert!(!text.contains("Department:"));
    assert!(!text.contains("Responsibilities:"));
    assert!(!text.contains("Certificate ID"));
}

#[test]
fn test_pdf_page_matches_layout_size() {
    let request = CertificateRequest::new(
        "Asha Singh",
        CertificateDetails::Internship {
            department: "Web Development".into(),
            period: DateRange::new("01/02/2025", "30/04/2025"),
            project: Some("Student admissions portal".into()),
        },
    )
    .unwrap();
    let exporter = exporter();
    let layout = exporter.layout(&request);
    let pdf = exporter.render(&request, ExportFormat::Pdf).unwrap();

    let doc = Document::load_mem(&pdf).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1);
    let page_id = *pages.values().next().unwrap();
    let page = doc.get_dictionary(page_id).unwrap();
    let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
    let number = |o: &Object| match o {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r,
        _ => panic!("unexpected MediaBox entry {:?}", o),
    };
    assert!((number(&media_box[2]) - layout.width).abs() < 1.0);
    assert!((number(&media_box[3]) - layout.height).abs() < 1.0);
}
